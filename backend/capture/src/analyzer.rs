//! Frame positioning analyzer.
//!
//! A coarse brightness/edge heuristic, not document detection: it estimates
//! whether a high-contrast, ticket-like object fills the frame from a few
//! aggregate statistics over a sparse sample of a downscaled frame. Cheap
//! enough to run continuously alongside the preview.

use std::path::Path;

use serde::{Deserialize, Serialize};

use ticketscan_core::CaptureError;

use crate::frame::Frame;

/// Thresholds and timings for positioning analysis and auto-capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerConfig {
    /// Fixed analysis buffer size frames are resampled to.
    pub analysis_width: u32,
    pub analysis_height: u32,
    /// Analyse every Nth pixel.
    pub pixel_step: usize,
    /// Mean RGB below this counts as dark.
    pub dark_threshold: f64,
    /// Brightness jump between consecutive samples that counts as an edge.
    pub edge_threshold: f64,
    pub positioned_confidence: f64,
    pub min_contrast_ratio: f64,
    pub min_edge_density: f64,
    pub auto_capture_confidence: f64,
    pub auto_capture_delay_ms: u64,
    pub auto_capture_debounce_ms: u64,
    /// Minimum spacing between analysed frames.
    pub tick_interval_ms: u64,
    /// Confidence changes at or below this are not reported.
    pub feedback_epsilon: f64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            analysis_width: 640,
            analysis_height: 480,
            pixel_step: 4,
            dark_threshold: 100.0,
            edge_threshold: 30.0,
            positioned_confidence: 15.0,
            min_contrast_ratio: 0.1,
            min_edge_density: 0.01,
            auto_capture_confidence: 25.0,
            auto_capture_delay_ms: 800,
            auto_capture_debounce_ms: 2_000,
            tick_interval_ms: 120,
            feedback_epsilon: 1.0,
        }
    }
}

/// Raw statistics behind a [`ScanFeedback`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMetrics {
    pub sampled: u32,
    pub dark: u32,
    pub edges: u32,
    pub contrast_ratio: f64,
    pub edge_density: f64,
}

impl FrameMetrics {
    pub fn from_counts(sampled: u32, dark: u32, edges: u32) -> Self {
        let ratio = |n: u32| if sampled == 0 { 0.0 } else { n as f64 / sampled as f64 };
        Self {
            sampled,
            dark,
            edges,
            contrast_ratio: ratio(dark),
            edge_density: ratio(edges),
        }
    }

    /// Aggregate score in [0, 100]. Not a probability.
    pub fn confidence(&self) -> f64 {
        ((self.edge_density * 1000.0 + self.contrast_ratio * 100.0) / 2.0).min(100.0)
    }
}

/// User-facing positioning hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanMessage {
    Steady,
    GettingCloser,
    MoveIntoFrame,
    PositionWithinFrame,
}

impl ScanMessage {
    pub fn for_confidence(confidence: f64) -> Self {
        if confidence > 30.0 {
            Self::Steady
        } else if confidence > 15.0 {
            Self::GettingCloser
        } else if confidence > 5.0 {
            Self::MoveIntoFrame
        } else {
            Self::PositionWithinFrame
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Self::Steady => "Hold steady, capturing soon",
            Self::GettingCloser => "Getting closer, keep the ticket in view",
            Self::MoveIntoFrame => "Move the ticket into the frame",
            Self::PositionWithinFrame => "Position the ticket within the frame",
        }
    }
}

impl std::fmt::Display for ScanMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFeedback {
    pub confidence: f64,
    pub is_positioned: bool,
    pub message: ScanMessage,
}

impl Default for ScanFeedback {
    fn default() -> Self {
        Self {
            confidence: 0.0,
            is_positioned: false,
            message: ScanMessage::PositionWithinFrame,
        }
    }
}

impl ScanFeedback {
    /// Whether replacing `previous` with `self` is worth a UI update.
    pub fn differs_from(&self, previous: &ScanFeedback, epsilon: f64) -> bool {
        (self.confidence - previous.confidence).abs() > epsilon
            || self.is_positioned != previous.is_positioned
            || self.message != previous.message
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub metrics: FrameMetrics,
    pub feedback: ScanFeedback,
}

/// Brightness statistics over a raw RGBA buffer.
///
/// Edges compare each sample with the previous *sample* in buffer order,
/// not with a spatial neighbour; the sampling step skips pixels and wraps
/// rows, so this is a deliberately coarse proxy.
pub fn measure(rgba: &[u8], config: &ScannerConfig) -> FrameMetrics {
    let mut sampled = 0u32;
    let mut dark = 0u32;
    let mut edges = 0u32;
    let mut previous: Option<f64> = None;

    for px in rgba.chunks_exact(4).step_by(config.pixel_step.max(1)) {
        let brightness = (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0;
        sampled += 1;
        if brightness < config.dark_threshold {
            dark += 1;
        }
        if let Some(prev) = previous {
            if (brightness - prev).abs() > config.edge_threshold {
                edges += 1;
            }
        }
        previous = Some(brightness);
    }

    FrameMetrics::from_counts(sampled, dark, edges)
}

/// Turn metrics into user feedback. Positioning needs all three signals:
/// confidence alone can be high on a single one.
pub fn evaluate(metrics: &FrameMetrics, config: &ScannerConfig) -> ScanFeedback {
    let confidence = metrics.confidence();
    let is_positioned = confidence > config.positioned_confidence
        && metrics.contrast_ratio > config.min_contrast_ratio
        && metrics.edge_density > config.min_edge_density;
    ScanFeedback {
        confidence,
        is_positioned,
        message: ScanMessage::for_confidence(confidence),
    }
}

/// Downscale, measure and evaluate one frame.
pub fn analyze_frame(frame: &Frame, config: &ScannerConfig) -> Analysis {
    let buffer = frame.downscale(config.analysis_width, config.analysis_height);
    let metrics = measure(buffer.as_raw(), config);
    Analysis {
        feedback: evaluate(&metrics, config),
        metrics,
    }
}

/// One analysis tick over a still image.
pub fn analyze_image(path: impl AsRef<Path>, config: &ScannerConfig) -> Result<Analysis, CaptureError> {
    Frame::open(path).map(|frame| analyze_frame(&frame, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::test_frames;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn scenario_getting_closer_but_positioned() {
        let metrics = FrameMetrics {
            sampled: 1000,
            dark: 150,
            edges: 20,
            contrast_ratio: 0.15,
            edge_density: 0.02,
        };
        let fb = evaluate(&metrics, &ScannerConfig::default());
        assert!(close(fb.confidence, 17.5), "confidence was {}", fb.confidence);
        assert!(fb.is_positioned);
        assert_eq!(fb.message, ScanMessage::GettingCloser);
    }

    #[test]
    fn confidence_alone_is_not_enough() {
        // High edge density with no dark pixels.
        let metrics = FrameMetrics::from_counts(1000, 0, 100);
        let fb = evaluate(&metrics, &ScannerConfig::default());
        assert!(close(fb.confidence, 50.0));
        assert!(!fb.is_positioned);
        assert_eq!(fb.message, ScanMessage::Steady);
    }

    #[test]
    fn confidence_is_capped() {
        let metrics = FrameMetrics::from_counts(100, 100, 99);
        assert!(close(metrics.confidence(), 100.0));
    }

    #[test]
    fn message_tiers() {
        assert_eq!(ScanMessage::for_confidence(30.1), ScanMessage::Steady);
        assert_eq!(ScanMessage::for_confidence(30.0), ScanMessage::GettingCloser);
        assert_eq!(ScanMessage::for_confidence(15.0), ScanMessage::MoveIntoFrame);
        assert_eq!(ScanMessage::for_confidence(5.0), ScanMessage::PositionWithinFrame);
    }

    #[test]
    fn samples_every_fourth_pixel() {
        let config = ScannerConfig::default();
        let metrics = measure(test_frames::solid(255).data(), &config);
        assert_eq!(metrics.sampled, 640 * 480 / 4);
        assert_eq!(metrics.dark, 0);
        assert_eq!(metrics.edges, 0);
    }

    #[test]
    fn dark_frame_has_contrast_but_no_edges() {
        let analysis = analyze_frame(&test_frames::solid(20), &ScannerConfig::default());
        assert!(close(analysis.metrics.contrast_ratio, 1.0));
        assert_eq!(analysis.metrics.edges, 0);
        assert!(close(analysis.feedback.confidence, 50.0));
        assert!(!analysis.feedback.is_positioned);
    }

    #[test]
    fn striped_frame_is_positioned() {
        let analysis = analyze_frame(&test_frames::striped(), &ScannerConfig::default());
        let m = analysis.metrics;
        assert_eq!(m.dark * 2, m.sampled);
        assert_eq!(m.edges, m.sampled - 1);
        assert!(close(analysis.feedback.confidence, 100.0));
        assert!(analysis.feedback.is_positioned);
        assert_eq!(analysis.feedback.message, ScanMessage::Steady);
    }

    #[test]
    fn edges_follow_buffer_order() {
        // Two rows of one pixel each: the only "edge" spans the row wrap.
        let config = ScannerConfig { pixel_step: 1, ..Default::default() };
        let rgba = [0, 0, 0, 255, 200, 200, 200, 255];
        let metrics = measure(&rgba, &config);
        assert_eq!(metrics.edges, 1);
    }

    #[test]
    fn still_image_is_analysed() {
        let path = std::env::temp_dir().join(format!("ticketscan-still-{}.png", std::process::id()));
        std::fs::write(&path, test_frames::striped().encode_png().unwrap()).unwrap();
        let analysis = analyze_image(&path, &ScannerConfig::default()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(analysis.feedback.is_positioned);
    }

    #[test]
    fn small_jitter_is_damped() {
        let base = ScanFeedback {
            confidence: 20.0,
            is_positioned: true,
            message: ScanMessage::GettingCloser,
        };
        let jitter = ScanFeedback { confidence: 20.9, ..base.clone() };
        assert!(!jitter.differs_from(&base, 1.0));
        let moved = ScanFeedback { confidence: 21.5, ..base.clone() };
        assert!(moved.differs_from(&base, 1.0));
        let flipped = ScanFeedback { is_positioned: false, ..base.clone() };
        assert!(flipped.differs_from(&base, 1.0));
    }
}
