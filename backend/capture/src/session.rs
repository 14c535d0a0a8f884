//! Scan-session state machine.
//!
//! Owns the throttle, the feedback damping, the auto-capture debounce and
//! the pending capture deadline. Time is passed in by the caller so the
//! driver decides the clock and tests can step it.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use ticketscan_core::CaptureError;

use crate::analyzer::{analyze_frame, Analysis, ScanFeedback, ScannerConfig};
use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Positioned,
    PendingAutoCapture { fires_at: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureTrigger {
    Auto,
    Manual,
}

/// Outcome of feeding one frame to the session.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Set when the frame was analysed rather than throttled.
    pub analysis: Option<Analysis>,
    /// Set when the visible feedback changed.
    pub feedback: Option<ScanFeedback>,
    /// Set when a pending auto-capture fired on this tick.
    pub capture: Option<CaptureTrigger>,
}

pub struct ScanSession {
    id: Uuid,
    config: ScannerConfig,
    auto_capture: bool,
    state: ScanState,
    feedback: ScanFeedback,
    last_tick: Option<Instant>,
    last_auto_capture: Option<Instant>,
}

impl ScanSession {
    pub fn new(config: ScannerConfig, auto_capture: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            auto_capture,
            state: ScanState::Idle,
            feedback: ScanFeedback::default(),
            last_tick: None,
            last_auto_capture: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn feedback(&self) -> &ScanFeedback {
        &self.feedback
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn auto_capture(&self) -> bool {
        self.auto_capture
    }

    pub fn is_running(&self) -> bool {
        self.state != ScanState::Idle
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.state = ScanState::Scanning;
        self.feedback = ScanFeedback::default();
        self.last_tick = None;
        info!(session = %self.id, auto_capture = self.auto_capture, "Scan session started");
    }

    /// Halt analysis and drop any pending capture. Idempotent.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.cancel_pending("session stopped");
        self.state = ScanState::Idle;
        self.last_tick = None;
        info!(session = %self.id, "Scan session stopped");
    }

    pub fn set_auto_capture(&mut self, enabled: bool) {
        self.auto_capture = enabled;
        if !enabled {
            self.cancel_pending("auto-capture disabled");
        }
    }

    /// Manual capture. Always allowed while running, with or without
    /// auto-capture; supersedes any pending auto-capture.
    pub fn capture_now(&mut self) -> Result<CaptureTrigger, CaptureError> {
        if !self.is_running() {
            return Err(CaptureError::NotRunning);
        }
        self.cancel_pending("manual capture");
        info!(session = %self.id, "Manual capture");
        Ok(CaptureTrigger::Manual)
    }

    /// Fire the pending auto-capture if its deadline has passed.
    pub fn poll_pending(&mut self, now: Instant) -> Option<CaptureTrigger> {
        match self.state {
            ScanState::PendingAutoCapture { fires_at } if now >= fires_at => {
                self.state = ScanState::Scanning;
                info!(session = %self.id, "Auto-capture fired");
                Some(CaptureTrigger::Auto)
            }
            _ => None,
        }
    }

    /// Feed one frame. Frames within the tick interval of the last
    /// analysed frame are skipped, but a due capture still fires.
    pub fn tick(&mut self, now: Instant, frame: &Frame) -> TickReport {
        let mut report = TickReport::default();
        if !self.is_running() {
            return report;
        }

        report.capture = self.poll_pending(now);

        let interval = Duration::from_millis(self.config.tick_interval_ms);
        if let Some(last) = self.last_tick {
            if now.saturating_duration_since(last) < interval {
                return report;
            }
        }
        self.last_tick = Some(now);

        let analysis = analyze_frame(frame, &self.config);
        if analysis
            .feedback
            .differs_from(&self.feedback, self.config.feedback_epsilon)
        {
            self.feedback = analysis.feedback.clone();
            report.feedback = Some(analysis.feedback.clone());
        }

        self.advance(now, &analysis.feedback);
        report.analysis = Some(analysis);
        report
    }

    /// Transitions use the fresh analysis, not the damped feedback.
    fn advance(&mut self, now: Instant, fresh: &ScanFeedback) {
        if !fresh.is_positioned {
            self.cancel_pending("positioning lost");
            self.state = ScanState::Scanning;
            return;
        }
        if matches!(self.state, ScanState::PendingAutoCapture { .. }) {
            return;
        }
        self.state = ScanState::Positioned;

        if self.auto_capture
            && fresh.confidence > self.config.auto_capture_confidence
            && self.debounce_elapsed(now)
        {
            let fires_at = now + Duration::from_millis(self.config.auto_capture_delay_ms);
            self.last_auto_capture = Some(now);
            self.state = ScanState::PendingAutoCapture { fires_at };
            debug!(
                session = %self.id,
                confidence = fresh.confidence,
                delay_ms = self.config.auto_capture_delay_ms,
                "Auto-capture armed"
            );
        }
    }

    fn debounce_elapsed(&self, now: Instant) -> bool {
        let debounce = Duration::from_millis(self.config.auto_capture_debounce_ms);
        self.last_auto_capture
            .map_or(true, |t| now.saturating_duration_since(t) >= debounce)
    }

    fn cancel_pending(&mut self, reason: &str) {
        if let ScanState::PendingAutoCapture { .. } = self.state {
            self.state = ScanState::Scanning;
            debug!(session = %self.id, reason, "Pending auto-capture cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::test_frames::{solid, striped};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn running(auto: bool) -> ScanSession {
        let mut s = ScanSession::new(ScannerConfig::default(), auto);
        s.start();
        s
    }

    #[test]
    fn idle_session_ignores_frames() {
        let mut s = ScanSession::new(ScannerConfig::default(), true);
        let report = s.tick(Instant::now(), &striped());
        assert!(report.analysis.is_none());
        assert_eq!(s.state(), ScanState::Idle);
    }

    #[test]
    fn ticks_are_throttled() {
        let mut s = running(false);
        let frame = solid(255);
        let t0 = Instant::now();
        assert!(s.tick(t0, &frame).analysis.is_some());
        assert!(s.tick(t0 + ms(50), &frame).analysis.is_none());
        assert!(s.tick(t0 + ms(119), &frame).analysis.is_none());
        assert!(s.tick(t0 + ms(120), &frame).analysis.is_some());
    }

    #[test]
    fn unchanged_feedback_is_not_reported() {
        let mut s = running(false);
        let t0 = Instant::now();
        // A blank frame evaluates to the initial feedback.
        assert!(s.tick(t0, &solid(255)).feedback.is_none());
        let fb = s.tick(t0 + ms(200), &striped()).feedback.unwrap();
        assert!(fb.is_positioned);
        assert!(s.tick(t0 + ms(400), &striped()).feedback.is_none());
        assert_eq!(s.feedback(), &fb);
    }

    #[test]
    fn debounce_allows_a_single_capture() {
        let mut s = running(true);
        let frame = striped();
        let t0 = Instant::now();
        let mut captures = 0;
        for offset in [0, 500, 800, 1300] {
            if s.tick(t0 + ms(offset), &frame).capture.is_some() {
                captures += 1;
            }
        }
        assert_eq!(captures, 1);
        assert_eq!(s.state(), ScanState::Positioned);
    }

    #[test]
    fn rearms_after_debounce_window() {
        let mut s = running(true);
        let frame = striped();
        let t0 = Instant::now();
        s.tick(t0, &frame);
        assert_eq!(s.tick(t0 + ms(800), &frame).capture, Some(CaptureTrigger::Auto));
        s.tick(t0 + ms(1850), &frame);
        assert_eq!(s.state(), ScanState::Positioned);
        s.tick(t0 + ms(2000), &frame);
        assert_eq!(
            s.state(),
            ScanState::PendingAutoCapture { fires_at: t0 + ms(2800) }
        );
    }

    #[test]
    fn losing_position_cancels_pending_capture() {
        let mut s = running(true);
        let t0 = Instant::now();
        s.tick(t0, &striped());
        assert!(matches!(s.state(), ScanState::PendingAutoCapture { .. }));

        s.tick(t0 + ms(300), &solid(255));
        assert_eq!(s.state(), ScanState::Scanning);

        // Past the old deadline and still inside the debounce window.
        let report = s.tick(t0 + ms(900), &striped());
        assert!(report.capture.is_none());
        assert_eq!(s.state(), ScanState::Positioned);
    }

    #[test]
    fn due_capture_fires_on_throttled_tick() {
        let mut s = running(true);
        let t0 = Instant::now();
        s.tick(t0, &striped());
        s.tick(t0 + ms(750), &striped());
        let report = s.tick(t0 + ms(800), &striped());
        assert!(report.analysis.is_none());
        assert_eq!(report.capture, Some(CaptureTrigger::Auto));
    }

    #[test]
    fn auto_capture_disabled_stays_positioned() {
        let mut s = running(false);
        let t0 = Instant::now();
        for offset in [0, 200, 1000, 3000] {
            assert!(s.tick(t0 + ms(offset), &striped()).capture.is_none());
        }
        assert_eq!(s.state(), ScanState::Positioned);
    }

    #[test]
    fn disabling_auto_capture_cancels_pending() {
        let mut s = running(true);
        let t0 = Instant::now();
        s.tick(t0, &striped());
        s.set_auto_capture(false);
        assert_eq!(s.state(), ScanState::Scanning);
        assert!(s.tick(t0 + ms(900), &striped()).capture.is_none());
    }

    #[test]
    fn stop_cancels_and_halts() {
        let mut s = running(true);
        let t0 = Instant::now();
        s.tick(t0, &striped());
        s.stop();
        assert_eq!(s.state(), ScanState::Idle);
        assert!(s.poll_pending(t0 + ms(900)).is_none());
        assert!(s.tick(t0 + ms(900), &striped()).analysis.is_none());
    }

    #[test]
    fn manual_capture_supersedes_pending() {
        let mut s = running(true);
        let t0 = Instant::now();
        s.tick(t0, &striped());
        assert_eq!(s.capture_now().unwrap(), CaptureTrigger::Manual);
        assert!(s.poll_pending(t0 + ms(900)).is_none());
    }

    #[test]
    fn manual_capture_requires_running_session() {
        let mut s = ScanSession::new(ScannerConfig::default(), false);
        assert!(matches!(s.capture_now(), Err(CaptureError::NotRunning)));
    }
}
