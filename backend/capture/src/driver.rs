//! Async scan driver: pumps frames from a [`FrameSource`] through a
//! [`ScanSession`] at render cadence and reports events on a channel.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use ticketscan_core::CaptureError;

use crate::analyzer::{ScanFeedback, ScannerConfig};
use crate::frame::Frame;
use crate::session::{CaptureTrigger, ScanSession};
use crate::source::FrameSource;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub config: ScannerConfig,
    pub auto_capture: bool,
    /// How often a frame is pulled from the source.
    pub frame_interval: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            config: ScannerConfig::default(),
            auto_capture: true,
            frame_interval: Duration::from_millis(16),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Requested,
    SourceEnded,
    SourceFailed(String),
    /// The event receiver was dropped.
    Detached,
}

#[derive(Debug)]
pub enum ScanEvent {
    Feedback(ScanFeedback),
    Captured { trigger: CaptureTrigger, frame: Frame },
    Stopped(StopReason),
}

#[derive(Debug)]
enum ScanCommand {
    CaptureNow,
    SetAutoCapture(bool),
    Stop,
}

/// Control handle for a running scan. Dropping it stops the scan.
pub struct ScanHandle {
    session_id: Uuid,
    commands: mpsc::Sender<ScanCommand>,
    task: Option<JoinHandle<()>>,
}

impl ScanHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Request a manual capture of the most recent frame.
    pub async fn capture_now(&self) {
        let _ = self.commands.send(ScanCommand::CaptureNow).await;
    }

    pub async fn set_auto_capture(&self, enabled: bool) {
        let _ = self.commands.send(ScanCommand::SetAutoCapture(enabled)).await;
    }

    /// Stop the scan and wait for the device to be released.
    pub async fn stop(mut self) {
        let _ = self.commands.send(ScanCommand::Stop).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.commands.try_send(ScanCommand::Stop);
        }
    }
}

/// Acquire the source and start scanning.
///
/// Acquisition failure is reported once and the session never starts.
pub async fn run_scan<S>(
    mut source: S,
    options: ScanOptions,
) -> Result<(ScanHandle, mpsc::Receiver<ScanEvent>), CaptureError>
where
    S: FrameSource + 'static,
{
    if let Err(e) = source.open().await {
        warn!(source = source.name(), error = %e, "Unable to access camera");
        return Err(e);
    }

    let mut session = ScanSession::new(options.config, options.auto_capture);
    session.start();
    let session_id = session.id();

    let (event_tx, event_rx) = mpsc::channel(32);
    let (command_tx, command_rx) = mpsc::channel(8);
    let task = tokio::spawn(scan_loop(
        source,
        session,
        options.frame_interval,
        command_rx,
        event_tx,
    ));

    Ok((
        ScanHandle {
            session_id,
            commands: command_tx,
            task: Some(task),
        },
        event_rx,
    ))
}

async fn scan_loop<S: FrameSource>(
    mut source: S,
    mut session: ScanSession,
    frame_interval: Duration,
    mut commands: mpsc::Receiver<ScanCommand>,
    events: mpsc::Sender<ScanEvent>,
) {
    let mut ticker = time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame: Option<Frame> = None;

    let reason = loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(ScanCommand::CaptureNow) => match (session.capture_now(), &last_frame) {
                    (Ok(trigger), Some(frame)) => {
                        let event = ScanEvent::Captured { trigger, frame: frame.clone() };
                        if events.send(event).await.is_err() {
                            break StopReason::Detached;
                        }
                    }
                    (Ok(_), None) => warn!(session = %session.id(), "Manual capture before first frame, ignoring"),
                    (Err(e), _) => warn!(session = %session.id(), error = %e, "Manual capture rejected"),
                },
                Some(ScanCommand::SetAutoCapture(enabled)) => {
                    debug!(session = %session.id(), enabled, "Auto-capture toggled");
                    session.set_auto_capture(enabled);
                }
                Some(ScanCommand::Stop) | None => break StopReason::Requested,
            },
            _ = ticker.tick() => {
                let frame = match source.next_frame().await {
                    Ok(Some(frame)) => frame,
                    Ok(None) => break StopReason::SourceEnded,
                    Err(e) => {
                        warn!(session = %session.id(), error = %e, "Frame source failed");
                        break StopReason::SourceFailed(e.to_string());
                    }
                };

                let report = session.tick(Instant::now().into_std(), &frame);
                if let Some(feedback) = report.feedback {
                    if events.send(ScanEvent::Feedback(feedback)).await.is_err() {
                        break StopReason::Detached;
                    }
                }
                if let Some(trigger) = report.capture {
                    let event = ScanEvent::Captured { trigger, frame: frame.clone() };
                    if events.send(event).await.is_err() {
                        break StopReason::Detached;
                    }
                }
                last_frame = Some(frame);
            }
        }
    };

    session.stop();
    source.close();
    info!(session = %session.id(), source = source.name(), reason = ?reason, "Camera released");
    let _ = events.send(ScanEvent::Stopped(reason)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::test_frames::{solid, striped};
    use crate::source::test_source::StaticSource;

    fn fast_options(auto_capture: bool) -> ScanOptions {
        ScanOptions {
            config: ScannerConfig {
                tick_interval_ms: 10,
                auto_capture_delay_ms: 30,
                ..Default::default()
            },
            auto_capture,
            frame_interval: Duration::from_millis(5),
        }
    }

    async fn next_capture(rx: &mut mpsc::Receiver<ScanEvent>) -> Option<CaptureTrigger> {
        let wait = async {
            while let Some(event) = rx.recv().await {
                match event {
                    ScanEvent::Captured { trigger, .. } => return Some(trigger),
                    ScanEvent::Stopped(_) => return None,
                    ScanEvent::Feedback(_) => {}
                }
            }
            None
        };
        time::timeout(Duration::from_secs(5), wait).await.ok().flatten()
    }

    #[tokio::test]
    async fn unavailable_camera_never_starts() {
        let result = run_scan(StaticSource::broken(), ScanOptions::default()).await;
        assert!(matches!(result, Err(CaptureError::CameraUnavailable(_))));
    }

    #[tokio::test]
    async fn positioned_ticket_is_auto_captured() {
        let (handle, mut rx) = run_scan(StaticSource::new(vec![striped()], true), fast_options(true))
            .await
            .unwrap();
        assert_eq!(next_capture(&mut rx).await, Some(CaptureTrigger::Auto));
        handle.stop().await;
    }

    #[tokio::test]
    async fn manual_capture_without_auto() {
        let (handle, mut rx) = run_scan(StaticSource::new(vec![solid(255)], true), fast_options(false))
            .await
            .unwrap();
        time::sleep(Duration::from_millis(50)).await;
        handle.capture_now().await;
        assert_eq!(next_capture(&mut rx).await, Some(CaptureTrigger::Manual));
        handle.stop().await;
    }

    #[tokio::test]
    async fn exhausted_source_stops_the_scan() {
        let frames = vec![solid(255), solid(255), solid(255)];
        let (_handle, mut rx) = run_scan(StaticSource::new(frames, false), fast_options(false))
            .await
            .unwrap();
        let mut reason = None;
        while let Some(event) = rx.recv().await {
            if let ScanEvent::Stopped(r) = event {
                reason = Some(r);
                break;
            }
        }
        assert_eq!(reason, Some(StopReason::SourceEnded));
    }

    #[tokio::test]
    async fn stop_reports_requested() {
        let (handle, mut rx) = run_scan(StaticSource::new(vec![solid(255)], true), fast_options(true))
            .await
            .unwrap();
        handle.stop().await;
        let mut last = None;
        while let Some(event) = rx.recv().await {
            last = Some(event);
        }
        assert!(matches!(last, Some(ScanEvent::Stopped(StopReason::Requested))));
    }
}
