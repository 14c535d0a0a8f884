//! Scan Event Logger
//!
//! Structured pipeline events (extraction, lookup, auth) written through
//! `tracing` on the `scan_events` target, so the JSON file layer records
//! them as NDJSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

pub const EVENT_TARGET: &str = "scan_events";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicketEvent {
    ExtractionSucceeded {
        provider: String,
        rows: usize,
    },
    /// Carries the full model reply so bad extractions can be diagnosed.
    ExtractionFailed {
        provider: String,
        reason: String,
        raw_response: String,
    },
    LookupSucceeded {
        draw_id: String,
    },
    LookupFailed {
        draw_id: String,
        error: String,
    },
    AuthRejected {
        reason: String,
    },
}

impl TicketEvent {
    fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ExtractionFailed { .. } | Self::LookupFailed { .. } | Self::AuthRejected { .. }
        )
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: TicketEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact and emit one pipeline event. Failures go out at `warn`.
    pub fn log_event(request_id: &str, mut event: TicketEvent) {
        match &mut event {
            TicketEvent::ExtractionFailed { reason, raw_response, .. } => {
                *reason = redact_sensitive_data(reason);
                *raw_response = redact_sensitive_data(raw_response);
            }
            TicketEvent::LookupFailed { error, .. } => {
                *error = redact_sensitive_data(error);
            }
            TicketEvent::AuthRejected { reason } => {
                *reason = redact_sensitive_data(reason);
            }
            TicketEvent::ExtractionSucceeded { .. } | TicketEvent::LookupSucceeded { .. } => {}
        }

        let failure = event.is_failure();
        let entry = EventLogEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        };
        let json = serde_json::to_string(&entry).unwrap_or_default();

        if failure {
            warn!(target: EVENT_TARGET, event = %json, "Scan pipeline event");
        } else {
            info!(target: EVENT_TARGET, event = %json, "Scan pipeline event");
        }
    }
}
