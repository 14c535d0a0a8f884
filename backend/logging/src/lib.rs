//! Telemetry and structured logging components for TicketScan.
//!
//! Handles log redaction, JSON file output with daily rotation, and structured
//! scan-pipeline event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, TicketEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
