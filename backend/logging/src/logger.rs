//! Structured Logger
//!
//! Wraps `tracing` to provide JSON-formatted output, file rotation (NDJSON),
//! and environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_PREFIX: &str = "ticketscan.log";

/// Initialize the global structured logger.
///
/// `RUST_LOG` wins over `level`. Safe to call more than once; later calls
/// leave the first subscriber in place.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // NDJSON to `<log_dir>/ticketscan.log.YYYY-MM-DD`
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_ansi(false);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
