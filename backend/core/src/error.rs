use thiserror::Error;

/// The model response could not be turned into a ticket record.
///
/// Every variant carries the full raw response so the caller can log it.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no JSON found in model response")]
    NoJson { raw: String },

    #[error("malformed JSON in model response ({step}): {source}")]
    InvalidJson {
        step: &'static str,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected ticket shape: {reason}")]
    InvalidShape { raw: String, reason: String },
}

impl ExtractionError {
    /// The unmodified model response that failed to normalize.
    pub fn raw(&self) -> &str {
        match self {
            Self::NoJson { raw } | Self::InvalidJson { raw, .. } | Self::InvalidShape { raw, .. } => {
                raw
            }
        }
    }
}

/// Camera acquisition and scan-session failures.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("unable to access camera: {0}")]
    CameraUnavailable(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("scan session is not running")]
    NotRunning,
}

/// Official draw-results lookup failures.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no official results for draw {draw_id}")]
    NotFound { draw_id: String },

    #[error("draw results API returned {status} for draw {draw_id}")]
    Upstream {
        draw_id: String,
        status: u16,
        body: String,
    },

    #[error("draw results request for {draw_id} failed: {message}")]
    Transport { draw_id: String, message: String },

    #[error("draw results for {draw_id} could not be decoded: {message}")]
    Decode { draw_id: String, message: String },
}

impl LookupError {
    pub fn draw_id(&self) -> &str {
        match self {
            Self::NotFound { draw_id }
            | Self::Upstream { draw_id, .. }
            | Self::Transport { draw_id, .. }
            | Self::Decode { draw_id, .. } => draw_id,
        }
    }
}

/// Bearer-token authentication failures. Always fail closed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or malformed bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("{email} is not allowed to use this API")]
    Forbidden { email: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date format, expected YYYY-MM-DD: {0}")]
    Malformed(String),

    #[error("invalid draw identifier: {0}")]
    BadDrawId(String),
}

/// Top-level error type for the TicketScan pipeline.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Date(#[from] DateError),

    #[error("vision provider error ({provider}): {message}")]
    Vision { provider: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
