//! HTTP error mapping.
//!
//! Every failure leaves the gateway as `{ "error": "<message>" }` with a
//! status chosen by error kind. Message texts are the ones the web client
//! already displays.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use ticketscan_core::{AuthError, DateError, ExtractionError, LookupError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("malformed multipart body: {0}")]
    BadForm(String),

    #[error("no image in upload")]
    MissingImage,

    #[error("missing date parameter")]
    MissingDate,

    #[error(transparent)]
    Date(#[from] DateError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("vision provider {provider} failed: {message}")]
    Vision { provider: String, message: String },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadForm(_) | Self::MissingImage | Self::MissingDate | Self::Date(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(AuthError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Vision { .. } | Self::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Lookup(LookupError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Lookup(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Client-facing message. Internal detail stays in the logs.
    pub fn message(&self) -> String {
        match self {
            Self::MethodNotAllowed => "Method not allowed".into(),
            Self::BadForm(_) => "Error parsing form data".into(),
            Self::MissingImage => "No image file uploaded.".into(),
            Self::MissingDate => "Missing or invalid date parameter. Use YYYY-MM-DD.".into(),
            Self::Date(_) => "Invalid date format. Use YYYY-MM-DD.".into(),
            Self::Auth(AuthError::Forbidden { .. }) => {
                "Forbidden: You are not allowed to use this API.".into()
            }
            Self::Auth(_) => "Unauthorized: Invalid or missing token".into(),
            Self::Vision { .. } => "Error processing image.".into(),
            Self::Extraction(e) => format!("Could not parse data from AI. Raw response: {}", e.raw()),
            Self::Lookup(LookupError::NotFound { draw_id }) => {
                format!("No winning numbers published for draw {draw_id}.")
            }
            Self::Lookup(_) => "Failed to fetch winning numbers from Sazka.".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message() });
        (self.status(), Json(body)).into_response()
    }
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
