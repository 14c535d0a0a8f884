//! Ticket extraction endpoint (`POST /extract-lottery-data`).

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use tracing::{error, info, warn};
use uuid::Uuid;

use logging::{EventLogger, TicketEvent};
use ticketscan_core::ExtractedTicket;
use ticketscan_understanding::{TICKET_PROMPT, normalize};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::server::GatewayState;

/// Multipart field carrying the photo.
pub const IMAGE_FIELD: &str = "lotteryImage";
pub const DEFAULT_MIME: &str = "image/png";

/// Pull the image part out of the upload.
async fn read_image(mut multipart: Multipart) -> Result<(Bytes, String), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadForm(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let mime = field.content_type().unwrap_or(DEFAULT_MIME).to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadForm(e.to_string()))?;
        if data.is_empty() {
            return Err(ApiError::MissingImage);
        }
        return Ok((data, mime));
    }
    Err(ApiError::MissingImage)
}

/// Handler for `POST /extract-lottery-data`.
pub async fn extract_lottery_data(
    State(state): State<GatewayState>,
    RequireAuth(user): RequireAuth,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractedTicket>, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadForm(e.body_text()))?;
    let (image, mime) = read_image(multipart).await?;

    let request_id = Uuid::new_v4().to_string();
    let provider = state.vision.name().to_string();
    info!(
        request_id = %request_id,
        email = %user.email,
        provider = %provider,
        bytes = image.len(),
        mime = %mime,
        "Extracting ticket"
    );

    let raw = state
        .vision
        .extract_text(&image, &mime, TICKET_PROMPT)
        .await
        .map_err(|e| {
            error!(request_id = %request_id, error = %e, "Error processing image");
            ApiError::Vision {
                provider: provider.clone(),
                message: e.to_string(),
            }
        })?;

    match normalize(&raw) {
        Ok(ticket) => {
            EventLogger::log_event(
                &request_id,
                TicketEvent::ExtractionSucceeded {
                    provider,
                    rows: ticket.winning_rows.len(),
                },
            );
            Ok(Json(ticket))
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Could not normalize model response");
            EventLogger::log_event(
                &request_id,
                TicketEvent::ExtractionFailed {
                    provider,
                    reason: e.to_string(),
                    raw_response: e.raw().to_string(),
                },
            );
            Err(e.into())
        }
    }
}
