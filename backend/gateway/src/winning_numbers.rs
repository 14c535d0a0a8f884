//! Official results endpoint (`GET /winning-numbers?date=YYYY-MM-DD`).

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use logging::{EventLogger, TicketEvent};
use ticketscan_core::{DrawResult, derive_draw_id, parse_lookup_date};
use ticketscan_draws::fetch_for_date;

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Handler for `GET /winning-numbers`.
pub async fn winning_numbers(
    State(state): State<GatewayState>,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<DateQuery>,
) -> Result<Json<DrawResult>, ApiError> {
    let raw_date = query
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or(ApiError::MissingDate)?;
    let date = parse_lookup_date(raw_date)?;

    let request_id = Uuid::new_v4().to_string();
    match fetch_for_date(state.draws.as_ref(), date).await {
        Ok((draw_id, result)) => {
            info!(request_id = %request_id, draw_id = %draw_id, "Official results fetched");
            EventLogger::log_event(&request_id, TicketEvent::LookupSucceeded { draw_id });
            Ok(Json(result))
        }
        Err(e) => {
            warn!(request_id = %request_id, draw_id = %derive_draw_id(date), error = %e, "Draw lookup failed");
            EventLogger::log_event(
                &request_id,
                TicketEvent::LookupFailed {
                    draw_id: e.draw_id().to_string(),
                    error: e.to_string(),
                },
            );
            Err(e.into())
        }
    }
}
