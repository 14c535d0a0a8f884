//! Gateway Health API
//!
//! Public liveness endpoint. Does not touch any collaborator.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub uptime_seconds: u64,
    pub vision_provider: String,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        vision_provider: state.vision.name().to_string(),
        timestamp: Utc::now(),
    })
}
