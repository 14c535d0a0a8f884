//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument};

use ticketscan_core::{DrawResultsSource, TokenVerifier, VisionModel};

use crate::error::method_not_allowed;
use crate::{extract_api, health_api, winning_numbers};

/// Phone photos routinely exceed axum's 2 MB default.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub vision: Arc<dyn VisionModel>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub draws: Arc<dyn DrawResultsSource>,
    /// The one account allowed to use the API.
    pub allowed_email: String,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(
        vision: Arc<dyn VisionModel>,
        verifier: Arc<dyn TokenVerifier>,
        draws: Arc<dyn DrawResultsSource>,
        allowed_email: impl Into<String>,
    ) -> Self {
        Self {
            vision,
            verifier,
            draws,
            allowed_email: allowed_email.into(),
            started_at: Instant::now(),
        }
    }
}

fn api_routes() -> Router<GatewayState> {
    Router::new()
        .route("/health", get(health_api::get_health))
        .route(
            "/extract-lottery-data",
            post(extract_api::extract_lottery_data).fallback(method_not_allowed),
        )
        .route(
            "/winning-numbers",
            get(winning_numbers::winning_numbers).fallback(method_not_allowed),
        )
}

/// Routes are served both at the root and under `/api`.
pub fn build_router(state: GatewayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the main Axum HTTP server for the gateway.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Gateway HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server error")?;

    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
