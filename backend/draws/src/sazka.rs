use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use ticketscan_core::{DrawResult, DrawResultsSource, LookupError};

use crate::response::{select_draw_result, RawDraw};

pub const DEFAULT_BASE_URL: &str = "https://www.sazka.cz";

/// HTTP client for the official Sportka results feed.
#[derive(Debug, Clone)]
pub struct SazkaClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for SazkaClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SazkaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn results_url(&self, draw_id: &str) -> String {
        format!(
            "{}/api/draw-info/draws/universal/sportka/{draw_id}/results",
            self.base_url
        )
    }
}

#[async_trait]
impl DrawResultsSource for SazkaClient {
    async fn fetch(&self, draw_id: &str) -> Result<DrawResult, LookupError> {
        let url = self.results_url(draw_id);
        debug!(url = %url, "Fetching draw results");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Transport {
                draw_id: draw_id.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            info!(draw_id, "No official results for draw");
            return Err(LookupError::NotFound {
                draw_id: draw_id.to_string(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(draw_id, status = status.as_u16(), "Draw results API error");
            return Err(LookupError::Upstream {
                draw_id: draw_id.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let raw: RawDraw = resp.json().await.map_err(|e| LookupError::Decode {
            draw_id: draw_id.to_string(),
            message: e.to_string(),
        })?;
        Ok(select_draw_result(raw))
    }
}
