//! CLI Status Command
//!
//! Probes a running gateway's health endpoint.

use anyhow::Result;

use crate::config::AppConfig;
use crate::terminal_output::{note_success, note_warn};

/// Address to probe: a wildcard bind is reached through loopback.
pub fn health_url(config: &AppConfig) -> String {
    let host = match config.bind_address.as_str() {
        "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
        other => other,
    };
    format!("http://{host}:{}/health", config.port)
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let url = health_url(config);
    match reqwest::get(&url).await {
        Ok(resp) if resp.status().is_success() => {
            let body: serde_json::Value = resp.json().await?;
            note_success(&format!("TicketScan is running at {url}"));
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Ok(resp) => note_warn(&format!("{url} answered {}", resp.status())),
        Err(_) => note_warn(&format!("TicketScan is not running on port {}", config.port)),
    }

    match config.vision() {
        Ok(vision) => note_success(&format!("Vision provider: {vision:?}")),
        Err(e) => note_warn(&format!("Vision provider: {e}")),
    }
    if config.allowed_user_email.is_none() {
        note_warn("ALLOWED_USER_EMAIL is not set; the server will refuse to start");
    }
    Ok(())
}
