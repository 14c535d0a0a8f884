use std::net::SocketAddr;

use anyhow::{bail, Context, Result};

use ticketscan_understanding::vision::{VisionProvider, DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL};

/// TicketScan runtime configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// `gemini` or `openai`
    pub vision_provider: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    /// Web API key for Firebase token verification
    pub firebase_api_key: Option<String>,
    /// The one account allowed to call the API
    pub allowed_user_email: Option<String>,
    /// Fixed bearer token accepted for the allowed account, local use only
    pub dev_token: Option<String>,
    pub draw_results_base_url: String,
    /// Log level
    pub log_level: String,
    pub log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

impl AppConfig {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        Self {
            bind_address: or("TICKETSCAN_BIND", "0.0.0.0"),
            port: var("TICKETSCAN_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            vision_provider: or("VISION_PROVIDER", "gemini").to_lowercase(),
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_model: or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            firebase_api_key: var("FIREBASE_API_KEY"),
            allowed_user_email: var("ALLOWED_USER_EMAIL"),
            dev_token: var("TICKETSCAN_DEV_TOKEN"),
            draw_results_base_url: or("DRAW_RESULTS_BASE_URL", ticketscan_draws::DEFAULT_BASE_URL),
            log_level: or("RUST_LOG", "info"),
            log_dir: or("TICKETSCAN_LOG_DIR", "logs"),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.bind_address, self.port))
    }

    /// The configured vision model. Fails if its API key is missing.
    pub fn vision(&self) -> Result<VisionProvider> {
        match self.vision_provider.as_str() {
            "gemini" => {
                let key = self.gemini_api_key.as_ref().context("GEMINI_API_KEY is not set")?;
                Ok(VisionProvider::gemini(key).with_model(&self.gemini_model))
            }
            "openai" => {
                let key = self.openai_api_key.as_ref().context("OPENAI_API_KEY is not set")?;
                Ok(VisionProvider::openai(key).with_model(&self.openai_model))
            }
            other => bail!("unknown VISION_PROVIDER '{other}', expected 'gemini' or 'openai'"),
        }
    }
}

fn secret(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "<redacted>"
    } else {
        "<unset>"
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("vision_provider", &self.vision_provider)
            .field("gemini_api_key", &secret(&self.gemini_api_key))
            .field("gemini_model", &self.gemini_model)
            .field("openai_api_key", &secret(&self.openai_api_key))
            .field("openai_model", &self.openai_model)
            .field("firebase_api_key", &secret(&self.firebase_api_key))
            .field("allowed_user_email", &self.allowed_user_email)
            .field("dev_token", &secret(&self.dev_token))
            .field("draw_results_base_url", &self.draw_results_base_url)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}
