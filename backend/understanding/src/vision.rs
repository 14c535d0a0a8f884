/// Vision understanding: read a ticket photo with a hosted vision LLM.
///
/// The reply is free text; callers run it through [`crate::normalize`].
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::{debug, info};

use ticketscan_core::VisionModel;

/// Fixed extraction prompt sent with every ticket photo.
pub const TICKET_PROMPT: &str = "Extract the winning numbers, date, and Sance number from this lottery ticket. \
Format the output as a JSON object with 'date' (date after string 'POCET SLOSOVANI'), \
'sanceNumber' (number after string 'Sance' in a same row, like '089229' with no colons or semicolons), \
and 'winningNumbers' (an array of strings, where each string represents a row of numbers like '05 21 32 36 38 46 NT').";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Supported vision providers.
#[derive(Clone)]
pub enum VisionProvider {
    OpenAI { api_key: String, model: String },
    Gemini { api_key: String, model: String },
}

impl VisionProvider {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAI { api_key: api_key.into(), model: DEFAULT_OPENAI_MODEL.to_string() }
    }

    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::Gemini { api_key: api_key.into(), model: DEFAULT_GEMINI_MODEL.to_string() }
    }

    pub fn with_model(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            Self::OpenAI { model, .. } | Self::Gemini { model, .. } => *model = name.into(),
        }
        self
    }

    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Gemini { model, .. } => model,
        }
    }
}

impl std::fmt::Debug for VisionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionProvider")
            .field("provider", &self.name())
            .field("model", &self.model())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VisionModel for VisionProvider {
    fn name(&self) -> &str {
        match self {
            Self::OpenAI { .. } => "openai",
            Self::Gemini { .. } => "gemini",
        }
    }

    async fn extract_text(&self, image: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        describe_image(self, image, mime_type, prompt).await
    }
}

/// Describe an image from raw bytes using a vision LLM.
pub async fn describe_image(
    provider: &VisionProvider,
    image_bytes: &[u8],
    mime_type: &str,
    prompt: &str,
) -> Result<String> {
    let b64 = STANDARD.encode(image_bytes);
    match provider {
        VisionProvider::OpenAI { api_key, model } => {
            describe_via_openai(api_key, model, &b64, mime_type, prompt).await
        }
        VisionProvider::Gemini { api_key, model } => {
            describe_via_gemini(api_key, model, &b64, mime_type, prompt).await
        }
    }
}

async fn describe_via_openai(
    api_key: &str, model: &str, b64: &str, mime_type: &str, prompt: &str,
) -> Result<String> {
    info!(model, "[Vision] Reading ticket via OpenAI");
    let client = reqwest::Client::new();
    let body = serde_json::json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": prompt },
                { "type": "image_url",
                  "image_url": { "url": format!("data:{};base64,{}", mime_type, b64) } }
            ]
        }],
        "max_tokens": 512
    });
    let resp = client
        .post("https://api.openai.com/v1/chat/completions")
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .context("OpenAI vision request failed")?;
    let status = resp.status();
    if !status.is_success() {
        bail!("OpenAI vision error {}: {}", status, resp.text().await.unwrap_or_default());
    }
    let json: serde_json::Value = resp.json().await.context("Failed to decode OpenAI response")?;
    let text = openai_text(&json);
    debug!(chars = text.len(), "[Vision] OpenAI reply received");
    Ok(text)
}

async fn describe_via_gemini(
    api_key: &str, model: &str, b64: &str, mime_type: &str, prompt: &str,
) -> Result<String> {
    info!(model, "[Vision] Reading ticket via Gemini");
    let client = reqwest::Client::new();
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
        model
    );
    let body = serde_json::json!({
        "contents": [{ "parts": [
            { "inlineData": { "mimeType": mime_type, "data": b64 } },
            { "text": prompt }
        ]}]
    });
    let resp = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&body)
        .send()
        .await
        .context("Gemini vision request failed")?;
    let status = resp.status();
    if !status.is_success() {
        bail!("Gemini vision error {}: {}", status, resp.text().await.unwrap_or_default());
    }
    let json: serde_json::Value = resp.json().await.context("Failed to decode Gemini response")?;
    let text = gemini_text(&json);
    debug!(chars = text.len(), "[Vision] Gemini reply received");
    Ok(text)
}

fn openai_text(json: &serde_json::Value) -> String {
    json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("")
        .to_string()
}

/// Gemini may split a reply across several parts; join them in order.
fn gemini_text(json: &serde_json::Value) -> String {
    json["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect::<String>())
        .unwrap_or_default()
}
