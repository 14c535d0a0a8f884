use anyhow::Result;
use async_trait::async_trait;

use crate::error::{AuthError, LookupError};
use crate::types::{DrawResult, VerifiedUser};

/// A hosted vision-language model. Treated as untyped: whatever text comes
/// back goes through the response normalizer.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Provider name (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Send an image plus prompt and return the model's free-text reply.
    async fn extract_text(&self, image: &[u8], mime_type: &str, prompt: &str) -> Result<String>;
}

/// Verifies a bearer token and returns the identity behind it.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, AuthError>;
}

/// Source of official draw results, keyed by draw identifier.
#[async_trait]
pub trait DrawResultsSource: Send + Sync {
    async fn fetch(&self, draw_id: &str) -> Result<DrawResult, LookupError>;
}
