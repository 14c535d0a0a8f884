//! Identity-token verifiers.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use ticketscan_core::{AuthError, TokenVerifier, VerifiedUser};

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";

/// Verifies Firebase ID tokens through the Identity Toolkit
/// `accounts:lookup` endpoint. Any failure is an invalid token.
pub struct FirebaseVerifier {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    email: Option<String>,
}

impl FirebaseVerifier {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, IDENTITY_TOOLKIT_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl std::fmt::Debug for FirebaseVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseVerifier")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, AuthError> {
        let url = format!("{}/v1/accounts:lookup?key={}", self.base_url, self.api_key);
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await
            .map_err(|e| AuthError::InvalidToken(format!("identity service unreachable: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AuthError::InvalidToken(format!("identity service returned {status}")));
        }

        let body: LookupResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::InvalidToken(format!("unreadable identity response: {}", e.without_url())))?;

        let email = body
            .users
            .into_iter()
            .find_map(|u| u.email)
            .ok_or_else(|| AuthError::InvalidToken("token has no email".into()))?;
        debug!(email = %email, "Token verified");
        Ok(VerifiedUser { email })
    }
}

/// Fixed token → email table for local development and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, email: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), email.into());
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, AuthError> {
        self.tokens
            .get(token)
            .map(|email| VerifiedUser { email: email.clone() })
            .ok_or_else(|| AuthError::InvalidToken("unknown token".into()))
    }
}
