//! Gateway Authentication Module
//!
//! Bearer-token extractor. Verifies the token, then enforces the single
//! allow-listed account. Runs before any handler body, so rejected callers
//! never reach the vision model or the results feed.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, warn};
use uuid::Uuid;

use logging::{EventLogger, TicketEvent};
use ticketscan_core::{AuthError, VerifiedUser};

use crate::error::ApiError;
use crate::server::GatewayState;

pub struct RequireAuth(pub VerifiedUser);

/// The token after `Bearer `, if the header is present and well formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|val| val.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    GatewayState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = GatewayState::from_ref(state);
        match authenticate(&state, &parts.headers).await {
            Ok(user) => {
                debug!(email = %user.email, "Request authenticated");
                Ok(RequireAuth(user))
            }
            Err(e) => {
                warn!(path = %parts.uri.path(), error = %e, "Rejected request");
                EventLogger::log_event(
                    &Uuid::new_v4().to_string(),
                    TicketEvent::AuthRejected { reason: e.to_string() },
                );
                Err(e.into())
            }
        }
    }
}

async fn authenticate(state: &GatewayState, headers: &HeaderMap) -> Result<VerifiedUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    let user = state.verifier.verify(token).await?;
    if user.email != state.allowed_email {
        return Err(AuthError::Forbidden { email: user.email });
    }
    Ok(user)
}
