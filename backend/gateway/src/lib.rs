//! TicketScan Gateway HTTP API Server
//!
//! Ticket extraction and official-results lookup behind bearer-token auth.

pub mod auth;
pub mod error;
pub mod extract_api;
pub mod health_api;
pub mod server;
pub mod verifier;
pub mod winning_numbers;

pub use error::ApiError;
pub use server::{GatewayState, build_router, start_server};
pub use verifier::{FirebaseVerifier, StaticTokenVerifier};
