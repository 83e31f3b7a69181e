//! Remote Authority Module
//!
//! This module handles:
//! - HTTP/JSON calls against the remote threat authority
//! - Login/registration and detection collaborators
//! - The `ThreatRemote` seam the Threat Store talks through

pub mod client;
pub mod memory;


pub use client::{ApiClient, ApiConfig, LoginResponse};
pub use memory::MemoryRemote;

use async_trait::async_trait;
use thiserror::Error;

use super::threat::{Threat, ThreatDraft, ThreatId};

/// Transport-level failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("No active session")]
    NotAuthenticated,

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Login/registration collaborator. Holds the bearer token used by the
/// authenticated calls of the same authority.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `POST /login`
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// `POST /register`, returns the server's message
    async fn register(&self, username: &str, password: &str) -> Result<String, ApiError>;

    fn set_token(&self, token: String);

    fn clear_token(&self);
}

/// CRUD surface of the remote authority for threat records.
///
/// Implementations must not touch any local cache; the Threat Store applies
/// results only after a call returns `Ok`.
#[async_trait]
pub trait ThreatRemote: Send + Sync {
    /// `GET /threats`
    async fn list_threats(&self) -> Result<Vec<Threat>, ApiError>;

    /// `POST /threats`, returns the assigned id
    async fn create_threat(&self, draft: &ThreatDraft) -> Result<ThreatId, ApiError>;

    /// `PUT /threats/{id}` with the full record
    async fn update_threat(&self, threat: &Threat) -> Result<(), ApiError>;

    /// `DELETE /threats/{id}`
    async fn delete_threat(&self, id: &ThreatId) -> Result<(), ApiError>;
}
