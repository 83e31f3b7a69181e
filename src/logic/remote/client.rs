//! Remote API Client
//!
//! HTTP client for communicating with the threat authority.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{ApiError, Authenticator, ThreatRemote};
use crate::logic::threat::{Threat, ThreatDraft, ThreatId};

/// Remote authority configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub server_url: String,
    /// `None` leaves requests pending until the server answers
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        use crate::constants;

        Self {
            server_url: constants::get_server_url(),
            timeout_seconds: constants::get_http_timeout_secs(),
        }
    }
}

/// Remote authority client
pub struct ApiClient {
    config: ApiConfig,
    token: RwLock<Option<String>>,
    http_client: reqwest::Client,
}

// Request/Response types

#[derive(Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

impl ApiClient {
    /// Create new API client
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            config,
            token: RwLock::new(None),
            http_client,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.config.server_url
    }

    /// Set bearer token (from login or a hydrated session)
    pub fn set_token(&self, token: String) {
        *self.token.write() = Some(token);
    }

    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.server_url, path)
    }

    fn bearer(&self) -> Result<String, ApiError> {
        self.token
            .read()
            .as_ref()
            .map(|t| format!("Bearer {}", t))
            .ok_or(ApiError::NotAuthenticated)
    }

    /// `POST /login`
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self.http_client
            .post(self.url("/login"))
            .json(&CredentialsRequest { username, password })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().is_success() {
            let result: LoginResponse = response.json().await
                .map_err(|e| ApiError::Parse(e.to_string()))?;
            log::info!("Logged in as {}", result.username);
            Ok(result)
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// `POST /register`
    pub async fn register(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let response = self.http_client
            .post(self.url("/register"))
            .json(&CredentialsRequest { username, password })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().is_success() {
            let body: MessageResponse = response.json().await
                .map_err(|e| ApiError::Parse(e.to_string()))?;
            log::info!("Registered operator {}", username);
            Ok(body.message)
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// `POST /start_detection`
    pub async fn start_detection(&self) -> Result<(), ApiError> {
        self.post_empty("/start_detection").await
    }

    /// `POST /stop_detection`
    pub async fn stop_detection(&self) -> Result<(), ApiError> {
        self.post_empty("/stop_detection").await
    }

    /// URL of the pushed image stream consumed by the detection viewer
    pub fn video_feed_url(&self) -> String {
        self.url("/video_feed")
    }

    async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let response = self.http_client
            .post(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}

#[async_trait]
impl Authenticator for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        ApiClient::login(self, username, password).await
    }

    async fn register(&self, username: &str, password: &str) -> Result<String, ApiError> {
        ApiClient::register(self, username, password).await
    }

    fn set_token(&self, token: String) {
        ApiClient::set_token(self, token)
    }

    fn clear_token(&self) {
        ApiClient::clear_token(self)
    }
}

#[async_trait]
impl ThreatRemote for ApiClient {
    async fn list_threats(&self) -> Result<Vec<Threat>, ApiError> {
        let bearer = self.bearer()?;

        let response = self.http_client
            .get(self.url("/threats"))
            .header("Authorization", bearer)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().is_success() {
            response.json().await
                .map_err(|e| ApiError::Parse(e.to_string()))
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn create_threat(&self, draft: &ThreatDraft) -> Result<ThreatId, ApiError> {
        let bearer = self.bearer()?;

        let response = self.http_client
            .post(self.url("/threats"))
            .header("Authorization", bearer)
            .json(draft)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().is_success() {
            let created: CreatedResponse = response.json().await
                .map_err(|e| ApiError::Parse(e.to_string()))?;
            if created.id.is_empty() {
                return Err(ApiError::Parse("server returned an empty id".to_string()));
            }
            Ok(ThreatId::new(created.id))
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn update_threat(&self, threat: &Threat) -> Result<(), ApiError> {
        let bearer = self.bearer()?;

        let response = self.http_client
            .put(self.url(&format!("/threats/{}", threat.id)))
            .header("Authorization", bearer)
            .json(threat)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn delete_threat(&self, id: &ThreatId) -> Result<(), ApiError> {
        let bearer = self.bearer()?;

        let response = self.http_client
            .delete(self.url(&format!("/threats/{}", id)))
            .header("Authorization", bearer)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}

/// Turn a non-success response into an error, keeping the server's
/// `{ "message": ... }` text when there is one
async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageResponse>(&text)
        .map(|m| m.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status.canonical_reason().unwrap_or("request failed").to_string()
        });

    log::error!("Remote call failed ({}): {}", status.as_u16(), message);

    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized(message)
    } else {
        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    }
}
