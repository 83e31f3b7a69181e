//! Session Context
//!
//! Explicit owner of the operator session (token + username). Hydrated from
//! a JSON file on start, written on login, cleared on logout. Components
//! that need the session get it from here rather than from global state.

mod storage;

pub use storage::SessionStorage;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::{ConsoleError, ConsoleResult};
use super::remote::Authenticator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

impl Session {
    /// Both fields must be present for a session to count
    pub fn is_complete(&self) -> bool {
        !self.token.trim().is_empty() && !self.username.trim().is_empty()
    }
}

pub struct SessionContext {
    auth: Arc<dyn Authenticator>,
    storage: SessionStorage,
    current: Option<Session>,
}

impl SessionContext {
    pub fn new(auth: Arc<dyn Authenticator>, storage: SessionStorage) -> Self {
        Self {
            auth,
            storage,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.username.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Restore a persisted session. Returns whether one was found.
    pub fn hydrate(&mut self) -> bool {
        match self.storage.load() {
            Ok(Some(session)) if session.is_complete() => {
                log::info!("Session restored for {}", session.username);
                self.auth.set_token(session.token.clone());
                self.current = Some(session);
                true
            }
            Ok(Some(_)) => {
                log::warn!("Ignoring incomplete session file {}", self.storage.path().display());
                false
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("Could not read session file: {}", e);
                false
            }
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> ConsoleResult<&Session> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ConsoleError::validation("Username and password are required"));
        }

        let response = self.auth.login(username, password).await.map_err(|e| {
            log::error!("Login failed for {}: {}", username, e);
            ConsoleError::from_auth(e)
        })?;

        let session = Session {
            token: response.token,
            username: response.username,
        };
        if let Err(e) = self.storage.save(&session) {
            // The session still works for this run
            log::warn!("Could not persist session: {}", e);
        }
        self.auth.set_token(session.token.clone());

        Ok(self.current.insert(session))
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, password: &str, confirm: &str) -> ConsoleResult<String> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ConsoleError::validation("Username and password are required"));
        }
        if password != confirm {
            return Err(ConsoleError::validation("Passwords do not match"));
        }

        self.auth.register(username, password).await.map_err(|e| {
            log::error!("Registration failed for {}: {}", username, e);
            ConsoleError::from_auth(e)
        })
    }

    /// Drop the in-memory session, the bearer token and the persisted file
    pub fn logout(&mut self) {
        if let Some(session) = self.current.take() {
            log::info!("Logged out {}", session.username);
        }
        self.auth.clear_token();
        if let Err(e) = self.storage.clear() {
            log::warn!("Could not remove session file: {}", e);
        }
    }
}
