//! In-Memory Remote Authority
//!
//! Offline stand-in for the HTTP authority. Used by the console's offline
//! mode and by tests, which can inject failures and hold responses back to
//! reorder them.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{ApiError, Authenticator, LoginResponse, ThreatRemote};
use crate::logic::threat::{Threat, ThreatDraft, ThreatId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    List,
    Create,
    Update,
    Delete,
}

pub struct MemoryRemote {
    records: Mutex<Vec<Threat>>,
    next_id: AtomicU64,
    offline: AtomicBool,
    failures: Mutex<HashMap<RemoteOp, VecDeque<ApiError>>>,
    holds: Mutex<HashMap<RemoteOp, VecDeque<oneshot::Receiver<()>>>>,
    calls: Mutex<HashMap<RemoteOp, usize>>,
    users: Mutex<HashMap<String, String>>,
    token: Mutex<Option<String>>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            offline: AtomicBool::new(false),
            failures: Mutex::new(HashMap::new()),
            holds: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
            token: Mutex::new(None),
        }
    }

    /// Ids are assigned sequentially from `first_id`
    pub fn starting_at(self, first_id: u64) -> Self {
        self.next_id.store(first_id, Ordering::SeqCst);
        self
    }

    pub fn with_records(self, records: Vec<Threat>) -> Self {
        *self.records.lock() = records;
        self
    }

    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.users.lock().insert(username.to_string(), password.to_string());
        self
    }

    /// Token most recently handed to `set_token`
    pub fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    /// What `GET /threats` would return right now
    pub fn snapshot(&self) -> Vec<Threat> {
        self.records.lock().clone()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail the next call of `op` with `err`
    pub fn fail_next(&self, op: RemoteOp, err: ApiError) {
        self.failures.lock().entry(op).or_default().push_back(err);
    }

    /// Hold the next call of `op` until the returned sender fires (or drops)
    pub fn hold_next(&self, op: RemoteOp) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().entry(op).or_default().push_back(rx);
        tx
    }

    /// Number of calls of `op` received so far, including held ones
    pub fn call_count(&self, op: RemoteOp) -> usize {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    async fn enter(&self, op: RemoteOp) -> Result<(), ApiError> {
        *self.calls.lock().entry(op).or_default() += 1;

        let gate = self.holds.lock().get_mut(&op).and_then(|q| q.pop_front());
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Network("authority unreachable".to_string()));
        }

        let injected = self.failures.lock().get_mut(&op).and_then(|q| q.pop_front());
        match injected {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(id: &ThreatId) -> ApiError {
        ApiError::Server {
            status: 404,
            message: format!("Threat {} not found or unauthorized", id),
        }
    }
}

#[async_trait]
impl ThreatRemote for MemoryRemote {
    async fn list_threats(&self) -> Result<Vec<Threat>, ApiError> {
        self.enter(RemoteOp::List).await?;
        Ok(self.snapshot())
    }

    async fn create_threat(&self, draft: &ThreatDraft) -> Result<ThreatId, ApiError> {
        self.enter(RemoteOp::Create).await?;

        let id = ThreatId::new(self.next_id.fetch_add(1, Ordering::SeqCst).to_string());
        self.records.lock().push(Threat::from_draft(id.clone(), draft.clone()));
        Ok(id)
    }

    async fn update_threat(&self, threat: &Threat) -> Result<(), ApiError> {
        self.enter(RemoteOp::Update).await?;

        let mut records = self.records.lock();
        let slot = records
            .iter_mut()
            .find(|t| t.id == threat.id)
            .ok_or_else(|| Self::not_found(&threat.id))?;
        *slot = threat.clone();
        Ok(())
    }

    async fn delete_threat(&self, id: &ThreatId) -> Result<(), ApiError> {
        self.enter(RemoteOp::Delete).await?;

        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|t| &t.id != id);
        if records.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl Authenticator for MemoryRemote {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Network("authority unreachable".to_string()));
        }

        match self.users.lock().get(username) {
            Some(stored) if stored == password => Ok(LoginResponse {
                token: format!("mem-{}", username),
                username: username.to_string(),
            }),
            _ => Err(ApiError::Unauthorized("Invalid credentials".to_string())),
        }
    }

    async fn register(&self, username: &str, password: &str) -> Result<String, ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Network("authority unreachable".to_string()));
        }

        let mut users = self.users.lock();
        if users.contains_key(username) {
            return Err(ApiError::Server {
                status: 400,
                message: "Username already exists".to_string(),
            });
        }
        users.insert(username.to_string(), password.to_string());
        Ok("User registered successfully".to_string())
    }

    fn set_token(&self, token: String) {
        *self.token.lock() = Some(token);
    }

    fn clear_token(&self) {
        *self.token.lock() = None;
    }
}
