//! Threat Store - Write-Through Threat Cache
//!
//! Single in-memory collection of threat records for the session.
//!
//! ## Rules
//! - Nothing is inserted, replaced or removed locally before the remote call
//!   that performs the same change has succeeded.
//! - A failed call leaves the collection exactly as it was.
//! - Calls are not serialized against each other. The lock is never held
//!   across a remote call, so two racing updates on one id both apply and
//!   the last response processed wins.


use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use super::error::ConsoleResult;
use super::remote::ThreatRemote;
use super::threat::{Severity, Threat, ThreatDraft, ThreatId};

/// Overlay counts shown next to the scene
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThreatAnalysis {
    pub active: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ThreatAnalysis {
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

#[derive(Clone)]
pub struct ThreatStore {
    remote: Arc<dyn ThreatRemote>,
    threats: Arc<RwLock<Vec<Threat>>>,
}

impl ThreatStore {
    pub fn new(remote: Arc<dyn ThreatRemote>) -> Self {
        Self {
            remote,
            threats: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Copy of the collection in its current order
    pub fn snapshot(&self) -> Vec<Threat> {
        self.threats.read().clone()
    }

    pub fn get(&self, id: &ThreatId) -> Option<Threat> {
        self.threats.read().iter().find(|t| &t.id == id).cloned()
    }

    pub fn contains(&self, id: &ThreatId) -> bool {
        self.threats.read().iter().any(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.threats.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.threats.read().is_empty()
    }

    pub fn analysis(&self) -> ThreatAnalysis {
        let threats = self.threats.read();
        let mut analysis = ThreatAnalysis {
            active: threats.len(),
            ..Default::default()
        };
        for threat in threats.iter() {
            match threat.severity {
                Severity::Critical => analysis.critical += 1,
                Severity::High => analysis.high += 1,
                Severity::Medium => analysis.medium += 1,
                Severity::Low => analysis.low += 1,
            }
        }
        analysis
    }

    /// Fetch the whole collection. On failure the local collection is kept
    /// as it was (empty at session start); there is no automatic retry.
    pub async fn load_all(&self) -> ConsoleResult<Vec<Threat>> {
        match self.remote.list_threats().await {
            Ok(threats) => {
                log::info!("Loaded {} threats from remote authority", threats.len());
                *self.threats.write() = threats.clone();
                Ok(threats)
            }
            Err(e) => {
                log::error!("Error loading threats: {}", e);
                Err(e.into())
            }
        }
    }

    /// Persist a draft, then admit it under the server-assigned id
    pub async fn create(&self, draft: ThreatDraft) -> ConsoleResult<Threat> {
        let id = self.remote.create_threat(&draft).await.map_err(|e| {
            log::error!("Error saving threat: {}", e);
            e
        })?;

        let threat = Threat::from_draft(id, draft);
        {
            let mut threats = self.threats.write();
            // ids stay unique in the cache
            threats.retain(|t| t.id != threat.id);
            threats.push(threat.clone());
        }
        log::info!("Threat {} created at {}", threat.id, threat.position);
        Ok(threat)
    }

    /// Send the full modified record, then replace the cached one
    pub async fn update(&self, threat: Threat) -> ConsoleResult<Threat> {
        self.remote.update_threat(&threat).await.map_err(|e| {
            log::error!("Error updating threat {}: {}", threat.id, e);
            e
        })?;

        let mut threats = self.threats.write();
        match threats.iter_mut().find(|t| t.id == threat.id) {
            Some(slot) => {
                *slot = threat.clone();
                log::info!("Threat {} updated", threat.id);
            }
            None => log::warn!("Threat {} updated remotely but no longer cached", threat.id),
        }
        Ok(threat)
    }

    /// Forget the local collection. Local only; the authority keeps its records.
    pub fn clear(&self) {
        let dropped = std::mem::take(&mut *self.threats.write()).len();
        log::debug!("Cleared {} cached threats", dropped);
    }

    /// Request remote deletion, then drop the cached record
    pub async fn delete(&self, id: &ThreatId) -> ConsoleResult<()> {
        self.remote.delete_threat(id).await.map_err(|e| {
            log::error!("Error deleting threat {}: {}", id, e);
            e
        })?;

        self.threats.write().retain(|t| &t.id != id);
        log::info!("Threat {} deleted", id);
        Ok(())
    }
}
