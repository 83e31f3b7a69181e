//! Threat Detail Editor
//!
//! State machine over one selected threat snapshot:
//!
//! ```text
//! Viewing --begin_edit--> Editing --cancel--> Viewing
//! Editing --save--> (store.update) --> closed
//! Editing --mark_resolved + notes--> ConfirmingResolution --confirm--> (store.delete) --> closed
//! Viewing --delete--> (store.delete) --> closed
//! ```
//!
//! Staged edits live in the state payload and are dropped on cancel or
//! close. A failed remote call keeps the editor open in the same state
//! with the error retained in `last_error`.


use serde::Serialize;

use super::error::{ConsoleError, ConsoleResult};
use super::store::ThreatStore;
use super::threat::{Severity, Threat, ThreatId, ThreatType};

/// Fields the operator may change before committing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagedEdit {
    pub threat_type: ThreatType,
    pub severity: Severity,
    pub description: String,
    pub resolved: bool,
    pub resolution_notes: String,
}

impl StagedEdit {
    fn from_threat(threat: &Threat) -> Self {
        Self {
            threat_type: threat.threat_type,
            severity: threat.severity,
            description: threat.description.clone(),
            resolved: threat.resolved,
            resolution_notes: threat.resolution_notes.clone(),
        }
    }

    pub fn has_resolution_notes(&self) -> bool {
        !self.resolution_notes.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "staged")]
pub enum EditorState {
    Viewing,
    Editing(StagedEdit),
    ConfirmingResolution(StagedEdit),
}

impl EditorState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Viewing => "viewing",
            Self::Editing(_) => "editing",
            Self::ConfirmingResolution(_) => "confirming-resolution",
        }
    }

    pub fn staged(&self) -> Option<&StagedEdit> {
        match self {
            Self::Viewing => None,
            Self::Editing(staged) | Self::ConfirmingResolution(staged) => Some(staged),
        }
    }

    /// Pick the staging state implied by the staged fields
    fn settle(staged: StagedEdit) -> Self {
        if staged.resolved && staged.has_resolution_notes() {
            Self::ConfirmingResolution(staged)
        } else {
            Self::Editing(staged)
        }
    }
}

pub struct ThreatEditor {
    threat: Threat,
    state: EditorState,
    last_error: Option<ConsoleError>,
    closed: bool,
}

impl ThreatEditor {
    /// Bind to a copy of `threat` in `Viewing`
    pub fn open(threat: Threat) -> Self {
        log::debug!("Editor opened for threat {}", threat.id);
        Self {
            threat,
            state: EditorState::Viewing,
            last_error: None,
            closed: false,
        }
    }

    pub fn threat(&self) -> &Threat {
        &self.threat
    }

    pub fn threat_id(&self) -> &ThreatId {
        &self.threat.id
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn last_error(&self) -> Option<&ConsoleError> {
        self.last_error.as_ref()
    }

    /// True once a save, confirm or delete succeeded
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Save is offered only while editing without a staged resolution
    pub fn can_save(&self) -> bool {
        matches!(&self.state, EditorState::Editing(staged) if !staged.resolved)
    }

    pub fn can_confirm_resolution(&self) -> bool {
        matches!(self.state, EditorState::ConfirmingResolution(_))
    }

    pub fn can_delete(&self) -> bool {
        matches!(self.state, EditorState::Viewing) && !self.threat.resolved
    }

    pub fn begin_edit(&mut self) -> ConsoleResult<()> {
        self.ensure_open()?;
        if self.threat.resolved {
            return self.reject("Resolved threats cannot be edited");
        }
        if !matches!(self.state, EditorState::Viewing) {
            return self.reject("Already editing");
        }

        self.state = EditorState::Editing(StagedEdit::from_threat(&self.threat));
        self.last_error = None;
        Ok(())
    }

    /// Back to `Viewing`, discarding staged changes
    pub fn cancel_edit(&mut self) {
        if self.state.staged().is_some() {
            log::debug!("Discarded staged edits for threat {}", self.threat.id);
        }
        self.state = EditorState::Viewing;
        self.last_error = None;
    }

    pub fn set_type(&mut self, threat_type: ThreatType) -> ConsoleResult<()> {
        self.stage(|staged| staged.threat_type = threat_type)
    }

    pub fn set_severity(&mut self, severity: Severity) -> ConsoleResult<()> {
        self.stage(|staged| staged.severity = severity)
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> ConsoleResult<()> {
        let description = description.into();
        self.stage(|staged| staged.description = description)
    }

    /// Toggle the staged resolved flag; notes become required when set
    pub fn mark_resolved(&mut self, resolved: bool) -> ConsoleResult<()> {
        self.stage(|staged| staged.resolved = resolved)
    }

    pub fn set_resolution_notes(&mut self, notes: impl Into<String>) -> ConsoleResult<()> {
        let notes = notes.into();
        self.stage(|staged| staged.resolution_notes = notes)
    }

    /// Commit staged type/severity/description through the store
    pub async fn save(&mut self, store: &ThreatStore) -> ConsoleResult<Threat> {
        self.ensure_open()?;
        let staged = match self.state.clone() {
            EditorState::Editing(staged) if !staged.resolved => staged,
            EditorState::Viewing => return self.reject("Nothing to save"),
            _ => return self.reject("Confirm the resolution instead of saving"),
        };

        let mut updated = self.threat.clone();
        updated.threat_type = staged.threat_type;
        updated.severity = staged.severity;
        updated.description = staged.description;

        match store.update(updated).await {
            Ok(saved) => {
                self.threat = saved.clone();
                self.finish();
                Ok(saved)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Resolve by deleting the record from the remote authority.
    /// Rejected locally while the resolution notes are blank.
    pub async fn confirm_resolution(&mut self, store: &ThreatStore) -> ConsoleResult<ThreatId> {
        self.ensure_open()?;
        if !self.can_confirm_resolution() {
            let resolved_staged = self.state.staged().is_some_and(|staged| staged.resolved);
            return self.reject(if resolved_staged {
                "Resolution notes are required"
            } else {
                "Mark the threat as resolved first"
            });
        }

        let id = self.threat.id.clone();
        match store.delete(&id).await {
            Ok(()) => {
                log::info!("Threat {} resolved", id);
                self.finish();
                Ok(id)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Explicit delete, available from `Viewing` while unresolved
    pub async fn delete(&mut self, store: &ThreatStore) -> ConsoleResult<ThreatId> {
        self.ensure_open()?;
        if !self.can_delete() {
            return self.reject("Delete is only available while viewing an unresolved threat");
        }

        let id = self.threat.id.clone();
        match store.delete(&id).await {
            Ok(()) => {
                self.finish();
                Ok(id)
            }
            Err(e) => self.fail(e),
        }
    }

    fn stage(&mut self, apply: impl FnOnce(&mut StagedEdit)) -> ConsoleResult<()> {
        self.ensure_open()?;
        let state = std::mem::replace(&mut self.state, EditorState::Viewing);
        match state {
            EditorState::Editing(mut staged) | EditorState::ConfirmingResolution(mut staged) => {
                apply(&mut staged);
                self.state = EditorState::settle(staged);
                Ok(())
            }
            EditorState::Viewing => self.reject("Start editing first"),
        }
    }

    fn ensure_open(&self) -> ConsoleResult<()> {
        if self.closed {
            return Err(ConsoleError::validation("Editor is closed"));
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.state = EditorState::Viewing;
        self.last_error = None;
        self.closed = true;
    }

    fn reject<T>(&mut self, msg: &str) -> ConsoleResult<T> {
        let err = ConsoleError::validation(msg);
        self.last_error = Some(err.clone());
        Err(err)
    }

    fn fail<T>(&mut self, err: ConsoleError) -> ConsoleResult<T> {
        self.last_error = Some(err.clone());
        Err(err)
    }
}
