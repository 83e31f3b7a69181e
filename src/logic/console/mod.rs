//! Console - Dashboard State
//!
//! Ties the Threat Store, Scene Surface, Threat Detail Editor and
//! creation flow together: selection, placement mode, hover, notices and
//! the threat analysis overlay.
//!
//! Remote failures never escape as panics. Each one is logged at the call
//! site, recorded as an operator notice and returned to the caller.

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use super::creation;
use super::demo_data::{drone_roster, DemoDataSource, Drone};
use super::editor::ThreatEditor;
use super::error::{ConsoleError, ConsoleResult};
use super::marker::AnimationClock;
use super::remote::ApiClient;
use super::scene::{render_frame, Frame, PointerEvent, PointerTarget, SceneSurface, Terrain};
use super::store::{ThreatAnalysis, ThreatStore};
use super::threat::{Threat, ThreatId};

/// Notices kept for display; older ones are dropped
pub const MAX_NOTICES: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub at: DateTime<Utc>,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// An existing marker was clicked and its editor opened
    Selected(ThreatId),
    /// A ground click in placement mode created a threat
    Created(Threat),
    Ignored,
}

/// Everything the render task needs. Cloned out of the console so frames
/// keep coming while a command awaits the remote authority.
#[derive(Clone)]
pub struct RenderSource {
    terrain: Arc<Terrain>,
    store: ThreatStore,
    clock: AnimationClock,
    hovered: Arc<RwLock<Option<ThreatId>>>,
}

impl RenderSource {
    pub fn frame(&self) -> Frame {
        let threats = self.store.snapshot();
        let hovered = self.hovered.read().clone();
        render_frame(&self.terrain, &threats, self.clock.elapsed_secs(), hovered.as_ref())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOptions {
    pub exit_placement_after_create: bool,
}

pub struct Console {
    store: ThreatStore,
    surface: SceneSurface,
    editor: Option<ThreatEditor>,
    hovered: Arc<RwLock<Option<ThreatId>>>,
    notices: VecDeque<Notice>,
    clock: AnimationClock,
    demo: Box<dyn DemoDataSource>,
    drones: Vec<Drone>,
    detection: Option<Arc<ApiClient>>,
    detection_running: bool,
    options: ConsoleOptions,
}

impl Console {
    pub fn new(
        store: ThreatStore,
        surface: SceneSurface,
        mut demo: Box<dyn DemoDataSource>,
        options: ConsoleOptions,
    ) -> Self {
        let drones = drone_roster(demo.as_mut());
        Self {
            store,
            surface,
            editor: None,
            hovered: Arc::new(RwLock::new(None)),
            notices: VecDeque::new(),
            clock: AnimationClock::start(),
            demo,
            drones,
            detection: None,
            detection_running: false,
            options,
        }
    }

    /// Attach the detection collaborator (HTTP mode only)
    pub fn with_detection(mut self, client: Arc<ApiClient>) -> Self {
        self.detection = Some(client);
        self
    }

    pub fn store(&self) -> &ThreatStore {
        &self.store
    }

    pub fn surface(&self) -> &SceneSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut SceneSurface {
        &mut self.surface
    }

    pub fn editor(&self) -> Option<&ThreatEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut ThreatEditor> {
        self.editor.as_mut()
    }

    pub fn hovered(&self) -> Option<ThreatId> {
        self.hovered.read().clone()
    }

    pub fn drones(&self) -> &[Drone] {
        &self.drones
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn analysis(&self) -> ThreatAnalysis {
        self.store.analysis()
    }

    pub fn render_source(&self) -> RenderSource {
        RenderSource {
            terrain: self.surface.terrain_handle(),
            store: self.store.clone(),
            clock: self.clock,
            hovered: self.hovered.clone(),
        }
    }

    pub fn frame(&self) -> Frame {
        self.render_source().frame()
    }

    pub fn detection_running(&self) -> bool {
        self.detection_running
    }

    /// Session-start load. A failure leaves the collection as it was.
    pub async fn load(&mut self) -> ConsoleResult<usize> {
        match self.store.load_all().await {
            Ok(threats) => Ok(threats.len()),
            Err(e) => Err(self.report(e)),
        }
    }

    pub fn set_placement_mode(&mut self, active: bool) {
        self.surface.set_placement_mode(active);
    }

    pub fn toggle_placement_mode(&mut self) -> bool {
        self.surface.toggle_placement_mode()
    }

    /// Markers take precedence; ground clicks create only in placement mode
    pub async fn click(&mut self, pointer: PointerEvent) -> ConsoleResult<ClickOutcome> {
        let threats = self.store.snapshot();
        match self.surface.classify_click(pointer, &threats) {
            PointerTarget::Marker(id) => {
                self.select(&id)?;
                Ok(ClickOutcome::Selected(id))
            }
            PointerTarget::Ground(point) => {
                match creation::create_at(&self.store, point, self.demo.as_mut()).await {
                    Ok(threat) => {
                        self.editor = Some(ThreatEditor::open(threat.clone()));
                        if self.options.exit_placement_after_create {
                            self.surface.set_placement_mode(false);
                        }
                        Ok(ClickOutcome::Created(threat))
                    }
                    Err(e) => Err(self.report(e)),
                }
            }
            PointerTarget::Nothing => Ok(ClickOutcome::Ignored),
        }
    }

    /// Update the hovered marker; returns it
    pub fn hover(&mut self, pointer: PointerEvent) -> Option<ThreatId> {
        let threats = self.store.snapshot();
        let hit = self.surface.pick_marker(pointer, &threats);
        *self.hovered.write() = hit.clone();
        hit
    }

    /// Open the editor on a copy of the cached record
    pub fn select(&mut self, id: &ThreatId) -> ConsoleResult<()> {
        match self.store.get(id) {
            Some(threat) => {
                self.editor = Some(ThreatEditor::open(threat));
                Ok(())
            }
            None => Err(self.report(ConsoleError::validation(format!("Unknown threat {}", id)))),
        }
    }

    /// Drop everything tied to the operator's session: cached threats,
    /// selection, hover and placement mode. Notices and terrain stay.
    pub fn reset_session(&mut self) {
        self.store.clear();
        self.editor = None;
        *self.hovered.write() = None;
        self.surface.set_placement_mode(false);
    }

    /// Close the editor, discarding staged edits
    pub fn close_editor(&mut self) -> bool {
        self.editor.take().is_some()
    }

    pub async fn save(&mut self) -> ConsoleResult<Threat> {
        let mut editor = self.take_editor()?;
        let result = editor.save(&self.store).await;
        self.settle_editor(editor, result)
    }

    pub async fn confirm_resolution(&mut self) -> ConsoleResult<ThreatId> {
        let mut editor = self.take_editor()?;
        let result = editor.confirm_resolution(&self.store).await;
        self.settle_editor(editor, result)
    }

    pub async fn delete_selected(&mut self) -> ConsoleResult<ThreatId> {
        let mut editor = self.take_editor()?;
        let result = editor.delete(&self.store).await;
        self.settle_editor(editor, result)
    }

    pub async fn set_detection(&mut self, running: bool) -> ConsoleResult<()> {
        let Some(client) = self.detection.clone() else {
            return Err(self.report(ConsoleError::Stream(
                "Detection is unavailable without a remote authority".to_string(),
            )));
        };

        let result = if running {
            client.start_detection().await
        } else {
            client.stop_detection().await
        };

        match result {
            Ok(()) => {
                self.detection_running = running;
                log::info!("Detection {}", if running { "started" } else { "stopped" });
                Ok(())
            }
            Err(e) => {
                log::error!("Detection toggle failed: {}", e);
                Err(self.report(ConsoleError::from_stream(e)))
            }
        }
    }

    pub fn video_feed_url(&self) -> Option<String> {
        self.detection.as_ref().map(|client| client.video_feed_url())
    }

    /// Record a failure for the operator and hand it back
    pub fn report(&mut self, err: ConsoleError) -> ConsoleError {
        log::warn!("{}", err);
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            at: Utc::now(),
            kind: err.kind(),
            message: err.to_string(),
        });
        err
    }

    fn take_editor(&mut self) -> ConsoleResult<ThreatEditor> {
        match self.editor.take() {
            Some(editor) => Ok(editor),
            None => Err(self.report(ConsoleError::validation("No threat selected"))),
        }
    }

    /// Keep the editor open unless the operation closed it
    fn settle_editor<T>(&mut self, editor: ThreatEditor, result: ConsoleResult<T>) -> ConsoleResult<T> {
        if !editor.is_closed() {
            self.editor = Some(editor);
        }
        result.map_err(|e| self.report(e))
    }
}
