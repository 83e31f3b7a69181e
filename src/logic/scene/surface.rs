//! Scene Surface
//!
//! Owns camera, viewport, terrain and placement mode. Turns pointer
//! positions into world points or marker hits and assembles each frame:
//! the static block field plus the marker visuals.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::camera::OrbitCamera;
use super::raycast::{intersect_vertical_cylinder, GroundPlane, Ray};
use super::terrain::{Block, Terrain};
use crate::constants::{
    GROUND_EXTENT, MARKER_BASE_HEIGHT, MARKER_BASE_RADIUS, MARKER_BEAM_HEIGHT, MARKER_BEAM_RADIUS,
    MARKER_ELEVATION,
};
use crate::logic::marker::{marker_visual, MarkerVisual};
use crate::logic::threat::{GroundPosition, Threat, ThreatId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Pixel position (origin top-left, +y down) to NDC; `None` off-screen
    pub fn to_ndc(&self, pointer: PointerEvent) -> Option<Vec2> {
        let inside = (0.0..=self.width).contains(&pointer.x) && (0.0..=self.height).contains(&pointer.y);
        inside.then(|| {
            Vec2::new(
                pointer.x / self.width * 2.0 - 1.0,
                1.0 - pointer.y / self.height * 2.0,
            )
        })
    }

    /// NDC back to pixels
    pub fn to_pixels(&self, ndc: Vec2) -> PointerEvent {
        PointerEvent {
            x: (ndc.x + 1.0) / 2.0 * self.width,
            y: (1.0 - ndc.y) / 2.0 * self.height,
        }
    }
}

/// Pointer position in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPoint {
    pub fn ground(&self) -> GroundPosition {
        GroundPosition::new(self.x, self.z)
    }
}

impl From<Vec3> for WorldPoint {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// What a click landed on. Markers sit above the ground and take precedence.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    Marker(ThreatId),
    Ground(WorldPoint),
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub elapsed: f32,
    pub blocks: Vec<Block>,
    pub markers: Vec<MarkerVisual>,
}

pub struct SceneSurface {
    camera: OrbitCamera,
    viewport: Viewport,
    ground: GroundPlane,
    terrain: Arc<Terrain>,
    placement_mode: bool,
}

impl SceneSurface {
    pub fn new(viewport: Viewport, terrain: Terrain) -> Self {
        Self {
            camera: OrbitCamera::default(),
            viewport,
            ground: GroundPlane::new(GROUND_EXTENT),
            terrain: Arc::new(terrain),
            placement_mode: false,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Shared handle for the render task
    pub fn terrain_handle(&self) -> Arc<Terrain> {
        self.terrain.clone()
    }

    pub fn placement_mode(&self) -> bool {
        self.placement_mode
    }

    pub fn set_placement_mode(&mut self, active: bool) {
        if self.placement_mode != active {
            log::info!("Placement mode {}", if active { "on" } else { "off" });
        }
        self.placement_mode = active;
    }

    pub fn toggle_placement_mode(&mut self) -> bool {
        self.set_placement_mode(!self.placement_mode);
        self.placement_mode
    }

    pub fn pointer_ray(&self, pointer: PointerEvent) -> Option<Ray> {
        let ndc = self.viewport.to_ndc(pointer)?;
        self.camera.ray_through(ndc, self.viewport.aspect())
    }

    /// Ground point under the pointer, only while placement mode is active
    pub fn resolve_pointer_to_world(&self, pointer: PointerEvent) -> Option<WorldPoint> {
        if !self.placement_mode {
            return None;
        }
        self.ground_point(pointer)
    }

    fn ground_point(&self, pointer: PointerEvent) -> Option<WorldPoint> {
        let ray = self.pointer_ray(pointer)?;
        self.ground.intersect(&ray).map(WorldPoint::from)
    }

    /// Nearest marker under the pointer
    pub fn pick_marker(&self, pointer: PointerEvent, threats: &[Threat]) -> Option<ThreatId> {
        let ray = self.pointer_ray(pointer)?;

        threats
            .iter()
            .filter_map(|threat| marker_hit_distance(&ray, threat).map(|t| (t, &threat.id)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id.clone())
    }

    pub fn classify_click(&self, pointer: PointerEvent, threats: &[Threat]) -> PointerTarget {
        if let Some(id) = self.pick_marker(pointer, threats) {
            return PointerTarget::Marker(id);
        }
        match self.resolve_pointer_to_world(pointer) {
            Some(point) => PointerTarget::Ground(point),
            None => PointerTarget::Nothing,
        }
    }

    /// Pixel position where a ground point appears on screen
    pub fn screen_position(&self, position: GroundPosition) -> PointerEvent {
        let ndc = self
            .camera
            .project(Vec3::new(position.x, 0.0, position.z), self.viewport.aspect());
        self.viewport.to_pixels(ndc)
    }
}

/// One frame of the scene. Runs on the render path: no I/O.
pub fn render_frame(
    terrain: &Terrain,
    threats: &[Threat],
    elapsed: f32,
    hovered: Option<&ThreatId>,
) -> Frame {
    let markers = threats
        .iter()
        .map(|threat| marker_visual(threat, elapsed, hovered == Some(&threat.id)))
        .collect();
    Frame {
        elapsed,
        blocks: terrain.blocks().to_vec(),
        markers,
    }
}

fn marker_hit_distance(ray: &Ray, threat: &Threat) -> Option<f32> {
    let center = Vec2::new(threat.position.x, threat.position.z);
    let base_bottom = MARKER_ELEVATION - MARKER_BASE_HEIGHT / 2.0;
    let base = intersect_vertical_cylinder(
        ray,
        center,
        MARKER_BASE_RADIUS,
        base_bottom,
        base_bottom + MARKER_BASE_HEIGHT,
    );
    let beam_bottom = MARKER_ELEVATION;
    let beam = intersect_vertical_cylinder(
        ray,
        center,
        MARKER_BEAM_RADIUS,
        beam_bottom,
        beam_bottom + MARKER_BEAM_HEIGHT,
    );

    match (base, beam) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
