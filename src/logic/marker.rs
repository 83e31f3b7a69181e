//! Marker Visual State
//!
//! Presentation of one threat marker as a pure function of the record, the
//! animation clock and hover state. Recomputed every frame; no I/O.

use std::time::Instant;

use serde::Serialize;

use super::scene::color::Rgb;
use super::threat::{Severity, Threat, ThreatId};
use crate::constants::MARKER_ELEVATION;

pub const RESOLVED_COLOR: Rgb = Rgb::from_hex(0x4caf50);

pub const BASE_OPACITY: f32 = 0.8;
pub const BEAM_OPACITY: f32 = 0.2;
pub const RING_OPACITY: f32 = 0.3;
pub const EMISSIVE_IDLE: f32 = 0.5;
pub const EMISSIVE_HOVER: f32 = 1.0;

const PULSE_AMPLITUDE: f32 = 0.2;
const PULSE_RATE: f32 = 2.0;

pub fn severity_color(severity: Severity) -> Rgb {
    match severity {
        Severity::Critical => Rgb::from_hex(0xff0000),
        Severity::High => Rgb::from_hex(0xff4d00),
        Severity::Medium => Rgb::from_hex(0xff9900),
        Severity::Low => Rgb::from_hex(0xffcc00),
    }
}

/// Ring scale at `elapsed` seconds since the scene mounted. Shared by every
/// unresolved marker, so all of them pulse in phase.
pub fn pulse_scale(elapsed: f32) -> f32 {
    1.0 + PULSE_AMPLITUDE * (PULSE_RATE * elapsed).sin()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PulseRing {
    pub scale: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerVisual {
    pub threat_id: ThreatId,
    /// World position of the marker base
    pub position: [f32; 3],
    pub color: Rgb,
    pub emissive_intensity: f32,
    pub base_opacity: f32,
    pub beam_opacity: f32,
    /// Absent for resolved threats
    pub ring: Option<PulseRing>,
}

pub fn marker_visual(threat: &Threat, elapsed: f32, hovered: bool) -> MarkerVisual {
    let color = if threat.resolved {
        RESOLVED_COLOR
    } else {
        severity_color(threat.severity)
    };

    let emissive_intensity = if hovered && !threat.resolved {
        EMISSIVE_HOVER
    } else {
        EMISSIVE_IDLE
    };

    let ring = (!threat.resolved).then(|| PulseRing {
        scale: pulse_scale(elapsed),
        opacity: RING_OPACITY,
    });

    MarkerVisual {
        threat_id: threat.id.clone(),
        position: [threat.position.x, MARKER_ELEVATION, threat.position.z],
        color,
        emissive_intensity,
        base_opacity: BASE_OPACITY,
        beam_opacity: BEAM_OPACITY,
        ring,
    }
}

/// Continuous clock started when the scene mounts
#[derive(Debug, Clone, Copy)]
pub struct AnimationClock {
    mounted_at: Instant,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::start()
    }
}

impl AnimationClock {
    pub fn start() -> Self {
        Self {
            mounted_at: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.mounted_at.elapsed().as_secs_f32()
    }
}
