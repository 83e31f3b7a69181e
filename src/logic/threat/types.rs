//! Threat Types
//!
//! Core data model for threat records.
//! No sync logic here - only data structures and their wire shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::Sector;
use super::timestamp;

// ============================================================================
// THREAT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatType {
    #[serde(rename = "Unauthorized Access")]
    UnauthorizedAccess,
    #[serde(rename = "Suspicious Activity")]
    SuspiciousActivity,
    #[serde(rename = "Security Breach")]
    SecurityBreach,
    #[serde(rename = "Perimeter Violation")]
    PerimeterViolation,
    #[serde(rename = "Drone Malfunction")]
    DroneMalfunction,
    #[serde(rename = "Communication Interference")]
    CommunicationInterference,
    #[serde(rename = "Unknown Entity")]
    UnknownEntity,
}

impl ThreatType {
    pub const ALL: [ThreatType; 7] = [
        ThreatType::UnauthorizedAccess,
        ThreatType::SuspiciousActivity,
        ThreatType::SecurityBreach,
        ThreatType::PerimeterViolation,
        ThreatType::DroneMalfunction,
        ThreatType::CommunicationInterference,
        ThreatType::UnknownEntity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatType::UnauthorizedAccess => "Unauthorized Access",
            ThreatType::SuspiciousActivity => "Suspicious Activity",
            ThreatType::SecurityBreach => "Security Breach",
            ThreatType::PerimeterViolation => "Perimeter Violation",
            ThreatType::DroneMalfunction => "Drone Malfunction",
            ThreatType::CommunicationInterference => "Communication Interference",
            ThreatType::UnknownEntity => "Unknown Entity",
        }
    }
}

impl fmt::Display for ThreatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ThreatType {
    type Err = String;

    /// Case-insensitive; spaces, dashes and underscores are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        ThreatType::ALL
            .into_iter()
            .find(|t| normalize(t.as_str()) == wanted)
            .ok_or_else(|| format!("unknown threat type: {}", s))
    }
}

// ============================================================================
// SEVERITY
// ============================================================================

/// Ordered by visual urgency: `Critical > High > Medium > Low`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Most urgent first, the order the overlay lists them in
    pub const ALL: [Severity; 4] = [Severity::Critical, Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown severity: {}", s))
    }
}

// ============================================================================
// POSITION & IDENTITY
// ============================================================================

/// Ground-plane coordinate. Travels as `{x, y, z}` with `y` pinned to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "WirePosition", into = "WirePosition")]
pub struct GroundPosition {
    pub x: f32,
    pub z: f32,
}

impl GroundPosition {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for GroundPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.z)
    }
}

#[derive(Serialize, Deserialize)]
struct WirePosition {
    x: f32,
    #[serde(default)]
    y: f32,
    z: f32,
}

impl From<WirePosition> for GroundPosition {
    fn from(p: WirePosition) -> Self {
        Self { x: p.x, z: p.z }
    }
}

impl From<GroundPosition> for WirePosition {
    fn from(p: GroundPosition) -> Self {
        Self { x: p.x, y: 0.0, z: p.z }
    }
}

/// Identifier assigned by the remote authority
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreatId(String);

impl ThreatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ThreatId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// Unsaved record, not yet acknowledged by the remote authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatDraft {
    pub position: GroundPosition,
    #[serde(rename = "type")]
    pub threat_type: ThreatType,
    pub severity: Severity,
    pub sector: Sector,
    pub description: String,
    pub resolved: bool,
    #[serde(rename = "resolutionNotes", default)]
    pub resolution_notes: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "assignedDrone")]
    pub assigned_drone: u32,
}

/// A threat record as cached locally; `id` comes from the remote authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    #[serde(rename = "_id", alias = "id")]
    pub id: ThreatId,
    pub position: GroundPosition,
    #[serde(rename = "type")]
    pub threat_type: ThreatType,
    pub severity: Severity,
    pub sector: Sector,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resolved: bool,
    #[serde(rename = "resolutionNotes", default)]
    pub resolution_notes: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "resolutionTimestamp",
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub resolution_timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "assignedDrone")]
    pub assigned_drone: u32,
}

impl Threat {
    /// Admit a draft under the id the remote authority assigned to it
    pub fn from_draft(id: ThreatId, draft: ThreatDraft) -> Self {
        Self {
            id,
            position: draft.position,
            threat_type: draft.threat_type,
            severity: draft.severity,
            sector: draft.sector,
            description: draft.description,
            resolved: draft.resolved,
            resolution_notes: draft.resolution_notes,
            created_at: draft.created_at,
            resolution_timestamp: None,
            assigned_drone: draft.assigned_drone,
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}
