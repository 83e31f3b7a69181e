//! Test fixtures shared across logic tests

use chrono::{TimeZone, Utc};

use super::{GroundPosition, Severity, Threat, ThreatDraft, ThreatId, ThreatType};

pub fn draft_at(x: f32, z: f32) -> ThreatDraft {
    ThreatDraft {
        position: GroundPosition::new(x, z),
        threat_type: ThreatType::SuspiciousActivity,
        severity: Severity::Medium,
        sector: "C-3".parse().unwrap(),
        description: "Potential security incident detected requiring immediate attention in sector C-3".to_string(),
        resolved: false,
        resolution_notes: String::new(),
        created_at: Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
        assigned_drone: 2,
    }
}

pub fn threat(id: &str, severity: Severity) -> Threat {
    let mut draft = draft_at(1.0, 1.0);
    draft.severity = severity;
    Threat::from_draft(ThreatId::new(id), draft)
}
