//! Threat-Creation Flow
//!
//! Turns a ground point picked in placement mode into a draft with
//! generated attributes and hands it to the Threat Store. Nothing appears
//! locally until the remote authority has assigned an id.

use chrono::Utc;

use super::demo_data::DemoDataSource;
use super::error::ConsoleResult;
use super::scene::WorldPoint;
use super::store::ThreatStore;
use super::threat::{Sector, Threat, ThreatDraft};

pub fn incident_description(reported_sector: Sector) -> String {
    format!(
        "Potential security incident detected requiring immediate attention in sector {}",
        reported_sector
    )
}

/// Synthesize an unresolved draft at `point`, stamped with the current time
pub fn synthesize_draft(point: WorldPoint, source: &mut dyn DemoDataSource) -> ThreatDraft {
    let attrs = source.draft_attributes();
    ThreatDraft {
        position: point.ground(),
        threat_type: attrs.threat_type,
        severity: attrs.severity,
        sector: attrs.sector,
        description: incident_description(attrs.reported_sector),
        resolved: false,
        resolution_notes: String::new(),
        created_at: Utc::now(),
        assigned_drone: attrs.assigned_drone,
    }
}

/// Create one threat at `point`. The draft is built before the remote call,
/// so the generator is never borrowed across an await.
pub async fn create_at(
    store: &ThreatStore,
    point: WorldPoint,
    source: &mut dyn DemoDataSource,
) -> ConsoleResult<Threat> {
    let draft = synthesize_draft(point, source);
    log::debug!(
        "Placing {} {} threat at {}",
        draft.severity,
        draft.threat_type,
        draft.position
    );
    store.create(draft).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::logic::demo_data::{BlockSpec, DraftAttributes, Drone, RandomDemoData};
    use crate::logic::remote::memory::RemoteOp;
    use crate::logic::remote::{ApiError, MemoryRemote};
    use crate::logic::threat::{GroundPosition, Severity, ThreatId, ThreatType};

    /// Always produces the same attributes
    struct FixedSource;

    impl DemoDataSource for FixedSource {
        fn draft_attributes(&mut self) -> DraftAttributes {
            DraftAttributes {
                threat_type: ThreatType::PerimeterViolation,
                severity: Severity::Critical,
                sector: "B-7".parse().unwrap(),
                reported_sector: "E-2".parse().unwrap(),
                assigned_drone: 4,
            }
        }

        fn block(&mut self) -> BlockSpec {
            BlockSpec { height: 1.0, highlighted: false }
        }

        fn drone(&mut self, id: u32) -> Drone {
            RandomDemoData::seeded(id as u64).drone(id)
        }
    }

    fn point(x: f32, z: f32) -> WorldPoint {
        WorldPoint { x, y: 0.0, z }
    }

    #[test]
    fn test_draft_uses_generated_attributes() {
        let draft = synthesize_draft(point(3.0, -1.5), &mut FixedSource);

        assert_eq!(draft.position, GroundPosition::new(3.0, -1.5));
        assert_eq!(draft.threat_type, ThreatType::PerimeterViolation);
        assert_eq!(draft.severity, Severity::Critical);
        assert_eq!(draft.sector.to_string(), "B-7");
        assert_eq!(
            draft.description,
            "Potential security incident detected requiring immediate attention in sector E-2"
        );
        assert!(!draft.resolved);
        assert!(draft.resolution_notes.is_empty());
        assert_eq!(draft.assigned_drone, 4);
    }

    #[tokio::test]
    async fn test_create_at_returns_server_id() {
        let remote = Arc::new(MemoryRemote::new().starting_at(42));
        let store = ThreatStore::new(remote.clone());

        let created = assert_ok!(create_at(&store, point(3.0, -1.5), &mut FixedSource).await);
        assert_eq!(created.id, ThreatId::new("42"));
        assert_eq!(created.position, GroundPosition::new(3.0, -1.5));
        assert_eq!(store.snapshot(), vec![created]);
    }

    #[tokio::test]
    async fn test_failed_create_adds_nothing() {
        let remote = Arc::new(MemoryRemote::new());
        let store = ThreatStore::new(remote.clone());
        remote.fail_next(RemoteOp::Create, ApiError::Network("timed out".to_string()));

        assert_err!(create_at(&store, point(1.0, 1.0), &mut FixedSource).await);
        assert!(store.is_empty());
        assert!(remote.snapshot().is_empty());
    }
}
