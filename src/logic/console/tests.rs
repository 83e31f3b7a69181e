//! Console Tests
//!
//! End-to-end flows over the in-memory authority.

use std::sync::Arc;

use tokio_test::{assert_err, assert_ok};

use super::*;
use crate::logic::demo_data::RandomDemoData;
use crate::logic::remote::memory::RemoteOp;
use crate::logic::remote::{ApiError, MemoryRemote};
use crate::logic::scene::{Terrain, Viewport};
use crate::logic::threat::fixtures::threat;
use crate::logic::threat::{GroundPosition, Severity};

fn console_with(remote: Arc<MemoryRemote>, options: ConsoleOptions) -> Console {
    let store = ThreatStore::new(remote);
    let terrain = Terrain::generate(&mut RandomDemoData::seeded(11));
    let surface = SceneSurface::new(Viewport::new(1280.0, 720.0), terrain);
    Console::new(store, surface, Box::new(RandomDemoData::seeded(5)), options)
}

fn pointer_at(console: &Console, x: f32, z: f32) -> PointerEvent {
    console.surface().screen_position(GroundPosition::new(x, z))
}

#[tokio::test]
async fn test_placement_click_creates_and_selects() {
    let remote = Arc::new(MemoryRemote::new().starting_at(42));
    let mut console = console_with(remote.clone(), ConsoleOptions::default());
    console.set_placement_mode(true);

    let pointer = pointer_at(&console, 3.0, -1.5);
    let outcome = assert_ok!(console.click(pointer).await);

    let ClickOutcome::Created(created) = outcome else {
        panic!("expected a created threat, got {:?}", outcome);
    };
    assert_eq!(created.id, ThreatId::new("42"));
    assert!((created.position.x - 3.0).abs() < 1e-2);
    assert!((created.position.z - -1.5).abs() < 1e-2);
    assert!(!created.resolved);

    assert_eq!(console.store().snapshot(), vec![created.clone()]);
    assert_eq!(remote.snapshot(), vec![created.clone()]);

    let editor = console.editor().unwrap();
    assert_eq!(editor.threat(), &created);
    assert_eq!(editor.state(), &crate::logic::editor::EditorState::Viewing);

    // Placement stays on by default
    assert!(console.surface().placement_mode());
}

#[tokio::test]
async fn test_clicks_outside_placement_mode_create_nothing() {
    let remote = Arc::new(MemoryRemote::new());
    let mut console = console_with(remote.clone(), ConsoleOptions::default());

    for (x, z) in [(0.0, 0.0), (3.0, -1.5), (-10.0, 12.0)] {
        let pointer = pointer_at(&console, x, z);
        assert_eq!(assert_ok!(console.click(pointer).await), ClickOutcome::Ignored);
    }
    assert_eq!(remote.call_count(RemoteOp::Create), 0);
    assert!(console.store().is_empty());
    assert!(console.editor().is_none());
}

#[tokio::test]
async fn test_failed_create_reports_and_adds_no_marker() {
    let remote = Arc::new(MemoryRemote::new());
    let mut console = console_with(remote.clone(), ConsoleOptions::default());
    console.set_placement_mode(true);
    remote.fail_next(RemoteOp::Create, ApiError::Network("connection refused".to_string()));

    let pointer = pointer_at(&console, 1.0, 2.0);
    let err = assert_err!(console.click(pointer).await);

    assert_eq!(err.kind(), "sync");
    assert!(console.store().is_empty());
    assert!(console.frame().markers.is_empty());
    assert!(console.editor().is_none());
    assert_eq!(console.notices().count(), 1);
}

#[tokio::test]
async fn test_exit_placement_after_create_option() {
    let remote = Arc::new(MemoryRemote::new());
    let options = ConsoleOptions { exit_placement_after_create: true };
    let mut console = console_with(remote, options);
    console.set_placement_mode(true);

    let pointer = pointer_at(&console, 5.0, 5.0);
    assert_ok!(console.click(pointer).await);
    assert!(!console.surface().placement_mode());
}

#[tokio::test]
async fn test_resolving_removes_threat_everywhere() {
    let remote = Arc::new(MemoryRemote::new().with_records(vec![threat("T1", Severity::Critical)]));
    let mut console = console_with(remote.clone(), ConsoleOptions::default());
    assert_eq!(assert_ok!(console.load().await), 1);

    assert_ok!(console.select(&ThreatId::new("T1")));
    let editor = console.editor_mut().unwrap();
    editor.begin_edit().unwrap();
    editor.mark_resolved(true).unwrap();
    editor.set_resolution_notes("handled by team").unwrap();

    let id = assert_ok!(console.confirm_resolution().await);
    assert_eq!(id, ThreatId::new("T1"));
    assert!(console.editor().is_none());
    assert!(console.store().is_empty());
    assert!(remote.snapshot().is_empty());
    assert_eq!(console.analysis().active, 0);
}

#[tokio::test]
async fn test_failed_save_keeps_editor_and_notifies() {
    let remote = Arc::new(MemoryRemote::new().with_records(vec![threat("T1", Severity::Low)]));
    let mut console = console_with(remote.clone(), ConsoleOptions::default());
    console.load().await.unwrap();

    console.select(&ThreatId::new("T1")).unwrap();
    let editor = console.editor_mut().unwrap();
    editor.begin_edit().unwrap();
    editor.set_severity(Severity::High).unwrap();

    remote.fail_next(RemoteOp::Update, ApiError::Server { status: 500, message: "boom".to_string() });
    assert_err!(console.save().await);

    let editor = console.editor().unwrap();
    assert!(editor.last_error().is_some());
    assert_eq!(console.store().get(&ThreatId::new("T1")).unwrap().severity, Severity::Low);
    assert_eq!(console.notices().last().unwrap().kind, "sync");

    assert_ok!(console.save().await);
    assert!(console.editor().is_none());
    assert_eq!(console.store().get(&ThreatId::new("T1")).unwrap().severity, Severity::High);
}

#[tokio::test]
async fn test_load_failure_keeps_store_empty() {
    let remote = Arc::new(MemoryRemote::new().with_records(vec![threat("T1", Severity::Low)]));
    remote.set_offline(true);
    let mut console = console_with(remote, ConsoleOptions::default());

    assert_err!(console.load().await);
    assert!(console.store().is_empty());
    assert_eq!(console.notices().count(), 1);
}

#[tokio::test]
async fn test_hover_feeds_render_source() {
    let mut marked = threat("T1", Severity::Medium);
    marked.position = GroundPosition::new(2.0, -3.0);
    let remote = Arc::new(MemoryRemote::new().with_records(vec![marked]));
    let mut console = console_with(remote, ConsoleOptions::default());
    console.load().await.unwrap();
    let render = console.render_source();

    let aspect = console.surface().viewport().aspect();
    let ndc = console.surface().camera().project(glam::Vec3::new(2.0, 2.0, -3.0), aspect);
    let pointer = console.surface().viewport().to_pixels(ndc);

    assert_eq!(console.hover(pointer), Some(ThreatId::new("T1")));
    let frame = render.frame();
    assert_eq!(frame.markers.len(), 1);
    assert_eq!(frame.markers[0].emissive_intensity, crate::logic::marker::EMISSIVE_HOVER);

    let away = pointer_at(&console, 20.0, 20.0);
    assert_eq!(console.hover(away), None);
    assert_eq!(render.frame().markers[0].emissive_intensity, crate::logic::marker::EMISSIVE_IDLE);
}

#[tokio::test]
async fn test_detection_unavailable_offline() {
    let mut console = console_with(Arc::new(MemoryRemote::new()), ConsoleOptions::default());

    let err = assert_err!(console.set_detection(true).await);
    assert_eq!(err.kind(), "stream");
    assert!(!console.detection_running());
    assert!(console.video_feed_url().is_none());
}

#[test]
fn test_notices_are_bounded() {
    let mut console = console_with(Arc::new(MemoryRemote::new()), ConsoleOptions::default());
    for i in 0..(MAX_NOTICES + 5) {
        console.report(ConsoleError::validation(format!("notice {}", i)));
    }
    assert_eq!(console.notices().count(), MAX_NOTICES);
    assert_eq!(console.notices().next().unwrap().message, "Validation failed: notice 5");
}

#[test]
fn test_roster_has_ten_drones() {
    let console = console_with(Arc::new(MemoryRemote::new()), ConsoleOptions::default());
    assert_eq!(console.drones().len(), 10);
}

#[tokio::test]
async fn test_reset_session_drops_operator_state() {
    let mut marked = threat("T1", Severity::High);
    marked.position = GroundPosition::new(2.0, -3.0);
    let remote = Arc::new(MemoryRemote::new().with_records(vec![marked]));
    let mut console = console_with(remote.clone(), ConsoleOptions::default());
    console.load().await.unwrap();
    let render = console.render_source();

    console.set_placement_mode(true);
    console.select(&ThreatId::new("T1")).unwrap();
    let aspect = console.surface().viewport().aspect();
    let ndc = console.surface().camera().project(glam::Vec3::new(2.0, 2.0, -3.0), aspect);
    let pointer = console.surface().viewport().to_pixels(ndc);
    assert!(console.hover(pointer).is_some());

    console.reset_session();

    assert!(console.store().is_empty());
    assert!(console.editor().is_none());
    assert_eq!(console.hovered(), None);
    assert!(!console.surface().placement_mode());
    let frame = render.frame();
    assert!(frame.markers.is_empty());
    assert_eq!(frame.blocks.len(), 900);
    assert_eq!(remote.snapshot().len(), 1);
}

#[test]
fn test_frames_carry_terrain() {
    let console = console_with(Arc::new(MemoryRemote::new()), ConsoleOptions::default());
    let frame = console.frame();
    assert_eq!(frame.blocks.len(), console.surface().terrain().len());
    assert_eq!(frame.blocks, console.surface().terrain().blocks());
}
