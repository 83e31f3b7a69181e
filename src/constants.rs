//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default remote authority, only edit this file.

use std::f32::consts::PI;

/// Default remote authority URL
///
/// This is the fallback URL when no environment variable is set.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Default render frame interval (milliseconds)
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Default viewport size in pixels
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Threat Console";

/// Directory under the platform data dir holding console state
pub const DATA_DIR_NAME: &str = "threat-console";

/// Session file name
pub const SESSION_FILE_NAME: &str = "session.json";

// ============================================
// Scene layout
// ============================================

/// Ground plane side length (world units), centered on the origin
pub const GROUND_EXTENT: f32 = 100.0;

/// Terrain grid spans -TERRAIN_HALF_CELLS..TERRAIN_HALF_CELLS on both axes
pub const TERRAIN_HALF_CELLS: i32 = 15;
pub const TERRAIN_SPACING: f32 = 1.5;
pub const BLOCK_FOOTPRINT: f32 = 1.0;

pub const CAMERA_START: [f32; 3] = [25.0, 25.0, 25.0];
pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_MIN_POLAR: f32 = PI / 4.0;
pub const CAMERA_MAX_POLAR: f32 = PI / 2.5;
pub const CAMERA_MIN_DISTANCE: f32 = 10.0;
pub const CAMERA_MAX_DISTANCE: f32 = 100.0;

/// Marker geometry (world units)
pub const MARKER_ELEVATION: f32 = 0.1;
pub const MARKER_BASE_RADIUS: f32 = 0.3;
pub const MARKER_BASE_HEIGHT: f32 = 0.2;
pub const MARKER_BEAM_RADIUS: f32 = 0.05;
pub const MARKER_BEAM_HEIGHT: f32 = 4.0;

/// Number of drones in the display roster
pub const DRONE_ROSTER_SIZE: u32 = 10;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get remote authority URL from environment or use default
pub fn get_server_url() -> String {
    std::env::var("CONSOLE_SERVER_URL")
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string())
}

/// Get HTTP timeout from environment. Unset means requests never time out.
pub fn get_http_timeout_secs() -> Option<u64> {
    std::env::var("CONSOLE_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
}

/// Get session file path from environment or the platform data directory
pub fn get_session_file() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("CONSOLE_SESSION_FILE") {
        return std::path::PathBuf::from(path);
    }

    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(DATA_DIR_NAME)
        .join(SESSION_FILE_NAME)
}

/// Get demo data seed from environment
pub fn get_demo_seed() -> Option<u64> {
    std::env::var("CONSOLE_DEMO_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
}

/// Get render frame interval from environment or use default
pub fn get_frame_interval_ms() -> u64 {
    std::env::var("CONSOLE_FRAME_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_FRAME_INTERVAL_MS)
}

/// Get viewport size (`WIDTHxHEIGHT`) from environment or use default
pub fn get_viewport() -> (f32, f32) {
    std::env::var("CONSOLE_VIEWPORT")
        .ok()
        .and_then(|s| parse_viewport(&s))
        .unwrap_or((DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT))
}

/// Check if placement mode should switch off after each created threat
pub fn exit_placement_after_create() -> bool {
    std::env::var("CONSOLE_EXIT_PLACEMENT_AFTER_CREATE")
        .map(|s| s.to_lowercase() == "true" || s == "1")
        .unwrap_or(false)
}

/// Check if the console should run against the in-memory authority
pub fn is_offline() -> bool {
    std::env::var("CONSOLE_OFFLINE")
        .map(|s| s.to_lowercase() == "true" || s == "1")
        .unwrap_or(false)
}

fn parse_viewport(raw: &str) -> Option<(f32, f32)> {
    let (w, h) = raw.trim().split_once(['x', 'X'])?;
    let width: f32 = w.trim().parse().ok()?;
    let height: f32 = h.trim().parse().ok()?;
    (width > 0.0 && height > 0.0).then_some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport() {
        assert_eq!(parse_viewport("800x600"), Some((800.0, 600.0)));
        assert_eq!(parse_viewport(" 1920 X 1080 "), Some((1920.0, 1080.0)));
        assert_eq!(parse_viewport("0x600"), None);
        assert_eq!(parse_viewport("wide"), None);
    }
}
