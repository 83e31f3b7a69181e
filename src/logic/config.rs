//! Runtime configuration, read once at startup.

use crate::constants;
use crate::logic::remote::ApiConfig;
use crate::logic::scene::Viewport;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    pub session_file: PathBuf,
    pub demo_seed: Option<u64>,
    pub frame_interval_ms: u64,
    pub viewport: Viewport,
    /// Leave placement mode after each created threat
    pub exit_placement_after_create: bool,
    /// Run against the in-memory authority instead of HTTP
    pub offline: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                server_url: constants::DEFAULT_SERVER_URL.to_string(),
                timeout_seconds: None,
            },
            session_file: PathBuf::from(constants::SESSION_FILE_NAME),
            demo_seed: None,
            frame_interval_ms: constants::DEFAULT_FRAME_INTERVAL_MS,
            viewport: Viewport::new(constants::DEFAULT_VIEWPORT_WIDTH, constants::DEFAULT_VIEWPORT_HEIGHT),
            exit_placement_after_create: false,
            offline: false,
        }
    }
}

impl ConsoleConfig {
    /// Load `.env` if present, then read every `CONSOLE_*` variable
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }

        let (width, height) = constants::get_viewport();
        Self {
            api: ApiConfig::default(),
            session_file: constants::get_session_file(),
            demo_seed: constants::get_demo_seed(),
            frame_interval_ms: constants::get_frame_interval_ms(),
            viewport: Viewport::new(width, height),
            exit_placement_after_create: constants::exit_placement_after_create(),
            offline: constants::is_offline(),
        }
    }
}
