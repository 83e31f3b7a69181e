//! Logic Module - Threat Console Business Logic
//!
//! ## Components
//! - `threat/` - Threat records, catalogs and wire timestamps
//! - `remote/` - Remote authority client and the `ThreatRemote` seam
//! - `store/` - Write-through Threat Store
//! - `scene/` - Camera, ray casting, terrain and the Scene Surface
//! - `marker` - Per-frame marker visuals
//! - `editor/` - Threat Detail Editor state machine
//! - `creation/` - Threat-Creation Flow
//! - `demo_data/` - Randomized data behind `DemoDataSource`
//! - `session/` - Operator session context
//! - `console/` - Dashboard state tying the above together

pub mod config;
pub mod console;
pub mod creation;
pub mod demo_data;
pub mod editor;
pub mod error;
pub mod marker;
pub mod remote;
pub mod scene;
pub mod session;
pub mod store;
pub mod threat;

pub use config::ConsoleConfig;
pub use error::{ConsoleError, ConsoleResult};
