//! Threat Module - Record Model
//!
//! Threat records, the fixed catalogs they draw from, and the wire
//! timestamp format shared with the remote authority.

pub mod catalog;
pub mod timestamp;
pub mod types;

pub use catalog::Sector;
pub use types::{GroundPosition, Severity, Threat, ThreatDraft, ThreatId, ThreatType};

#[cfg(test)]
pub mod fixtures;
