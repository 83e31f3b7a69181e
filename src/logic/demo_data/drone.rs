//! Drone roster entries. Display-only, regenerated every session and never
//! persisted; threats reference drones by id without any integrity check.

use std::fmt;

use serde::Serialize;

use crate::logic::threat::Sector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalLevel {
    Strong,
    Good,
    Moderate,
}

impl SignalLevel {
    pub const ALL: [SignalLevel; 3] = [SignalLevel::Strong, SignalLevel::Good, SignalLevel::Moderate];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DroneStatus {
    Active,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mission {
    Patrol,
    Surveillance,
    Investigation,
}

impl Mission {
    pub const ALL: [Mission; 3] = [Mission::Patrol, Mission::Surveillance, Mission::Investigation];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drone {
    pub id: u32,
    /// Percent
    pub battery: u8,
    pub signal: SignalLevel,
    pub status: DroneStatus,
    pub mission: Mission,
    pub sector: Sector,
}

impl fmt::Display for Drone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            DroneStatus::Active => "active",
            DroneStatus::Maintenance => "maintenance",
        };
        write!(
            f,
            "DRONE-{:02} {:>3}% {:?} {} {:?} @ {}",
            self.id, self.battery, self.signal, status, self.mission, self.sector
        )
    }
}
