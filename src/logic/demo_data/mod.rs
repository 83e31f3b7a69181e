//! Demo Data Module
//!
//! Every randomized value the console shows comes through `DemoDataSource`:
//! attributes of newly placed threats, terrain block sizes, and the drone
//! roster. Production uses `RandomDemoData`; a fixed seed makes runs
//! reproducible and tests can plug in their own source.

pub mod drone;

pub use drone::{Drone, DroneStatus, Mission, SignalLevel};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::threat::catalog::SECTOR_COUNT;
use super::threat::{Sector, Severity, ThreatType};
use crate::constants::DRONE_ROSTER_SIZE;

/// Randomized attributes of a threat placed by clicking the ground
#[derive(Debug, Clone, PartialEq)]
pub struct DraftAttributes {
    pub threat_type: ThreatType,
    pub severity: Severity,
    pub sector: Sector,
    /// Sector named in the generated description (drawn independently)
    pub reported_sector: Sector,
    pub assigned_drone: u32,
}

/// Size and tint of one terrain block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSpec {
    pub height: f32,
    pub highlighted: bool,
}

pub trait DemoDataSource: Send {
    fn draft_attributes(&mut self) -> DraftAttributes;

    fn block(&mut self) -> BlockSpec;

    fn drone(&mut self, id: u32) -> Drone;
}

/// Build the per-session display roster (ids `1..=DRONE_ROSTER_SIZE`)
pub fn drone_roster(source: &mut dyn DemoDataSource) -> Vec<Drone> {
    (1..=DRONE_ROSTER_SIZE).map(|id| source.drone(id)).collect()
}

pub struct RandomDemoData<R: Rng + Send = StdRng> {
    rng: R,
}

impl RandomDemoData<StdRng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is configured, entropy otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => {
                log::info!("Demo data seeded with {}", seed);
                Self::seeded(seed)
            }
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng + Send> RandomDemoData<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    fn sector(&mut self) -> Sector {
        let index = self.rng.gen_range(0..SECTOR_COUNT);
        Sector::from_index(index).unwrap_or_else(|| Sector::all()[0])
    }

    fn pick<T: Copy>(&mut self, options: &[T]) -> T {
        *options.choose(&mut self.rng).unwrap_or(&options[0])
    }
}

impl<R: Rng + Send> DemoDataSource for RandomDemoData<R> {
    fn draft_attributes(&mut self) -> DraftAttributes {
        DraftAttributes {
            threat_type: self.pick(&ThreatType::ALL),
            severity: self.pick(&Severity::ALL),
            sector: self.sector(),
            reported_sector: self.sector(),
            assigned_drone: self.rng.gen_range(1..=DRONE_ROSTER_SIZE),
        }
    }

    fn block(&mut self) -> BlockSpec {
        BlockSpec {
            height: self.rng.gen::<f32>() * 4.0 + 0.5,
            highlighted: self.rng.gen::<f32>() > 0.8,
        }
    }

    fn drone(&mut self, id: u32) -> Drone {
        Drone {
            id,
            battery: self.rng.gen_range(70..100),
            signal: self.pick(&SignalLevel::ALL),
            status: if self.rng.gen::<f32>() > 0.2 {
                DroneStatus::Active
            } else {
                DroneStatus::Maintenance
            },
            mission: self.pick(&Mission::ALL),
            sector: self.sector(),
        }
    }
}
