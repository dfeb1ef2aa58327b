//! Per-subsystem power routing and named presets.
//!
//! Allocations are independent percentages of each subsystem's draw. They are
//! not required to sum to 100.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DomainError, ShipSystem};

pub const MAX_ALLOCATION: u8 = 100;

/// Named allocation vectors applied across every subsystem at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerPreset {
    Standard,
    Combat,
    Jump,
    Silent,
}

impl PowerPreset {
    /// The full allocation this preset installs.
    pub fn allocation(&self) -> PowerAllocation {
        use ShipSystem::*;
        let levels: [(ShipSystem, u8); 7] = match self {
            PowerPreset::Standard => [
                (Sensors, 75),
                (Weapons, 50),
                (Engines, 75),
                (JumpDrive, 25),
                (LifeSupport, 100),
                (FuelProcessor, 50),
                (Computer, 75),
            ],
            PowerPreset::Combat => [
                (Sensors, 100),
                (Weapons, 100),
                (Engines, 100),
                (JumpDrive, 0),
                (LifeSupport, 75),
                (FuelProcessor, 0),
                (Computer, 100),
            ],
            PowerPreset::Jump => [
                (Sensors, 50),
                (Weapons, 0),
                (Engines, 25),
                (JumpDrive, 100),
                (LifeSupport, 100),
                (FuelProcessor, 0),
                (Computer, 100),
            ],
            PowerPreset::Silent => [
                (Sensors, 25),
                (Weapons, 0),
                (Engines, 10),
                (JumpDrive, 0),
                (LifeSupport, 50),
                (FuelProcessor, 0),
                (Computer, 25),
            ],
        };
        PowerAllocation(levels.into_iter().collect())
    }
}

/// Power level per subsystem, each in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PowerAllocation(BTreeMap<ShipSystem, u8>);

impl PowerAllocation {
    pub fn get(&self, system: ShipSystem) -> u8 {
        self.0.get(&system).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShipSystem, u8)> + '_ {
        self.0.iter().map(|(system, level)| (*system, *level))
    }

    /// Build the allocation that results from applying `changes` on top of
    /// this one. Validates every entry before anything is applied.
    pub fn with_changes(
        &self,
        changes: &BTreeMap<ShipSystem, u8>,
    ) -> Result<PowerAllocation, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::validation("No power changes requested"));
        }
        if let Some((system, level)) = changes.iter().find(|(_, level)| **level > MAX_ALLOCATION) {
            return Err(DomainError::validation(format!(
                "Power allocation for {system} must be between 0 and {MAX_ALLOCATION} (got {level})"
            )));
        }
        let mut next = self.0.clone();
        next.extend(changes.iter().map(|(system, level)| (*system, *level)));
        Ok(PowerAllocation(next))
    }
}

impl Default for PowerAllocation {
    fn default() -> Self {
        PowerPreset::Standard.allocation()
    }
}
