//! Ship subsystem vocabulary shared by power, repairs and combat.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A subsystem that draws power and can be damaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShipSystem {
    Sensors,
    Weapons,
    Engines,
    JumpDrive,
    LifeSupport,
    FuelProcessor,
    Computer,
}

impl ShipSystem {
    pub const ALL: [ShipSystem; 7] = [
        ShipSystem::Sensors,
        ShipSystem::Weapons,
        ShipSystem::Engines,
        ShipSystem::JumpDrive,
        ShipSystem::LifeSupport,
        ShipSystem::FuelProcessor,
        ShipSystem::Computer,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ShipSystem::Sensors => "Sensors",
            ShipSystem::Weapons => "Weapons",
            ShipSystem::Engines => "Engines",
            ShipSystem::JumpDrive => "Jump drive",
            ShipSystem::LifeSupport => "Life support",
            ShipSystem::FuelProcessor => "Fuel processor",
            ShipSystem::Computer => "Computer",
        }
    }
}

impl fmt::Display for ShipSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Condition of a subsystem, derived from its numeric health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemStatus {
    Operational,
    Damaged,
    Destroyed,
}

/// Ship-wide readiness condition set by the captain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertStatus {
    #[default]
    Green,
    Yellow,
    Red,
}

/// Rules of engagement for the ship's weapons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeaponsMode {
    Free,
    #[default]
    Hold,
    Defensive,
}
