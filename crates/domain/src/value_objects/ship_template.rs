//! Starting hull configurations for new ships.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DomainError, Turret, WeaponKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShipTemplate {
    Scout,
    FarTrader,
    PatrolCorvette,
}

/// Numbers stamped onto a ship when it is built from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateStats {
    pub tonnage: u32,
    pub jump_rating: u32,
    pub hull: u32,
    pub fuel_capacity: u32,
    pub turrets: Vec<Turret>,
}

impl ShipTemplate {
    pub const ALL: [ShipTemplate; 3] = [
        ShipTemplate::Scout,
        ShipTemplate::FarTrader,
        ShipTemplate::PatrolCorvette,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipTemplate::Scout => "scout",
            ShipTemplate::FarTrader => "farTrader",
            ShipTemplate::PatrolCorvette => "patrolCorvette",
        }
    }

    pub fn stats(&self) -> TemplateStats {
        match self {
            ShipTemplate::Scout => TemplateStats {
                tonnage: 100,
                jump_rating: 2,
                hull: 40,
                fuel_capacity: 40,
                turrets: vec![Turret::new("Dorsal turret", &[WeaponKind::PulseLaser])],
            },
            ShipTemplate::FarTrader => TemplateStats {
                tonnage: 200,
                jump_rating: 2,
                hull: 80,
                fuel_capacity: 61,
                turrets: vec![
                    Turret::new(
                        "Dorsal turret",
                        &[WeaponKind::PulseLaser, WeaponKind::Sandcaster],
                    ),
                    Turret::new("Ventral turret", &[WeaponKind::BeamLaser]),
                ],
            },
            ShipTemplate::PatrolCorvette => TemplateStats {
                tonnage: 400,
                jump_rating: 3,
                hull: 160,
                fuel_capacity: 160,
                turrets: vec![
                    Turret::new(
                        "Forward turret",
                        &[WeaponKind::BeamLaser, WeaponKind::BeamLaser],
                    ),
                    Turret::new(
                        "Aft turret",
                        &[WeaponKind::PulseLaser, WeaponKind::PulseLaser],
                    ),
                    Turret::new("Missile bay", &[WeaponKind::MissileRack]),
                ],
            },
        }
    }
}

impl fmt::Display for ShipTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipTemplate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShipTemplate::ALL
            .into_iter()
            .find(|template| template.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::parse(format!("Unknown ship template: {s}")))
    }
}
