//! Turret-mounted weapons and their per-turn firing state.

use serde::{Deserialize, Serialize};

use crate::RangeBand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeaponKind {
    PulseLaser,
    BeamLaser,
    MissileRack,
    Sandcaster,
}

impl WeaponKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            WeaponKind::PulseLaser => "Pulse laser",
            WeaponKind::BeamLaser => "Beam laser",
            WeaponKind::MissileRack => "Missile rack",
            WeaponKind::Sandcaster => "Sandcaster",
        }
    }

    /// Number of d6 rolled for damage.
    pub fn damage_dice(&self) -> u8 {
        match self {
            WeaponKind::PulseLaser => 2,
            WeaponKind::BeamLaser => 1,
            WeaponKind::MissileRack => 4,
            WeaponKind::Sandcaster => 0,
        }
    }

    /// Attack modifier from the weapon's accuracy.
    pub fn attack_modifier(&self) -> i32 {
        match self {
            WeaponKind::BeamLaser => 4,
            _ => 0,
        }
    }

    /// Furthest band this weapon can engage.
    pub fn max_range(&self) -> RangeBand {
        match self {
            WeaponKind::PulseLaser => RangeBand::Long,
            WeaponKind::BeamLaser => RangeBand::Medium,
            WeaponKind::MissileRack => RangeBand::VeryLong,
            WeaponKind::Sandcaster => RangeBand::Close,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    pub kind: WeaponKind,
    /// Set when the weapon resolves a fire action; cleared at turn start.
    #[serde(default)]
    pub fired_this_turn: bool,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            fired_this_turn: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turret {
    pub name: String,
    pub weapons: Vec<Weapon>,
}

impl Turret {
    pub fn new(name: impl Into<String>, kinds: &[WeaponKind]) -> Self {
        Self {
            name: name.into(),
            weapons: kinds.iter().copied().map(Weapon::new).collect(),
        }
    }
}
