//! Subsystem health table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ShipSystem, SystemStatus};

pub const MAX_SYSTEM_HEALTH: u8 = 100;

/// Numeric health of one subsystem. Status is derived, never stored apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub health: u8,
}

impl SystemHealth {
    pub fn operational() -> Self {
        Self {
            health: MAX_SYSTEM_HEALTH,
        }
    }

    pub fn status(&self) -> SystemStatus {
        match self.health {
            0 => SystemStatus::Destroyed,
            h if h >= MAX_SYSTEM_HEALTH => SystemStatus::Operational,
            _ => SystemStatus::Damaged,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.status() == SystemStatus::Destroyed
    }

    pub fn damage(&mut self, amount: u8) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn repair(&mut self, amount: u8) {
        self.health = self.health.saturating_add(amount).min(MAX_SYSTEM_HEALTH);
    }
}

/// Health of every subsystem on a ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemsTable(BTreeMap<ShipSystem, SystemHealth>);

impl SystemsTable {
    pub fn all_operational() -> Self {
        Self(
            ShipSystem::ALL
                .into_iter()
                .map(|system| (system, SystemHealth::operational()))
                .collect(),
        )
    }

    pub fn get(&self, system: ShipSystem) -> SystemHealth {
        self.0
            .get(&system)
            .copied()
            .unwrap_or_else(SystemHealth::operational)
    }

    pub fn status(&self, system: ShipSystem) -> SystemStatus {
        self.get(system).status()
    }

    pub fn is_destroyed(&self, system: ShipSystem) -> bool {
        self.get(system).is_destroyed()
    }

    pub fn damage(&mut self, system: ShipSystem, amount: u8) -> SystemHealth {
        let entry = self.0.entry(system).or_insert_with(SystemHealth::operational);
        entry.damage(amount);
        *entry
    }

    pub fn repair(&mut self, system: ShipSystem, amount: u8) -> SystemHealth {
        let entry = self.0.entry(system).or_insert_with(SystemHealth::operational);
        entry.repair(amount);
        *entry
    }
}

impl Default for SystemsTable {
    fn default() -> Self {
        Self::all_operational()
    }
}
