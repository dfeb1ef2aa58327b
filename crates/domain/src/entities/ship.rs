//! Ship entity - hull, tanks, power, subsystems and weapons of one vessel.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    jump_fuel_per_parsec, AlertStatus, CampaignId, DomainError, FuelState, PowerAllocation,
    PowerPreset, ShipId, ShipSystem, ShipTemplate, SystemsTable, Turret, Weapon, WeaponsMode,
};

/// Structural integrity, clamped to `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hull {
    pub current: u32,
    pub max: u32,
}

impl Hull {
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn repair(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    pub fn is_breached(&self) -> bool {
        self.current == 0
    }
}

/// Result of checking a jump against drive rating and tanks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpPlan {
    pub distance: u32,
    pub fuel_per_parsec: u32,
    pub fuel_required: u32,
    pub fuel_available: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    pub id: ShipId,
    pub campaign_id: CampaignId,
    pub name: String,
    pub template: ShipTemplate,
    pub tonnage: u32,
    /// Extra tonnage carried or towed; counts toward jump fuel.
    #[serde(default)]
    pub towed_tonnage: u32,
    pub jump_rating: u32,
    pub hull: Hull,
    pub fuel: FuelState,
    #[serde(default)]
    pub power: PowerAllocation,
    #[serde(default)]
    pub systems: SystemsTable,
    #[serde(default)]
    pub alert_status: AlertStatus,
    #[serde(default)]
    pub weapons_mode: WeaponsMode,
    pub turrets: Vec<Turret>,
    #[serde(default)]
    pub combat_round: u32,
    pub created_at: DateTime<Utc>,
}

impl Ship {
    pub fn from_template(
        campaign_id: CampaignId,
        name: impl Into<String>,
        template: ShipTemplate,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Ship name cannot be empty"));
        }
        let stats = template.stats();
        Ok(Self {
            id: ShipId::new(),
            campaign_id,
            name,
            template,
            tonnage: stats.tonnage,
            towed_tonnage: 0,
            jump_rating: stats.jump_rating,
            hull: Hull::full(stats.hull),
            fuel: FuelState::full(stats.fuel_capacity),
            power: PowerAllocation::default(),
            systems: SystemsTable::all_operational(),
            alert_status: AlertStatus::default(),
            weapons_mode: WeaponsMode::default(),
            turrets: stats.turrets,
            combat_round: 0,
            created_at: now,
        })
    }

    pub fn effective_tonnage(&self) -> u32 {
        self.tonnage.saturating_add(self.towed_tonnage)
    }

    /// Fail with a player-facing reason when `system` is destroyed.
    pub fn require_system(&self, system: ShipSystem, activity: &str) -> Result<(), DomainError> {
        if self.systems.is_destroyed(system) {
            return Err(DomainError::constraint(format!(
                "{system} destroyed - cannot {activity}"
            )));
        }
        Ok(())
    }

    pub fn plot_jump(&self, distance: u32) -> Result<JumpPlan, DomainError> {
        if distance == 0 || distance > self.jump_rating {
            return Err(DomainError::validation(format!(
                "Jump distance must be between 1 and {} parsecs",
                self.jump_rating
            )));
        }
        self.require_system(ShipSystem::JumpDrive, "jump")?;
        let fuel_per_parsec = jump_fuel_per_parsec(self.effective_tonnage());
        let plan = JumpPlan {
            distance,
            fuel_per_parsec,
            fuel_required: fuel_per_parsec.saturating_mul(distance),
            fuel_available: self.fuel.refined,
        };
        if plan.fuel_required > plan.fuel_available {
            return Err(DomainError::constraint(format!(
                "Insufficient fuel for jump-{distance}: need {} tons of refined fuel, have {}",
                plan.fuel_required, plan.fuel_available
            )));
        }
        Ok(plan)
    }

    /// Burn the jump fuel and drop out of any engagement.
    pub fn execute_jump(&mut self, distance: u32) -> Result<JumpPlan, DomainError> {
        let plan = self.plot_jump(distance)?;
        self.fuel.consume_refined(plan.fuel_required)?;
        self.reset_combat();
        Ok(plan)
    }

    /// Apply per-system changes. Nothing is applied if any entry is invalid.
    pub fn set_power(&mut self, changes: &BTreeMap<ShipSystem, u8>) -> Result<(), DomainError> {
        if let Some(system) = changes
            .iter()
            .find(|(system, level)| **level > 0 && self.systems.is_destroyed(**system))
            .map(|(system, _)| *system)
        {
            return Err(DomainError::constraint(format!(
                "{system} is destroyed and cannot receive power"
            )));
        }
        self.power = self.power.with_changes(changes)?;
        Ok(())
    }

    /// Replace the whole allocation with a preset. Destroyed systems stay at 0.
    pub fn apply_power_preset(&mut self, preset: PowerPreset) -> Result<(), DomainError> {
        let changes: BTreeMap<ShipSystem, u8> = preset
            .allocation()
            .iter()
            .map(|(system, level)| {
                let level = if self.systems.is_destroyed(system) { 0 } else { level };
                (system, level)
            })
            .collect();
        self.power = self.power.with_changes(&changes)?;
        Ok(())
    }

    pub fn weapon(&self, turret: usize, weapon: usize) -> Result<&Weapon, DomainError> {
        self.turrets
            .get(turret)
            .ok_or_else(|| DomainError::validation(format!("No turret {turret} on this ship")))?
            .weapons
            .get(weapon)
            .ok_or_else(|| {
                DomainError::validation(format!("No weapon {weapon} in turret {turret}"))
            })
    }

    pub fn mark_weapon_fired(&mut self, turret: usize, weapon: usize) -> Result<(), DomainError> {
        let slot = self
            .turrets
            .get_mut(turret)
            .and_then(|t| t.weapons.get_mut(weapon))
            .ok_or_else(|| DomainError::validation("Unknown weapon selection"))?;
        slot.fired_this_turn = true;
        Ok(())
    }

    fn clear_fired(&mut self) {
        for weapon in self.turrets.iter_mut().flat_map(|t| t.weapons.iter_mut()) {
            weapon.fired_this_turn = false;
        }
    }

    /// Advance to the next combat round and re-arm every weapon.
    pub fn start_turn(&mut self) -> u32 {
        self.clear_fired();
        self.combat_round = self.combat_round.saturating_add(1);
        self.combat_round
    }

    pub fn reset_combat(&mut self) {
        self.clear_fired();
        self.combat_round = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SystemStatus;

    fn scout() -> Ship {
        Ship::from_template(CampaignId::new(), "Beowulf", ShipTemplate::Scout, Utc::now())
            .expect("valid ship")
    }

    #[test]
    fn template_stats_are_stamped() {
        let ship = scout();
        assert_eq!(ship.tonnage, 100);
        assert_eq!(ship.fuel.refined, ship.fuel.max);
        assert_eq!(ship.hull.current, ship.hull.max);
    }

    #[test]
    fn jump_fuel_uses_effective_tonnage() {
        let mut ship = scout();
        ship.towed_tonnage = 15;
        let plan = ship.plot_jump(2).expect("in range");
        assert_eq!(plan.fuel_per_parsec, 12);
        assert_eq!(plan.fuel_required, 24);
    }

    #[test]
    fn jump_beyond_rating_is_rejected() {
        let ship = scout();
        assert!(ship.plot_jump(3).is_err());
        assert!(ship.plot_jump(0).is_err());
    }

    #[test]
    fn destroyed_drive_blocks_jump() {
        let mut ship = scout();
        ship.systems.damage(ShipSystem::JumpDrive, 100);
        let err = ship.plot_jump(1).expect_err("drive destroyed");
        assert!(err.reason().contains("Jump drive destroyed"));
    }

    #[test]
    fn execute_jump_burns_fuel_and_resets_combat() {
        let mut ship = scout();
        ship.start_turn();
        ship.mark_weapon_fired(0, 0).expect("weapon exists");
        ship.execute_jump(1).expect("jump ok");
        assert_eq!(ship.fuel.refined, 30);
        assert_eq!(ship.combat_round, 0);
        assert!(!ship.turrets[0].weapons[0].fired_this_turn);
    }

    #[test]
    fn power_to_destroyed_system_is_rejected_atomically() {
        let mut ship = scout();
        ship.systems.damage(ShipSystem::Weapons, 100);
        assert_eq!(ship.systems.status(ShipSystem::Weapons), SystemStatus::Destroyed);
        let before = ship.power.clone();
        let changes = BTreeMap::from([(ShipSystem::Sensors, 40), (ShipSystem::Weapons, 10)]);
        assert!(ship.set_power(&changes).is_err());
        assert_eq!(ship.power, before);
    }

    #[test]
    fn preset_skips_destroyed_systems() {
        let mut ship = scout();
        ship.systems.damage(ShipSystem::Weapons, 100);
        ship.apply_power_preset(PowerPreset::Combat).expect("preset applies");
        assert_eq!(ship.power.get(ShipSystem::Weapons), 0);
        assert_eq!(
            ship.power.get(ShipSystem::Sensors),
            PowerPreset::Combat.allocation().get(ShipSystem::Sensors)
        );
    }

    #[test]
    fn hull_is_clamped() {
        let mut hull = Hull::full(40);
        hull.damage(100);
        assert!(hull.is_breached());
        hull.repair(500);
        assert_eq!(hull.current, 40);
    }
}
