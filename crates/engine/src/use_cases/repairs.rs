//! Damage control: field repairs plus GM-applied system and hull damage.

use std::collections::BTreeMap;
use std::sync::Arc;

use starbridge_domain::{
    skill_check, CheckResult, DomainError, LogEntryKind, Ship, ShipId, ShipSystem, SystemStatus,
    STANDARD_TARGET,
};

use super::{load_ship, ShipLogWriter};
use crate::infrastructure::clock::roll_d6;
use crate::infrastructure::ports::{RandomPort, RepoError, ShipRepo};

/// Skill DM for a field repair.
pub const REPAIR_MODIFIER: i32 = 1;
/// Health restored by a successful repair.
pub const REPAIR_AMOUNT: u8 = 25;

#[derive(Debug, thiserror::Error)]
pub enum RepairsError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct RepairAttempt {
    pub ship: Ship,
    pub system: ShipSystem,
    pub check: CheckResult,
}

pub struct RepairsOps {
    ships: Arc<dyn ShipRepo>,
    random: Arc<dyn RandomPort>,
    log: Arc<ShipLogWriter>,
}

impl RepairsOps {
    pub fn new(
        ships: Arc<dyn ShipRepo>,
        random: Arc<dyn RandomPort>,
        log: Arc<ShipLogWriter>,
    ) -> Self {
        Self { ships, random, log }
    }

    /// Roll 2D+1 against 8. A success restores [`REPAIR_AMOUNT`] health.
    pub async fn repair(
        &self,
        ship_id: ShipId,
        system: ShipSystem,
        actor: &str,
    ) -> Result<RepairAttempt, RepairsError> {
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        match ship.systems.status(system) {
            SystemStatus::Destroyed => {
                return Err(DomainError::constraint(format!(
                    "{system} is destroyed and cannot be repaired in the field"
                ))
                .into())
            }
            SystemStatus::Operational => {
                return Err(DomainError::validation(format!(
                    "{system} is fully operational"
                ))
                .into())
            }
            SystemStatus::Damaged => {}
        }

        let dice = [roll_d6(self.random.as_ref()), roll_d6(self.random.as_ref())];
        let check = skill_check(dice, REPAIR_MODIFIER, STANDARD_TARGET);
        if check.success {
            let health = ship.systems.repair(system, REPAIR_AMOUNT);
            self.ships.save(&ship).await?;
            self.log
                .record(
                    &ship,
                    LogEntryKind::Repair,
                    actor,
                    format!("Repaired {system} to {}%", health.health),
                )
                .await;
        } else {
            self.log
                .record(
                    &ship,
                    LogEntryKind::Repair,
                    actor,
                    format!("Repair attempt on {system} failed"),
                )
                .await;
        }
        Ok(RepairAttempt {
            ship,
            system,
            check,
        })
    }

    /// Knock health off a subsystem. A destroyed system loses its power.
    pub async fn damage_system(
        &self,
        ship_id: ShipId,
        system: ShipSystem,
        amount: u8,
    ) -> Result<Ship, RepairsError> {
        if amount == 0 {
            return Err(DomainError::validation("Damage amount must be positive").into());
        }
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        let health = ship.systems.damage(system, amount);
        if health.is_destroyed() {
            ship.set_power(&BTreeMap::from([(system, 0)]))?;
        }
        self.ships.save(&ship).await?;
        self.log
            .record(
                &ship,
                LogEntryKind::Damage,
                "GM",
                format!("{system} took {amount} damage ({}%)", health.health),
            )
            .await;
        Ok(ship)
    }

    pub async fn hull_damage(&self, ship_id: ShipId, amount: u32) -> Result<Ship, RepairsError> {
        if amount == 0 {
            return Err(DomainError::validation("Damage amount must be positive").into());
        }
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        ship.hull.damage(amount);
        self.ships.save(&ship).await?;
        self.log
            .record(
                &ship,
                LogEntryKind::Damage,
                "GM",
                format!(
                    "Hull took {amount} damage ({}/{})",
                    ship.hull.current, ship.hull.max
                ),
            )
            .await;
        if ship.hull.is_breached() {
            tracing::warn!(ship_id = %ship.id, "Hull breached");
        }
        Ok(ship)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::{MockCampaignRepo, MockShipLogRepo, MockShipRepo};
    use chrono::Utc;
    use starbridge_domain::{Campaign, ShipTemplate};

    fn setup(engines_damage: u8) -> (Campaign, Ship) {
        let campaign = Campaign::new("Outbound", "Sam", Utc::now()).expect("campaign");
        let mut ship = Ship::from_template(campaign.id, "Kestrel", ShipTemplate::Scout, Utc::now())
            .expect("ship");
        ship.systems.damage(ShipSystem::Engines, engines_damage);
        (campaign, ship)
    }

    fn ops(campaign: &Campaign, ships: MockShipRepo, roll: i32) -> RepairsOps {
        let campaign = campaign.clone();
        let mut campaigns = MockCampaignRepo::new();
        campaigns
            .expect_get()
            .returning(move |_| Ok(Some(campaign.clone())));
        let mut log = MockShipLogRepo::new();
        log.expect_append().returning(|_| Ok(()));
        RepairsOps::new(
            Arc::new(ships),
            Arc::new(FixedRandom(roll)),
            Arc::new(ShipLogWriter::new(
                Arc::new(log),
                Arc::new(campaigns),
                Arc::new(FixedClock(Utc::now())),
            )),
        )
    }

    fn ships_returning(ship: &Ship) -> MockShipRepo {
        let ship = ship.clone();
        let mut ships = MockShipRepo::new();
        ships.expect_get().returning(move |_| Ok(Some(ship.clone())));
        ships
    }

    #[tokio::test]
    async fn when_repair_succeeds_then_health_restored() {
        let (campaign, ship) = setup(60);
        let mut ships = ships_returning(&ship);
        ships
            .expect_save()
            .withf(|ship| ship.systems.get(ShipSystem::Engines).health == 65)
            .times(1)
            .returning(|_| Ok(()));

        let attempt = ops(&campaign, ships, 4)
            .repair(ship.id, ShipSystem::Engines, "Engineer")
            .await
            .expect("repair");
        assert!(attempt.check.success);
        assert_eq!(attempt.check.total, 9);
    }

    #[tokio::test]
    async fn when_repair_roll_fails_then_nothing_saved() {
        let (campaign, ship) = setup(60);
        let mut ships = ships_returning(&ship);
        ships.expect_save().times(0);

        let attempt = ops(&campaign, ships, 3)
            .repair(ship.id, ShipSystem::Engines, "Engineer")
            .await
            .expect("attempt resolves");
        assert!(!attempt.check.success);
    }

    #[tokio::test]
    async fn when_system_destroyed_then_field_repair_refused() {
        let (campaign, ship) = setup(100);
        let mut ships = ships_returning(&ship);
        ships.expect_save().times(0);

        let err = ops(&campaign, ships, 6)
            .repair(ship.id, ShipSystem::Engines, "Engineer")
            .await
            .expect_err("destroyed");
        assert!(matches!(err, RepairsError::Rule(DomainError::Constraint(_))));
    }

    #[tokio::test]
    async fn when_damage_destroys_system_then_its_power_is_cut() {
        let (campaign, ship) = setup(0);
        let mut ships = ships_returning(&ship);
        ships
            .expect_save()
            .withf(|ship| {
                ship.systems.is_destroyed(ShipSystem::Sensors)
                    && ship.power.get(ShipSystem::Sensors) == 0
            })
            .times(1)
            .returning(|_| Ok(()));

        ops(&campaign, ships, 1)
            .damage_system(ship.id, ShipSystem::Sensors, 200)
            .await
            .expect("damage");
    }
}
