//! Power routing use cases.

use std::collections::BTreeMap;
use std::sync::Arc;

use starbridge_domain::{DomainError, PowerPreset, Ship, ShipId, ShipSystem};

use super::load_ship;
use crate::infrastructure::ports::{RepoError, ShipRepo};

#[derive(Debug, thiserror::Error)]
pub enum PowerError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct PowerOps {
    ships: Arc<dyn ShipRepo>,
}

impl PowerOps {
    pub fn new(ships: Arc<dyn ShipRepo>) -> Self {
        Self { ships }
    }

    /// Apply the requested levels atomically: one bad entry rejects them all.
    pub async fn set_power(
        &self,
        ship_id: ShipId,
        changes: &BTreeMap<ShipSystem, u8>,
    ) -> Result<Ship, PowerError> {
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        ship.set_power(changes)?;
        self.ships.save(&ship).await?;
        tracing::debug!(ship_id = %ship.id, systems = changes.len(), "Power reallocated");
        Ok(ship)
    }

    pub async fn apply_preset(
        &self,
        ship_id: ShipId,
        preset: PowerPreset,
    ) -> Result<Ship, PowerError> {
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        ship.apply_power_preset(preset)?;
        self.ships.save(&ship).await?;
        tracing::debug!(ship_id = %ship.id, preset = ?preset, "Power preset applied");
        Ok(ship)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockShipRepo;
    use chrono::Utc;
    use starbridge_domain::{CampaignId, ShipTemplate};

    fn scout() -> Ship {
        Ship::from_template(CampaignId::new(), "Kestrel", ShipTemplate::Scout, Utc::now())
            .expect("ship")
    }

    #[tokio::test]
    async fn when_any_level_out_of_range_then_nothing_is_saved() {
        let ship = scout();
        let id = ship.id;
        let mut ships = MockShipRepo::new();
        ships.expect_get().returning(move |_| Ok(Some(ship.clone())));
        ships.expect_save().times(0);

        let changes = BTreeMap::from([(ShipSystem::Sensors, 40), (ShipSystem::Engines, 140)]);
        let err = PowerOps::new(Arc::new(ships))
            .set_power(id, &changes)
            .await
            .expect_err("out of range");
        assert!(matches!(err, PowerError::Rule(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn when_preset_with_destroyed_weapons_then_weapons_stay_dark() {
        let mut ship = scout();
        ship.systems.damage(ShipSystem::Weapons, 100);
        let id = ship.id;
        let mut ships = MockShipRepo::new();
        ships.expect_get().returning(move |_| Ok(Some(ship.clone())));
        ships
            .expect_save()
            .withf(|ship| ship.power.get(ShipSystem::Weapons) == 0)
            .times(1)
            .returning(|_| Ok(()));

        let ship = PowerOps::new(Arc::new(ships))
            .apply_preset(id, PowerPreset::Combat)
            .await
            .expect("preset");
        assert_eq!(ship.power.get(ShipSystem::Engines), 100);
    }
}
