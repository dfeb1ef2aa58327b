//! Navigation use cases: jump plotting, jumping and in-system maneuvering.

use std::sync::Arc;

use starbridge_domain::{
    Campaign, Contact, ContactId, DomainError, JumpPlan, Location, LogEntryKind,
    ManeuverDirection, Ship, ShipId, ShipSystem,
};

use super::{load_campaign, load_contact, load_ship, ShipLogWriter};
use crate::infrastructure::ports::{
    CampaignRepo, Change, ChangeSet, ContactRepo, RepoError, ShipRepo, UnitOfWork,
};

/// In-game hours a jump takes, whatever the distance.
pub const JUMP_DURATION_HOURS: u64 = 168;

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct JumpOutcome {
    pub ship: Ship,
    pub plan: JumpPlan,
    pub campaign: Campaign,
}

pub struct NavigationOps {
    ships: Arc<dyn ShipRepo>,
    campaigns: Arc<dyn CampaignRepo>,
    contacts: Arc<dyn ContactRepo>,
    unit_of_work: Arc<dyn UnitOfWork>,
    log: Arc<ShipLogWriter>,
}

impl NavigationOps {
    pub fn new(
        ships: Arc<dyn ShipRepo>,
        campaigns: Arc<dyn CampaignRepo>,
        contacts: Arc<dyn ContactRepo>,
        unit_of_work: Arc<dyn UnitOfWork>,
        log: Arc<ShipLogWriter>,
    ) -> Self {
        Self {
            ships,
            campaigns,
            contacts,
            unit_of_work,
            log,
        }
    }

    pub async fn plot(&self, ship_id: ShipId, distance: u32) -> Result<JumpPlan, NavigationError> {
        let ship = load_ship(self.ships.as_ref(), ship_id).await?;
        Ok(ship.plot_jump(distance)?)
    }

    /// Jump to `{sector, hex}`: burns fuel, moves the campaign and advances
    /// its clock by a week.
    pub async fn jump(
        &self,
        ship_id: ShipId,
        distance: u32,
        sector: &str,
        hex: &str,
        actor: &str,
    ) -> Result<JumpOutcome, NavigationError> {
        let destination = Location::new(sector, hex)?;
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        let mut campaign = load_campaign(self.campaigns.as_ref(), ship.campaign_id).await?;

        let plan = ship.execute_jump(distance)?;
        campaign.set_location(destination.clone());
        campaign.current_time.advance_hours(JUMP_DURATION_HOURS);

        self.unit_of_work
            .commit(
                ChangeSet::new()
                    .with(Change::Ship(ship.clone()))
                    .with(Change::Campaign(campaign.clone())),
            )
            .await?;

        self.log
            .record(
                &ship,
                LogEntryKind::Navigation,
                actor,
                format!(
                    "Jump-{distance} to {} {} using {} tons of fuel",
                    destination.sector, destination.hex, plan.fuel_required
                ),
            )
            .await;

        tracing::info!(
            ship_id = %ship.id,
            campaign_id = %campaign.id,
            distance,
            sector = %destination.sector,
            hex = %destination.hex,
            "Ship jumped"
        );
        Ok(JumpOutcome {
            ship,
            plan,
            campaign,
        })
    }

    /// Close or open range on a contact. Needs working engines.
    pub async fn maneuver(
        &self,
        ship_id: ShipId,
        contact_id: ContactId,
        direction: ManeuverDirection,
    ) -> Result<Contact, NavigationError> {
        let ship = load_ship(self.ships.as_ref(), ship_id).await?;
        ship.require_system(ShipSystem::Engines, "maneuver")?;
        let mut contact =
            load_contact(self.contacts.as_ref(), ship.campaign_id, contact_id).await?;

        if contact.maneuver(direction) {
            self.contacts.save(&contact).await?;
        }
        Ok(contact)
    }
}
