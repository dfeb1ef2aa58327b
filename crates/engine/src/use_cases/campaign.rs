//! Campaign use cases: creation, roster, calendar and location.

use std::sync::Arc;

use starbridge_domain::game_time::MINUTES_PER_HOUR;
use starbridge_domain::{
    Campaign, CampaignId, DomainError, Location, PlayerSlot, Ship, ShipId, ShipTemplate,
};

use super::{load_campaign, load_ship};
use crate::infrastructure::ports::{
    CampaignRepo, Change, ChangeSet, ClockPort, RepoError, ShipRepo, UnitOfWork,
};

#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    #[error("That ship does not belong to this campaign")]
    ShipNotInCampaign,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct CampaignOps {
    campaigns: Arc<dyn CampaignRepo>,
    ships: Arc<dyn ShipRepo>,
    unit_of_work: Arc<dyn UnitOfWork>,
    clock: Arc<dyn ClockPort>,
}

impl CampaignOps {
    pub fn new(
        campaigns: Arc<dyn CampaignRepo>,
        ships: Arc<dyn ShipRepo>,
        unit_of_work: Arc<dyn UnitOfWork>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            campaigns,
            ships,
            unit_of_work,
            clock,
        }
    }

    /// Create a campaign together with its first ship.
    pub async fn create(
        &self,
        name: &str,
        gm_name: &str,
        ship_name: &str,
        template: ShipTemplate,
    ) -> Result<(Campaign, Ship), CampaignError> {
        let now = self.clock.now();
        let campaign = Campaign::new(name, gm_name, now)?;
        let ship = Ship::from_template(campaign.id, ship_name, template, now)?;

        self.unit_of_work
            .commit(
                ChangeSet::new()
                    .with(Change::Campaign(campaign.clone()))
                    .with(Change::Ship(ship.clone())),
            )
            .await?;

        tracing::info!(
            campaign_id = %campaign.id,
            ship_id = %ship.id,
            template = %template,
            "Campaign created"
        );
        Ok((campaign, ship))
    }

    pub async fn list(&self) -> Result<Vec<Campaign>, CampaignError> {
        Ok(self.campaigns.list().await?)
    }

    pub async fn get(&self, id: CampaignId) -> Result<Campaign, CampaignError> {
        Ok(load_campaign(self.campaigns.as_ref(), id).await?)
    }

    pub async fn ships(&self, id: CampaignId) -> Result<Vec<Ship>, CampaignError> {
        Ok(self.ships.list_in_campaign(id).await?)
    }

    /// Load a ship, failing if it belongs to some other campaign.
    pub async fn ship_in_campaign(
        &self,
        campaign_id: CampaignId,
        ship_id: ShipId,
    ) -> Result<Ship, CampaignError> {
        let ship = load_ship(self.ships.as_ref(), ship_id).await?;
        if ship.campaign_id != campaign_id {
            return Err(CampaignError::ShipNotInCampaign);
        }
        Ok(ship)
    }

    pub async fn advance_time(
        &self,
        id: CampaignId,
        hours: u64,
        minutes: u64,
    ) -> Result<Campaign, CampaignError> {
        let mut campaign = load_campaign(self.campaigns.as_ref(), id).await?;
        let total = hours
            .checked_mul(MINUTES_PER_HOUR)
            .and_then(|m| m.checked_add(minutes))
            .ok_or_else(|| DomainError::validation("Time advance is too large"))?;
        campaign.advance_time(total)?;
        self.campaigns.save(&campaign).await?;

        tracing::info!(
            campaign_id = %id,
            minutes = total,
            date = %campaign.current_time.display(),
            "Campaign time advanced"
        );
        Ok(campaign)
    }

    pub async fn set_location(
        &self,
        id: CampaignId,
        sector: &str,
        hex: &str,
    ) -> Result<Campaign, CampaignError> {
        let location = Location::new(sector, hex)?;
        let mut campaign = load_campaign(self.campaigns.as_ref(), id).await?;
        campaign.set_location(location);
        self.campaigns.save(&campaign).await?;
        Ok(campaign)
    }

    pub async fn add_player_slot(
        &self,
        id: CampaignId,
        name: &str,
    ) -> Result<(Campaign, PlayerSlot), CampaignError> {
        let mut campaign = load_campaign(self.campaigns.as_ref(), id).await?;
        let slot = campaign.add_player_slot(name)?;
        self.campaigns.save(&campaign).await?;
        Ok((campaign, slot))
    }

    /// Add another ship to the campaign. Returns the campaign and its full fleet.
    pub async fn add_ship(
        &self,
        id: CampaignId,
        name: &str,
        template: ShipTemplate,
    ) -> Result<(Campaign, Vec<Ship>), CampaignError> {
        let campaign = load_campaign(self.campaigns.as_ref(), id).await?;
        let ship = Ship::from_template(campaign.id, name, template, self.clock.now())?;
        self.ships.save(&ship).await?;
        let ships = self.ships.list_in_campaign(id).await?;
        Ok((campaign, ships))
    }
}
