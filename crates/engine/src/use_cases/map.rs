//! Shared star map: the GM pushes one view to every player.

use std::sync::Arc;

use starbridge_domain::{CampaignId, DomainError, MapView};

use super::load_campaign;
use crate::infrastructure::ports::{CampaignRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    #[error("The map is not currently shared")]
    NotShared,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct MapOps {
    campaigns: Arc<dyn CampaignRepo>,
}

impl MapOps {
    pub fn new(campaigns: Arc<dyn CampaignRepo>) -> Self {
        Self { campaigns }
    }

    pub async fn share(&self, campaign_id: CampaignId, view: MapView) -> Result<MapView, MapError> {
        let mut campaign = load_campaign(self.campaigns.as_ref(), campaign_id).await?;
        campaign.share_map(view.clone())?;
        self.campaigns.save(&campaign).await?;
        Ok(view)
    }

    /// Returns whether a map was being shared.
    pub async fn unshare(&self, campaign_id: CampaignId) -> Result<bool, MapError> {
        let mut campaign = load_campaign(self.campaigns.as_ref(), campaign_id).await?;
        let was_shared = campaign.unshare_map();
        if was_shared {
            self.campaigns.save(&campaign).await?;
        }
        Ok(was_shared)
    }

    /// Move the view that is already being shared.
    pub async fn update_view(
        &self,
        campaign_id: CampaignId,
        view: MapView,
    ) -> Result<MapView, MapError> {
        let mut campaign = load_campaign(self.campaigns.as_ref(), campaign_id).await?;
        if campaign.shared_map.is_none() {
            return Err(MapError::NotShared);
        }
        campaign.share_map(view.clone())?;
        self.campaigns.save(&campaign).await?;
        Ok(view)
    }
}
