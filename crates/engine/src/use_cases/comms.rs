//! Comms use cases: sending and filing transmissions.

use std::sync::Arc;

use starbridge_domain::{
    CampaignId, DomainError, NewTransmission, Transmission, TransmissionId,
};

use super::load_campaign;
use crate::infrastructure::ports::{CampaignRepo, ClockPort, RepoError, TransmissionRepo};

#[derive(Debug, thiserror::Error)]
pub enum CommsError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct CommsOps {
    transmissions: Arc<dyn TransmissionRepo>,
    campaigns: Arc<dyn CampaignRepo>,
    clock: Arc<dyn ClockPort>,
}

impl CommsOps {
    pub fn new(
        transmissions: Arc<dyn TransmissionRepo>,
        campaigns: Arc<dyn CampaignRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            transmissions,
            campaigns,
            clock,
        }
    }

    pub async fn send(&self, new: NewTransmission) -> Result<Transmission, CommsError> {
        let campaign = load_campaign(self.campaigns.as_ref(), new.campaign_id).await?;
        let transmission = Transmission::new(new, campaign.current_time, self.clock.now())?;
        self.transmissions.save(&transmission).await?;
        tracing::debug!(
            campaign_id = %transmission.campaign_id,
            channel = %transmission.channel,
            priority = ?transmission.priority,
            "Transmission sent"
        );
        Ok(transmission)
    }

    pub async fn list(
        &self,
        campaign_id: CampaignId,
        include_archived: bool,
    ) -> Result<Vec<Transmission>, CommsError> {
        Ok(self
            .transmissions
            .list_in_campaign(campaign_id, include_archived)
            .await?)
    }

    /// Returns the transmission and whether its flags changed.
    pub async fn mark_read(
        &self,
        campaign_id: CampaignId,
        id: TransmissionId,
    ) -> Result<(Transmission, bool), CommsError> {
        let mut transmission = self.load(campaign_id, id).await?;
        let changed = transmission.mark_read();
        if changed {
            self.transmissions.save(&transmission).await?;
        }
        Ok((transmission, changed))
    }

    pub async fn archive(
        &self,
        campaign_id: CampaignId,
        id: TransmissionId,
    ) -> Result<(Transmission, bool), CommsError> {
        let mut transmission = self.load(campaign_id, id).await?;
        let changed = transmission.archive();
        if changed {
            self.transmissions.save(&transmission).await?;
        }
        Ok((transmission, changed))
    }

    async fn load(
        &self,
        campaign_id: CampaignId,
        id: TransmissionId,
    ) -> Result<Transmission, RepoError> {
        self.transmissions
            .get(id)
            .await?
            .filter(|t| t.campaign_id == campaign_id)
            .ok_or_else(|| RepoError::not_found("Transmission", id))
    }
}
