//! Ship log writer shared by the subsystems that narrate what they did.

use std::sync::Arc;

use starbridge_domain::{LogEntryKind, Ship, ShipId, ShipLogEntry};

use super::load_campaign;
use crate::infrastructure::ports::{CampaignRepo, ClockPort, RepoError, ShipLogRepo};

pub const DEFAULT_LOG_LIMIT: u32 = 50;
pub const MAX_LOG_LIMIT: u32 = 500;

pub struct ShipLogWriter {
    log: Arc<dyn ShipLogRepo>,
    campaigns: Arc<dyn CampaignRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ShipLogWriter {
    pub fn new(
        log: Arc<dyn ShipLogRepo>,
        campaigns: Arc<dyn CampaignRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            log,
            campaigns,
            clock,
        }
    }

    /// Append a narrative entry stamped with the campaign clock.
    ///
    /// A failed append is logged and swallowed; the action it narrates has
    /// already committed.
    pub async fn record(
        &self,
        ship: &Ship,
        kind: LogEntryKind,
        actor: &str,
        message: impl Into<String>,
    ) -> Option<ShipLogEntry> {
        match self.try_record(ship, kind, actor, message.into()).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(ship_id = %ship.id, kind = ?kind, error = %e, "Failed to write ship log entry");
                None
            }
        }
    }

    async fn try_record(
        &self,
        ship: &Ship,
        kind: LogEntryKind,
        actor: &str,
        message: String,
    ) -> Result<ShipLogEntry, RepoError> {
        let entry = self.entry(ship, kind, actor, message).await?;
        self.log.append(&entry).await?;
        tracing::debug!(ship_id = %ship.id, kind = ?kind, "Ship log entry recorded");
        Ok(entry)
    }

    /// Build an entry stamped with the campaign clock without writing it.
    ///
    /// For entries that must commit together with the action they describe.
    pub async fn entry(
        &self,
        ship: &Ship,
        kind: LogEntryKind,
        actor: &str,
        message: impl Into<String>,
    ) -> Result<ShipLogEntry, RepoError> {
        let campaign = load_campaign(self.campaigns.as_ref(), ship.campaign_id).await?;
        Ok(ShipLogEntry::new(
            ship.id,
            ship.campaign_id,
            kind,
            actor,
            message.into(),
            campaign.current_time,
            self.clock.now(),
        ))
    }

    pub async fn recent(
        &self,
        ship_id: ShipId,
        limit: Option<u32>,
    ) -> Result<Vec<ShipLogEntry>, RepoError> {
        let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
        self.log.list_for_ship(ship_id, limit).await
    }
}
