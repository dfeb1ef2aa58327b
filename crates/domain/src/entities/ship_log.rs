//! Ship's log - narrative and audit trail of what happened aboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CampaignId, CampaignTime, LogEntryId, ShipId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogEntryKind {
    Info,
    Navigation,
    Fuel,
    Combat,
    /// Weapons fired outside the captain's rules of engagement.
    RoeViolation,
    Damage,
    Repair,
    Orders,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipLogEntry {
    pub id: LogEntryId,
    pub ship_id: ShipId,
    pub campaign_id: CampaignId,
    pub kind: LogEntryKind,
    /// Station or person the entry is attributed to.
    pub actor: String,
    pub message: String,
    pub game_time: CampaignTime,
    pub recorded_at: DateTime<Utc>,
}

impl ShipLogEntry {
    pub fn new(
        ship_id: ShipId,
        campaign_id: CampaignId,
        kind: LogEntryKind,
        actor: impl Into<String>,
        message: impl Into<String>,
        game_time: CampaignTime,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LogEntryId::new(),
            ship_id,
            campaign_id,
            kind,
            actor: actor.into(),
            message: message.into(),
            game_time,
            recorded_at,
        }
    }
}
