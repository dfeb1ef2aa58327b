//! Transmission entity - a comms message on a named channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CampaignId, CampaignTime, DomainError, ShipId, TransmissionId};

/// Channel whose traffic stays on the sending ship's bridge.
pub const BRIDGE_CHANNEL: &str = "bridge";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum TransmissionPriority {
    #[default]
    Routine,
    Priority,
    Urgent,
    Flash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transmission {
    pub id: TransmissionId,
    pub campaign_id: CampaignId,
    /// Ship that sent it, if any.
    #[serde(default)]
    pub ship_id: Option<ShipId>,
    pub channel: String,
    pub sender: String,
    pub body: String,
    #[serde(default)]
    pub priority: TransmissionPriority,
    pub game_time: CampaignTime,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub archived: bool,
}

/// Fields a sender supplies; the rest is stamped on creation.
#[derive(Debug, Clone)]
pub struct NewTransmission {
    pub campaign_id: CampaignId,
    pub ship_id: Option<ShipId>,
    pub channel: String,
    pub sender: String,
    pub body: String,
    pub priority: TransmissionPriority,
}

impl Transmission {
    pub fn new(
        new: NewTransmission,
        game_time: CampaignTime,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let channel = new.channel.trim().to_string();
        if channel.is_empty() {
            return Err(DomainError::validation("Channel is required"));
        }
        let body = new.body.trim().to_string();
        if body.is_empty() {
            return Err(DomainError::validation("Transmission body cannot be empty"));
        }
        Ok(Self {
            id: TransmissionId::new(),
            campaign_id: new.campaign_id,
            ship_id: new.ship_id,
            channel,
            sender: new.sender,
            body,
            priority: new.priority,
            game_time,
            timestamp,
            read: false,
            archived: false,
        })
    }

    pub fn is_bridge_traffic(&self) -> bool {
        self.channel.eq_ignore_ascii_case(BRIDGE_CHANNEL)
    }

    /// Returns whether the flag changed.
    pub fn mark_read(&mut self) -> bool {
        !std::mem::replace(&mut self.read, true)
    }

    /// Archiving also marks the message read. Returns whether anything changed.
    pub fn archive(&mut self) -> bool {
        let was_read = self.mark_read();
        let was_archived = !std::mem::replace(&mut self.archived, true);
        was_read || was_archived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transmission(channel: &str) -> Transmission {
        Transmission::new(
            NewTransmission {
                campaign_id: CampaignId::new(),
                ship_id: Some(ShipId::new()),
                channel: channel.into(),
                sender: "comms officer".into(),
                body: "Hailing frequencies open".into(),
                priority: TransmissionPriority::Urgent,
            },
            CampaignTime::default(),
            Utc::now(),
        )
        .expect("valid transmission")
    }

    #[test]
    fn priorities_are_ordered() {
        assert!(TransmissionPriority::Routine < TransmissionPriority::Priority);
        assert!(TransmissionPriority::Urgent < TransmissionPriority::Flash);
    }

    #[test]
    fn bridge_channel_is_case_insensitive() {
        assert!(transmission("Bridge").is_bridge_traffic());
        assert!(!transmission("starport").is_bridge_traffic());
    }

    #[test]
    fn archive_implies_read() {
        let mut t = transmission("starport");
        assert!(t.archive());
        assert!(t.read);
        assert!(!t.archive());
        assert!(!t.mark_read());
    }
}
