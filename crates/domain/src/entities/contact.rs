//! Contact entity - a sensor-detected object visible to one campaign.
//!
//! Contacts are targetable unless the GM says otherwise. Scan level only
//! climbs; the GM can reset it explicitly.

use serde::{Deserialize, Serialize};

use crate::{CampaignId, ContactId, ContactKind, Disposition, DomainError, RangeBand, ScanLevel};

fn default_targetable() -> bool {
    true
}

/// Direction of a pilot maneuver relative to a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ManeuverDirection {
    /// Close the distance by one range band.
    Close,
    /// Open the distance by one range band.
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub campaign_id: CampaignId,
    pub name: String,
    #[serde(default)]
    pub kind: ContactKind,
    pub range_band: RangeBand,
    /// Degrees, 0..360.
    #[serde(default)]
    pub bearing: u16,
    #[serde(default)]
    pub disposition: Disposition,
    #[serde(default = "default_targetable")]
    pub is_targetable: bool,
    #[serde(default)]
    pub scan_level: ScanLevel,
    /// Present only on destructible contacts.
    #[serde(default)]
    pub health: Option<u32>,
}

impl Contact {
    pub fn new(
        campaign_id: CampaignId,
        name: impl Into<String>,
        kind: ContactKind,
        range_band: RangeBand,
        bearing: u16,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Contact name cannot be empty"));
        }
        if bearing >= 360 {
            return Err(DomainError::validation("Bearing must be between 0 and 359"));
        }
        Ok(Self {
            id: ContactId::new(),
            campaign_id,
            name,
            kind,
            range_band,
            bearing,
            disposition: Disposition::Unknown,
            is_targetable: true,
            scan_level: ScanLevel::None,
            health: None,
        })
    }

    pub fn with_health(mut self, health: u32) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    /// Raise scan level by one tier. At the ceiling this is a no-op and
    /// returns `false`.
    pub fn advance_scan(&mut self) -> bool {
        match self.scan_level.next() {
            Some(next) => {
                self.scan_level = next;
                true
            }
            None => false,
        }
    }

    pub fn reset_scan(&mut self) {
        self.scan_level = ScanLevel::None;
    }

    pub fn maneuver(&mut self, direction: ManeuverDirection) -> bool {
        let next = match direction {
            ManeuverDirection::Close => self.range_band.closer(),
            ManeuverDirection::Open => self.range_band.further(),
        };
        let moved = next != self.range_band;
        self.range_band = next;
        moved
    }

    /// Apply weapon damage. Returns true when the contact is destroyed.
    /// Contacts without health take no damage.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        match self.health.as_mut() {
            Some(health) => {
                *health = health.saturating_sub(amount);
                *health == 0
            }
            None => false,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.health == Some(0)
    }
}
