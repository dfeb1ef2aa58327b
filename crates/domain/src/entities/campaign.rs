//! Campaign entity - one ongoing game with its calendar, location and roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CampaignId, CampaignTime, DomainError, PlayerSlotId};

/// A seat a player claims when joining the campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSlot {
    pub id: PlayerSlotId,
    pub name: String,
}

/// Sector/hex coordinates of the campaign's current position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub sector: String,
    pub hex: String,
}

impl Location {
    pub fn new(sector: impl Into<String>, hex: impl Into<String>) -> Result<Self, DomainError> {
        let sector = sector.into().trim().to_string();
        let hex = hex.into().trim().to_string();
        if sector.is_empty() || hex.is_empty() {
            return Err(DomainError::validation("Sector and hex are required"));
        }
        Ok(Self { sector, hex })
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            sector: "Spinward Marches".to_string(),
            hex: "1910".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

/// The map view the GM is pushing to every player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub center: MapPoint,
    pub sector: String,
    pub hex: String,
    pub zoom: f64,
}

impl MapView {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(DomainError::validation("Map zoom must be a positive number"));
        }
        if !self.center.x.is_finite() || !self.center.y.is_finite() {
            return Err(DomainError::validation("Map center must be finite"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub gm_name: String,
    pub current_time: CampaignTime,
    pub location: Location,
    #[serde(default)]
    pub player_slots: Vec<PlayerSlot>,
    #[serde(default)]
    pub shared_map: Option<MapView>,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(
        name: impl Into<String>,
        gm_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Campaign name cannot be empty"));
        }
        let gm_name = gm_name.into().trim().to_string();
        if gm_name.is_empty() {
            return Err(DomainError::validation("GM name cannot be empty"));
        }
        Ok(Self {
            id: CampaignId::new(),
            name,
            gm_name,
            current_time: CampaignTime::default(),
            location: Location::default(),
            player_slots: Vec::new(),
            shared_map: None,
            created_at: now,
        })
    }

    pub fn advance_time(&mut self, minutes: u64) -> Result<(), DomainError> {
        if minutes == 0 {
            return Err(DomainError::validation("Time advance must be positive"));
        }
        self.current_time.advance_minutes(minutes);
        Ok(())
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn add_player_slot(&mut self, name: impl Into<String>) -> Result<PlayerSlot, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Player slot name cannot be empty"));
        }
        if self
            .player_slots
            .iter()
            .any(|slot| slot.name.eq_ignore_ascii_case(&name))
        {
            return Err(DomainError::constraint(format!(
                "A player slot named '{name}' already exists"
            )));
        }
        let slot = PlayerSlot {
            id: PlayerSlotId::new(),
            name,
        };
        self.player_slots.push(slot.clone());
        Ok(slot)
    }

    pub fn slot(&self, id: PlayerSlotId) -> Option<&PlayerSlot> {
        self.player_slots.iter().find(|slot| slot.id == id)
    }

    pub fn share_map(&mut self, view: MapView) -> Result<(), DomainError> {
        view.validate()?;
        self.shared_map = Some(view);
        Ok(())
    }

    /// Returns whether a map was being shared.
    pub fn unshare_map(&mut self) -> bool {
        self.shared_map.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign() -> Campaign {
        Campaign::new("Outbound", "Sam", Utc::now()).expect("valid campaign")
    }

    #[test]
    fn rejects_blank_names() {
        assert!(Campaign::new("  ", "Sam", Utc::now()).is_err());
        assert!(Campaign::new("Outbound", "", Utc::now()).is_err());
    }

    #[test]
    fn slot_names_are_unique_case_insensitively() {
        let mut campaign = campaign();
        let slot = campaign.add_player_slot("Alex").expect("first slot");
        assert!(campaign.add_player_slot("alex").is_err());
        assert_eq!(campaign.slot(slot.id).map(|s| s.name.as_str()), Some("Alex"));
    }

    #[test]
    fn map_share_round_trip() {
        let mut campaign = campaign();
        let view = MapView {
            center: MapPoint { x: 1.0, y: 2.0 },
            sector: "Spinward Marches".into(),
            hex: "1910".into(),
            zoom: 2.0,
        };
        campaign.share_map(view).expect("valid view");
        assert!(campaign.unshare_map());
        assert!(!campaign.unshare_map());
    }

    #[test]
    fn zero_zoom_is_rejected() {
        let mut campaign = campaign();
        let view = MapView {
            center: MapPoint { x: 0.0, y: 0.0 },
            sector: "X".into(),
            hex: "0101".into(),
            zoom: 0.0,
        };
        assert!(campaign.share_map(view).is_err());
        assert!(campaign.shared_map.is_none());
    }
}
