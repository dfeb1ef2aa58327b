//! Fuel source entity - somewhere a ship can take on fuel.

use serde::{Deserialize, Serialize};

use crate::{CampaignId, DomainError, FuelGrade, FuelSourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FuelSourceKind {
    /// Starport refined fuel.
    Refined,
    /// Starport unrefined fuel.
    Unrefined,
    GasGiant,
    Water,
}

impl FuelSourceKind {
    pub fn grade(&self) -> FuelGrade {
        match self {
            FuelSourceKind::Refined => FuelGrade::Refined,
            _ => FuelGrade::Unrefined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelSource {
    pub id: FuelSourceId,
    pub campaign_id: CampaignId,
    pub name: String,
    pub kind: FuelSourceKind,
    /// `None` means unlimited.
    #[serde(default)]
    pub available_tons: Option<u32>,
}

impl FuelSource {
    pub fn new(
        campaign_id: CampaignId,
        name: impl Into<String>,
        kind: FuelSourceKind,
        available_tons: Option<u32>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Fuel source name cannot be empty"));
        }
        Ok(Self {
            id: FuelSourceId::new(),
            campaign_id,
            name,
            kind,
            available_tons,
        })
    }

    pub fn grade(&self) -> FuelGrade {
        self.kind.grade()
    }

    pub fn has_at_least(&self, tons: u32) -> bool {
        self.available_tons.is_none_or(|available| available >= tons)
    }

    /// How many of `requested` tons this source could supply.
    pub fn supply_limit(&self, requested: u32) -> u32 {
        self.available_tons
            .map_or(requested, |available| available.min(requested))
    }

    pub fn draw(&mut self, tons: u32) -> Result<(), DomainError> {
        match self.available_tons.as_mut() {
            None => Ok(()),
            Some(available) if *available >= tons => {
                *available -= tons;
                Ok(())
            }
            Some(available) => Err(DomainError::constraint(format!(
                "{} only has {} tons available",
                self.name, available
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_refined_sources_deliver_refined_fuel() {
        assert_eq!(FuelSourceKind::Refined.grade(), FuelGrade::Refined);
        assert_eq!(FuelSourceKind::GasGiant.grade(), FuelGrade::Unrefined);
        assert_eq!(FuelSourceKind::Water.grade(), FuelGrade::Unrefined);
    }

    #[test]
    fn finite_sources_are_decremented() {
        let mut source =
            FuelSource::new(CampaignId::new(), "Highport", FuelSourceKind::Refined, Some(30))
                .expect("valid");
        source.draw(20).expect("enough");
        assert_eq!(source.available_tons, Some(10));
        assert!(source.draw(11).is_err());
        assert_eq!(source.available_tons, Some(10));
        assert_eq!(source.supply_limit(25), 10);
    }

    #[test]
    fn unlimited_sources_never_run_dry() {
        let mut source =
            FuelSource::new(CampaignId::new(), "Gas giant", FuelSourceKind::GasGiant, None)
                .expect("valid");
        source.draw(10_000).expect("unlimited");
        assert!(source.has_at_least(u32::MAX));
    }
}
