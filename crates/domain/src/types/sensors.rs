//! Sensor vocabulary: range bands, scan tiers and contact markings.

use serde::{Deserialize, Serialize};

/// Ordinal distance category used instead of raw distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeBand {
    Adjacent,
    Close,
    Medium,
    Long,
    VeryLong,
}

impl RangeBand {
    pub const ALL: [RangeBand; 5] = [
        RangeBand::Adjacent,
        RangeBand::Close,
        RangeBand::Medium,
        RangeBand::Long,
        RangeBand::VeryLong,
    ];

    /// Attack dice modifier at this range.
    pub fn attack_modifier(&self) -> i32 {
        match self {
            RangeBand::Adjacent => 1,
            RangeBand::Close => 0,
            RangeBand::Medium => -1,
            RangeBand::Long => -2,
            RangeBand::VeryLong => -4,
        }
    }

    /// One band nearer, saturating at Adjacent.
    pub fn closer(&self) -> RangeBand {
        match self {
            RangeBand::Adjacent | RangeBand::Close => RangeBand::Adjacent,
            RangeBand::Medium => RangeBand::Close,
            RangeBand::Long => RangeBand::Medium,
            RangeBand::VeryLong => RangeBand::Long,
        }
    }

    /// One band further, saturating at Very Long.
    pub fn further(&self) -> RangeBand {
        match self {
            RangeBand::Adjacent => RangeBand::Close,
            RangeBand::Close => RangeBand::Medium,
            RangeBand::Medium => RangeBand::Long,
            RangeBand::Long | RangeBand::VeryLong => RangeBand::VeryLong,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RangeBand::Adjacent => "Adjacent",
            RangeBand::Close => "Close",
            RangeBand::Medium => "Medium",
            RangeBand::Long => "Long",
            RangeBand::VeryLong => "Very Long",
        }
    }
}

/// Sensor detail tier attained on a contact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ScanLevel {
    #[default]
    None,
    Passive,
    Active,
    Deep,
}

impl ScanLevel {
    pub const MAX: ScanLevel = ScanLevel::Deep;

    /// The next tier, or `None` when already at the ceiling.
    pub fn next(&self) -> Option<ScanLevel> {
        match self {
            ScanLevel::None => Some(ScanLevel::Passive),
            ScanLevel::Passive => Some(ScanLevel::Active),
            ScanLevel::Active => Some(ScanLevel::Deep),
            ScanLevel::Deep => None,
        }
    }

    pub fn ordinal(&self) -> u8 {
        match self {
            ScanLevel::None => 0,
            ScanLevel::Passive => 1,
            ScanLevel::Active => 2,
            ScanLevel::Deep => 3,
        }
    }
}

/// Marking applied to a contact by the sensor operator, captain or GM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Disposition {
    Hostile,
    Friendly,
    Neutral,
    #[default]
    Unknown,
}

/// What a contact physically is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContactKind {
    #[default]
    Ship,
    Station,
    Planet,
    Asteroid,
    Debris,
    Missile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bands_are_ordered_near_to_far() {
        assert!(RangeBand::Adjacent < RangeBand::Close);
        assert!(RangeBand::Long < RangeBand::VeryLong);
    }

    #[test]
    fn closer_and_further_saturate() {
        assert_eq!(RangeBand::Adjacent.closer(), RangeBand::Adjacent);
        assert_eq!(RangeBand::VeryLong.further(), RangeBand::VeryLong);
        assert_eq!(RangeBand::Medium.closer(), RangeBand::Close);
    }

    #[test]
    fn scan_level_ceiling_has_no_next() {
        assert_eq!(ScanLevel::None.next(), Some(ScanLevel::Passive));
        assert_eq!(ScanLevel::MAX.next(), None);
    }
}
