//! Bridge crew stations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// A crew station a connection can occupy on a ship's bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrewRole {
    Captain,
    Pilot,
    Astrogator,
    Engineer,
    Gunner,
    Sensors,
    Comms,
    DamageControl,
    Medic,
    Observer,
}

impl CrewRole {
    pub const ALL: [CrewRole; 10] = [
        CrewRole::Captain,
        CrewRole::Pilot,
        CrewRole::Astrogator,
        CrewRole::Engineer,
        CrewRole::Gunner,
        CrewRole::Sensors,
        CrewRole::Comms,
        CrewRole::DamageControl,
        CrewRole::Medic,
        CrewRole::Observer,
    ];

    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CrewRole::Captain => "captain",
            CrewRole::Pilot => "pilot",
            CrewRole::Astrogator => "astrogator",
            CrewRole::Engineer => "engineer",
            CrewRole::Gunner => "gunner",
            CrewRole::Sensors => "sensors",
            CrewRole::Comms => "comms",
            CrewRole::DamageControl => "damageControl",
            CrewRole::Medic => "medic",
            CrewRole::Observer => "observer",
        }
    }

    /// Lower-case phrase used in player-facing messages ("damage control").
    pub fn display_name(&self) -> &'static str {
        match self {
            CrewRole::DamageControl => "damage control",
            CrewRole::Sensors => "sensor operator",
            CrewRole::Comms => "comms officer",
            other => other.as_str(),
        }
    }

    /// Stations several connections may hold at once on the same ship.
    ///
    /// Gunners man separate turrets; everyone else has a single seat.
    pub fn allows_multiple(&self) -> bool {
        matches!(self, CrewRole::Gunner | CrewRole::Observer)
    }
}

impl fmt::Display for CrewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrewRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CrewRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::parse(format!("Unknown crew role: {s}")))
    }
}
