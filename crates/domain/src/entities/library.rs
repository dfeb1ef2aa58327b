//! Library computer entries and search query rules.

use serde::{Deserialize, Serialize};

use crate::{DomainError, LibraryEntryId};

pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_LIBRARY_RESULTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub id: LibraryEntryId,
    pub title: String,
    pub category: String,
    pub body: String,
}

impl LibraryEntry {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: LibraryEntryId::new(),
            title: title.into(),
            category: category.into(),
            body: body.into(),
        }
    }

    /// Lower-cased text the query is matched against.
    pub fn search_text(&self) -> String {
        format!("{}\n{}\n{}", self.title, self.category, self.body).to_lowercase()
    }

    pub fn matches(&self, query: &LibraryQuery) -> bool {
        self.search_text().contains(query.as_str())
    }
}

/// A validated, normalized search string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryQuery(String);

impl LibraryQuery {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            return Err(DomainError::validation(format!(
                "Search query must be at least {MIN_QUERY_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reference entries loaded into an empty library on first start.
pub fn default_library() -> Vec<LibraryEntry> {
    [
        (
            "Starport Classes",
            "Starports",
            "Class A starports offer refined fuel and shipyards capable of building \
             jump-capable hulls. Class B offer refined fuel and spacecraft yards. Class C \
             and D offer unrefined fuel only. Class E is a frontier installation with no fuel.",
        ),
        (
            "Jump Drive",
            "Ship Systems",
            "A jump drive moves a ship up to its jump rating in parsecs in roughly one week. \
             Each parsec consumes refined fuel equal to ten percent of the ship's tonnage.",
        ),
        (
            "Fuel Processing",
            "Ship Systems",
            "Onboard processors refine unrefined fuel skimmed from gas giants or drawn from \
             water at a rate of one ton per hour.",
        ),
        (
            "Gas Giant Skimming",
            "Navigation",
            "Ships with streamlined hulls can skim unrefined hydrogen from the upper \
             atmosphere of a gas giant. The fuel must be processed before use in a jump.",
        ),
        (
            "Range Bands",
            "Combat",
            "Space combat distances are measured in bands: Adjacent, Close, Medium, Long and \
             Very Long. Attacks suffer increasing penalties at greater range.",
        ),
        (
            "Rules of Engagement",
            "Combat",
            "The captain sets weapons to free, defensive or hold. Under defensive, gunners \
             engage only contacts marked hostile.",
        ),
        (
            "Pulse Laser",
            "Weapons",
            "Turret-mounted laser dealing 2D damage, effective out to Long range.",
        ),
        (
            "Beam Laser",
            "Weapons",
            "Accurate turret laser dealing 1D damage, effective out to Medium range.",
        ),
        (
            "Missile Rack",
            "Weapons",
            "Launches guided missiles dealing 4D damage at any range.",
        ),
        (
            "Sandcaster",
            "Weapons",
            "Defensive launcher that fills space near the ship with reflective particles.",
        ),
        (
            "Regina",
            "Worlds",
            "Subsector capital of the Regina subsector, Spinward Marches. Class A starport.",
        ),
        (
            "Imperial Calendar",
            "Reference",
            "Dates are written year-day: 1105-001 is the first day of the year 1105. \
             Years have 365 days.",
        ),
    ]
    .into_iter()
    .map(|(title, category, body)| LibraryEntry::new(title, category, body))
    .collect()
}
