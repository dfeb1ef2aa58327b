//! In-game calendar.
//!
//! Campaign time is kept as a count of whole minutes on the Imperial calendar:
//! 365-day years, day 001 first, no months. Rendering follows the usual
//! `YYYY-DDD HH:MM` form used on bridge displays.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const MINUTES_PER_HOUR: u64 = 60;
pub const HOURS_PER_DAY: u64 = 24;
pub const DAYS_PER_YEAR: u64 = 365;
pub const MINUTES_PER_DAY: u64 = MINUTES_PER_HOUR * HOURS_PER_DAY;
pub const MINUTES_PER_YEAR: u64 = MINUTES_PER_DAY * DAYS_PER_YEAR;

/// Year new campaigns start in unless the GM says otherwise.
pub const DEFAULT_START_YEAR: u64 = 1105;

/// A point on the campaign calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTime {
    total_minutes: u64,
}

impl CampaignTime {
    pub fn from_minutes(total_minutes: u64) -> Self {
        Self { total_minutes }
    }

    /// Midnight on the given day (1-based) of the given year.
    pub fn from_date(year: u64, day: u64) -> Result<Self, DomainError> {
        if !(1..=DAYS_PER_YEAR).contains(&day) {
            return Err(DomainError::validation(format!(
                "Day must be between 001 and {DAYS_PER_YEAR}"
            )));
        }
        Ok(Self {
            total_minutes: year * MINUTES_PER_YEAR + (day - 1) * MINUTES_PER_DAY,
        })
    }

    pub fn total_minutes(&self) -> u64 {
        self.total_minutes
    }

    pub fn year(&self) -> u64 {
        self.total_minutes / MINUTES_PER_YEAR
    }

    /// Day of year, 1-based.
    pub fn day(&self) -> u64 {
        (self.total_minutes % MINUTES_PER_YEAR) / MINUTES_PER_DAY + 1
    }

    pub fn hour(&self) -> u64 {
        (self.total_minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR
    }

    pub fn minute(&self) -> u64 {
        self.total_minutes % MINUTES_PER_HOUR
    }

    pub fn advance_minutes(&mut self, minutes: u64) {
        self.total_minutes = self.total_minutes.saturating_add(minutes);
    }

    pub fn advance_hours(&mut self, hours: u64) {
        self.advance_minutes(hours.saturating_mul(MINUTES_PER_HOUR));
    }

    /// Whole hours elapsed since `earlier`. Zero if `earlier` is in the future.
    pub fn whole_hours_since(&self, earlier: CampaignTime) -> u64 {
        self.total_minutes.saturating_sub(earlier.total_minutes) / MINUTES_PER_HOUR
    }

    /// Imperial date string, e.g. `1105-001 08:30`.
    pub fn display(&self) -> String {
        format!(
            "{}-{:03} {:02}:{:02}",
            self.year(),
            self.day(),
            self.hour(),
            self.minute()
        )
    }
}

impl Default for CampaignTime {
    fn default() -> Self {
        Self {
            total_minutes: DEFAULT_START_YEAR * MINUTES_PER_YEAR,
        }
    }
}

impl fmt::Display for CampaignTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
