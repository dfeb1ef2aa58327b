//! Fuel tanks, onboard processing and jump fuel arithmetic.

use serde::{Deserialize, Serialize};

use crate::{CampaignTime, DomainError};

/// Tons of unrefined fuel a standard processor refines per in-game hour.
pub const FUEL_PROCESSING_TONS_PER_HOUR: u32 = 1;

/// Jump fuel per parsec, as a percentage of effective tonnage.
pub const JUMP_FUEL_PERCENT: u32 = 10;

/// Refinement grade of fuel entering the tanks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FuelGrade {
    Refined,
    Unrefined,
}

/// An in-progress refinement run.
///
/// Progress is stored as data (start time + rate) and resolved lazily
/// whenever someone checks it against the campaign clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelProcessing {
    pub tons_total: u32,
    pub tons_processed: u32,
    pub started_at: CampaignTime,
    pub rate_per_hour: u32,
}

impl FuelProcessing {
    pub fn tons_remaining(&self) -> u32 {
        self.tons_total.saturating_sub(self.tons_processed)
    }

    /// Campaign hours still needed to finish, rounded up.
    pub fn hours_remaining(&self) -> u64 {
        if self.rate_per_hour == 0 {
            return 0;
        }
        let rate = u64::from(self.rate_per_hour);
        (u64::from(self.tons_remaining()) + rate - 1) / rate
    }
}

/// Result of resolving processing progress against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingProgress {
    /// Tons moved from unrefined to refined by this resolution.
    pub processed_now: u32,
    pub tons_remaining: u32,
    pub hours_remaining: u64,
    pub complete: bool,
}

/// Fuel tank contents. Refined + unrefined never exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelState {
    pub refined: u32,
    pub unrefined: u32,
    pub max: u32,
    #[serde(default)]
    pub processing: Option<FuelProcessing>,
}

impl FuelState {
    /// Full tanks of refined fuel.
    pub fn full(max: u32) -> Self {
        Self {
            refined: max,
            unrefined: 0,
            max,
            processing: None,
        }
    }

    pub fn current(&self) -> u32 {
        self.refined.saturating_add(self.unrefined)
    }

    pub fn free_capacity(&self) -> u32 {
        self.max.saturating_sub(self.current())
    }

    /// Add fuel to the tanks. Never partially fills.
    pub fn add(&mut self, tons: u32, grade: FuelGrade) -> Result<(), DomainError> {
        if tons == 0 {
            return Err(DomainError::validation("Refuel amount must be at least 1 ton"));
        }
        let free = self.free_capacity();
        if tons > free {
            return Err(DomainError::CapacityExceeded {
                requested: tons,
                free,
            });
        }
        match grade {
            FuelGrade::Refined => self.refined += tons,
            FuelGrade::Unrefined => self.unrefined += tons,
        }
        Ok(())
    }

    /// Burn refined fuel, e.g. for a jump.
    pub fn consume_refined(&mut self, tons: u32) -> Result<(), DomainError> {
        if tons > self.refined {
            return Err(DomainError::constraint(format!(
                "Insufficient refined fuel: need {tons} tons, have {}",
                self.refined
            )));
        }
        self.refined -= tons;
        Ok(())
    }

    /// Queue `tons` of unrefined fuel for processing starting at `now`.
    pub fn start_processing(
        &mut self,
        tons: u32,
        now: CampaignTime,
        rate_per_hour: u32,
    ) -> Result<FuelProcessing, DomainError> {
        if self.processing.is_some() {
            return Err(DomainError::constraint("Fuel processing already in progress"));
        }
        if tons == 0 {
            return Err(DomainError::validation(
                "Processing amount must be at least 1 ton",
            ));
        }
        if tons > self.unrefined {
            return Err(DomainError::constraint(format!(
                "Not enough unrefined fuel: requested {tons} tons, have {}",
                self.unrefined
            )));
        }
        let processing = FuelProcessing {
            tons_total: tons,
            tons_processed: 0,
            started_at: now,
            rate_per_hour,
        };
        self.processing = Some(processing);
        Ok(processing)
    }

    /// Resolve processing progress up to `now`.
    ///
    /// Moves `min(total, rate * hours)` tons in total from unrefined to refined;
    /// repeated calls only apply the increment since the last call. Clears the
    /// run once everything is refined.
    pub fn advance_processing(&mut self, now: CampaignTime) -> Option<ProcessingProgress> {
        let mut processing = self.processing?;
        let hours = now.whole_hours_since(processing.started_at);
        let target = u64::from(processing.rate_per_hour)
            .saturating_mul(hours)
            .min(u64::from(processing.tons_total)) as u32;
        let processed_now = target
            .saturating_sub(processing.tons_processed)
            .min(self.unrefined);

        self.unrefined -= processed_now;
        self.refined += processed_now;
        processing.tons_processed += processed_now;

        let complete = processing.tons_remaining() == 0 || self.unrefined == 0;
        let progress = ProcessingProgress {
            processed_now,
            tons_remaining: if complete { 0 } else { processing.tons_remaining() },
            hours_remaining: if complete { 0 } else { processing.hours_remaining() },
            complete,
        };
        self.processing = if complete { None } else { Some(processing) };
        Some(progress)
    }
}

/// Refined tons burned per parsec for a ship of the given effective tonnage.
///
/// Effective tonnage is hull tonnage plus anything carried or towed.
pub fn jump_fuel_per_parsec(effective_tonnage: u32) -> u32 {
    let scaled = effective_tonnage.saturating_mul(JUMP_FUEL_PERCENT);
    scaled / 100 + u32::from(scaled % 100 != 0)
}
