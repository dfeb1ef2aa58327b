//! Fuel use cases: tank status, refuelling and unrefined-fuel processing.

use std::sync::Arc;

use starbridge_domain::{
    jump_fuel_per_parsec, CampaignId, DomainError, FuelGrade, FuelSource, FuelSourceId,
    FuelSourceKind, LogEntryKind, ProcessingProgress, Ship, ShipId, ShipSystem,
    FUEL_PROCESSING_TONS_PER_HOUR,
};

use super::{load_campaign, load_ship, ShipLogWriter};
use crate::infrastructure::ports::{
    CampaignRepo, Change, ChangeSet, FuelSourceRepo, RepoError, ShipRepo, UnitOfWork,
};

#[derive(Debug, thiserror::Error)]
pub enum FuelError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    #[error("Nothing to transfer: tanks are full or the source is empty")]
    NothingToTransfer,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// What a completed refuel moved.
#[derive(Debug, Clone)]
pub struct Refuelled {
    pub ship: Ship,
    pub source: FuelSource,
    pub tons: u32,
    pub grade: FuelGrade,
}

/// Result of starting a processing run.
#[derive(Debug, Clone)]
pub struct ProcessingStarted {
    pub ship: Ship,
    pub hours_required: u64,
}

pub struct FuelOps {
    ships: Arc<dyn ShipRepo>,
    sources: Arc<dyn FuelSourceRepo>,
    campaigns: Arc<dyn CampaignRepo>,
    unit_of_work: Arc<dyn UnitOfWork>,
    log: Arc<ShipLogWriter>,
}

impl FuelOps {
    pub fn new(
        ships: Arc<dyn ShipRepo>,
        sources: Arc<dyn FuelSourceRepo>,
        campaigns: Arc<dyn CampaignRepo>,
        unit_of_work: Arc<dyn UnitOfWork>,
        log: Arc<ShipLogWriter>,
    ) -> Self {
        Self {
            ships,
            sources,
            campaigns,
            unit_of_work,
            log,
        }
    }

    /// Current tanks plus the refined tons one parsec of jump would burn.
    pub async fn status(&self, ship_id: ShipId) -> Result<(Ship, u32), FuelError> {
        let ship = load_ship(self.ships.as_ref(), ship_id).await?;
        let per_parsec = jump_fuel_per_parsec(ship.effective_tonnage());
        Ok((ship, per_parsec))
    }

    pub async fn sources(&self, campaign_id: CampaignId) -> Result<Vec<FuelSource>, FuelError> {
        Ok(self.sources.list_in_campaign(campaign_id).await?)
    }

    /// Register a fuel source and return the campaign's updated list.
    pub async fn add_source(
        &self,
        campaign_id: CampaignId,
        name: &str,
        kind: FuelSourceKind,
        available_tons: Option<u32>,
    ) -> Result<Vec<FuelSource>, FuelError> {
        let source = FuelSource::new(campaign_id, name, kind, available_tons)?;
        self.sources.save(&source).await?;
        tracing::info!(campaign_id = %campaign_id, source_id = %source.id, "Fuel source added");
        Ok(self.sources.list_in_campaign(campaign_id).await?)
    }

    /// Move fuel from a source into the ship's tanks.
    ///
    /// Without `fill_available` the transfer is all or nothing: the source
    /// must hold `tons` and the tanks must have room for `tons`. With it, the
    /// transfer is clamped to what both sides allow.
    pub async fn refuel(
        &self,
        ship_id: ShipId,
        source_id: FuelSourceId,
        tons: u32,
        fill_available: bool,
        actor: &str,
    ) -> Result<Refuelled, FuelError> {
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        let mut source = self
            .sources
            .get(source_id)
            .await?
            .filter(|source| source.campaign_id == ship.campaign_id)
            .ok_or_else(|| RepoError::not_found("Fuel source", source_id))?;

        if tons == 0 {
            return Err(DomainError::validation("Refuel amount must be at least 1 ton").into());
        }

        let amount = if fill_available {
            let amount = source
                .supply_limit(tons)
                .min(ship.fuel.free_capacity());
            if amount == 0 {
                return Err(FuelError::NothingToTransfer);
            }
            amount
        } else {
            if !source.has_at_least(tons) {
                return Err(DomainError::constraint(format!(
                    "{} only has {} tons available",
                    source.name,
                    source.available_tons.unwrap_or_default()
                ))
                .into());
            }
            tons
        };

        let grade = source.grade();
        ship.fuel.add(amount, grade)?;
        source.draw(amount)?;

        // Tanks and a finite source move together.
        let mut changes = ChangeSet::new().with(Change::Ship(ship.clone()));
        if source.available_tons.is_some() {
            changes.push(Change::FuelSource(source.clone()));
        }
        self.unit_of_work.commit(changes).await?;

        self.log
            .record(
                &ship,
                LogEntryKind::Fuel,
                actor,
                format!(
                    "Took on {amount} tons of {} fuel from {}",
                    grade_label(grade),
                    source.name
                ),
            )
            .await;

        tracing::info!(
            ship_id = %ship.id,
            source_id = %source.id,
            tons = amount,
            grade = ?grade,
            "Ship refuelled"
        );
        Ok(Refuelled {
            ship,
            source,
            tons: amount,
            grade,
        })
    }

    pub async fn start_processing(
        &self,
        ship_id: ShipId,
        tons: u32,
        actor: &str,
    ) -> Result<ProcessingStarted, FuelError> {
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        ship.require_system(ShipSystem::FuelProcessor, "process fuel")?;
        let campaign = load_campaign(self.campaigns.as_ref(), ship.campaign_id).await?;

        let run = ship.fuel.start_processing(
            tons,
            campaign.current_time,
            FUEL_PROCESSING_TONS_PER_HOUR,
        )?;
        self.ships.save(&ship).await?;

        self.log
            .record(
                &ship,
                LogEntryKind::Fuel,
                actor,
                format!("Started processing {tons} tons of unrefined fuel"),
            )
            .await;

        Ok(ProcessingStarted {
            ship,
            hours_required: run.hours_remaining(),
        })
    }

    /// Resolve processing progress against the campaign clock.
    ///
    /// `None` progress means nothing is being processed.
    pub async fn check_processing(
        &self,
        ship_id: ShipId,
    ) -> Result<(Ship, Option<ProcessingProgress>), FuelError> {
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        let campaign = load_campaign(self.campaigns.as_ref(), ship.campaign_id).await?;

        let progress = ship.fuel.advance_processing(campaign.current_time);
        if let Some(progress) = progress {
            if progress.processed_now > 0 || progress.complete {
                self.ships.save(&ship).await?;
            }
            if progress.complete {
                self.log
                    .record(
                        &ship,
                        LogEntryKind::Fuel,
                        "Engineering",
                        "Fuel processing complete",
                    )
                    .await;
            }
        }
        Ok((ship, progress))
    }
}

fn grade_label(grade: FuelGrade) -> &'static str {
    match grade {
        FuelGrade::Refined => "refined",
        FuelGrade::Unrefined => "unrefined",
    }
}
