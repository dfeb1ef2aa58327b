//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    ports::{
        CampaignRepo, ClockPort, ContactRepo, FuelSourceRepo, LibraryRepo, OrderRepo,
        RandomPort, ShipLogRepo, ShipRepo, TransmissionRepo, UnitOfWork,
    },
    state_store::SqliteStore,
};
use crate::use_cases;

/// Main application state.
///
/// Holds the repository ports and the use cases built on them.
/// Passed to WebSocket handlers via [`crate::api::websocket::WsState`].
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for all repository ports.
#[derive(Clone)]
pub struct Repositories {
    pub campaign: Arc<dyn CampaignRepo>,
    pub ship: Arc<dyn ShipRepo>,
    pub contact: Arc<dyn ContactRepo>,
    pub order: Arc<dyn OrderRepo>,
    pub transmission: Arc<dyn TransmissionRepo>,
    pub fuel_source: Arc<dyn FuelSourceRepo>,
    pub ship_log: Arc<dyn ShipLogRepo>,
    pub library: Arc<dyn LibraryRepo>,
    /// Multi-record writes.
    pub unit_of_work: Arc<dyn UnitOfWork>,
}

impl Repositories {
    /// Every port served by the one SQLite store.
    pub fn from_store(store: Arc<SqliteStore>) -> Self {
        Self {
            campaign: store.clone(),
            ship: store.clone(),
            contact: store.clone(),
            order: store.clone(),
            transmission: store.clone(),
            fuel_source: store.clone(),
            ship_log: store.clone(),
            library: store.clone(),
            unit_of_work: store,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub campaign: Arc<use_cases::CampaignOps>,
    pub map: Arc<use_cases::MapOps>,
    pub fuel: Arc<use_cases::FuelOps>,
    pub navigation: Arc<use_cases::NavigationOps>,
    pub power: Arc<use_cases::PowerOps>,
    pub weapons: Arc<use_cases::WeaponsOps>,
    pub orders: Arc<use_cases::OrdersOps>,
    pub comms: Arc<use_cases::CommsOps>,
    pub sensors: Arc<use_cases::SensorsOps>,
    pub repairs: Arc<use_cases::RepairsOps>,
    pub library: Arc<use_cases::LibraryOps>,
    pub ship_log: Arc<use_cases::ShipLogWriter>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        repos: Repositories,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let ship_log = Arc::new(use_cases::ShipLogWriter::new(
            repos.ship_log.clone(),
            repos.campaign.clone(),
            clock.clone(),
        ));

        let use_cases = UseCases {
            campaign: Arc::new(use_cases::CampaignOps::new(
                repos.campaign.clone(),
                repos.ship.clone(),
                repos.unit_of_work.clone(),
                clock.clone(),
            )),
            map: Arc::new(use_cases::MapOps::new(repos.campaign.clone())),
            fuel: Arc::new(use_cases::FuelOps::new(
                repos.ship.clone(),
                repos.fuel_source.clone(),
                repos.campaign.clone(),
                repos.unit_of_work.clone(),
                ship_log.clone(),
            )),
            navigation: Arc::new(use_cases::NavigationOps::new(
                repos.ship.clone(),
                repos.campaign.clone(),
                repos.contact.clone(),
                repos.unit_of_work.clone(),
                ship_log.clone(),
            )),
            power: Arc::new(use_cases::PowerOps::new(repos.ship.clone())),
            weapons: Arc::new(use_cases::WeaponsOps::new(
                repos.ship.clone(),
                repos.contact.clone(),
                repos.unit_of_work.clone(),
                ship_log.clone(),
                random.clone(),
            )),
            orders: Arc::new(use_cases::OrdersOps::new(
                repos.order.clone(),
                repos.ship.clone(),
                repos.campaign.clone(),
                repos.unit_of_work.clone(),
                clock.clone(),
                ship_log.clone(),
            )),
            comms: Arc::new(use_cases::CommsOps::new(
                repos.transmission.clone(),
                repos.campaign.clone(),
                clock,
            )),
            sensors: Arc::new(use_cases::SensorsOps::new(
                repos.contact.clone(),
                repos.ship.clone(),
            )),
            repairs: Arc::new(use_cases::RepairsOps::new(
                repos.ship.clone(),
                random,
                ship_log.clone(),
            )),
            library: Arc::new(use_cases::LibraryOps::new(repos.library.clone())),
            ship_log,
        };

        Self {
            repositories: repos,
            use_cases,
        }
    }
}
