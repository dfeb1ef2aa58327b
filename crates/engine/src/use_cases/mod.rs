//! Use cases - one module per bridge subsystem.
//!
//! Each use case loads the records it needs through the repository ports,
//! applies the domain rule, writes the result back and returns the new state.
//! Callers hold the campaign command lock for the whole call.

pub mod campaign;
pub mod comms;
pub mod fuel;
pub mod library;
pub mod map;
pub mod navigation;
pub mod orders;
pub mod power;
pub mod repairs;
pub mod sensors;
pub mod ship_log;
pub mod weapons;

use starbridge_domain::{Campaign, CampaignId, Contact, ContactId, Ship, ShipId};

use crate::infrastructure::ports::{CampaignRepo, ContactRepo, RepoError, ShipRepo};

pub use campaign::{CampaignError, CampaignOps};
pub use comms::{CommsError, CommsOps};
pub use fuel::{FuelError, FuelOps};
pub use library::{LibraryError, LibraryOps};
pub use map::{MapError, MapOps};
pub use navigation::{NavigationError, NavigationOps};
pub use orders::{OrdersError, OrdersOps};
pub use power::{PowerError, PowerOps};
pub use repairs::{RepairsError, RepairsOps};
pub use sensors::{SensorsError, SensorsOps};
pub use ship_log::ShipLogWriter;
pub use weapons::{WeaponsError, WeaponsOps};

pub(crate) async fn load_campaign(
    campaigns: &dyn CampaignRepo,
    id: CampaignId,
) -> Result<Campaign, RepoError> {
    campaigns
        .get(id)
        .await?
        .ok_or_else(|| RepoError::not_found("Campaign", id))
}

pub(crate) async fn load_ship(ships: &dyn ShipRepo, id: ShipId) -> Result<Ship, RepoError> {
    ships
        .get(id)
        .await?
        .ok_or_else(|| RepoError::not_found("Ship", id))
}

/// Load a contact, treating one from another campaign as missing.
pub(crate) async fn load_contact(
    contacts: &dyn ContactRepo,
    campaign_id: CampaignId,
    id: ContactId,
) -> Result<Contact, RepoError> {
    contacts
        .get(id)
        .await?
        .filter(|contact| contact.campaign_id == campaign_id)
        .ok_or_else(|| RepoError::not_found("Contact", id))
}
