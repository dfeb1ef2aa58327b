//! Repository port traits for the state store.
//!
//! Every handler reads current records, computes the new value, and writes it
//! back through these traits. Single-record writes go straight to their repo.
//! A command that touches several records hands them to [`UnitOfWork::commit`]
//! so they land together or not at all. The per-campaign command lock in the
//! WebSocket layer keeps read-modify-write sequences from interleaving.

use async_trait::async_trait;
use starbridge_domain::*;

use super::error::RepoError;

// =============================================================================
// Campaign & Ship
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepo: Send + Sync {
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError>;
    async fn save(&self, campaign: &Campaign) -> Result<(), RepoError>;
    /// All campaigns, oldest first.
    async fn list(&self) -> Result<Vec<Campaign>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShipRepo: Send + Sync {
    async fn get(&self, id: ShipId) -> Result<Option<Ship>, RepoError>;
    async fn save(&self, ship: &Ship) -> Result<(), RepoError>;
    async fn list_in_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Ship>, RepoError>;
}

// =============================================================================
// Sensors
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepo: Send + Sync {
    async fn get(&self, id: ContactId) -> Result<Option<Contact>, RepoError>;
    async fn save(&self, contact: &Contact) -> Result<(), RepoError>;
    async fn delete(&self, id: ContactId) -> Result<(), RepoError>;
    async fn list_in_campaign(&self, campaign_id: CampaignId)
        -> Result<Vec<Contact>, RepoError>;
}

// =============================================================================
// Captain & Comms
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepo: Send + Sync {
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepoError>;
    async fn save(&self, order: &Order) -> Result<(), RepoError>;
    /// Orders for a ship in the order they were issued.
    async fn list_for_ship(&self, ship_id: ShipId) -> Result<Vec<Order>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransmissionRepo: Send + Sync {
    async fn get(&self, id: TransmissionId) -> Result<Option<Transmission>, RepoError>;
    async fn save(&self, transmission: &Transmission) -> Result<(), RepoError>;
    async fn list_in_campaign(
        &self,
        campaign_id: CampaignId,
        include_archived: bool,
    ) -> Result<Vec<Transmission>, RepoError>;
}

// =============================================================================
// Fuel
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FuelSourceRepo: Send + Sync {
    async fn get(&self, id: FuelSourceId) -> Result<Option<FuelSource>, RepoError>;
    async fn save(&self, source: &FuelSource) -> Result<(), RepoError>;
    async fn list_in_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<FuelSource>, RepoError>;
}

// =============================================================================
// Ship Log
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShipLogRepo: Send + Sync {
    async fn append(&self, entry: &ShipLogEntry) -> Result<(), RepoError>;
    /// The most recent `limit` entries, in chronological order.
    async fn list_for_ship(
        &self,
        ship_id: ShipId,
        limit: u32,
    ) -> Result<Vec<ShipLogEntry>, RepoError>;
}

// =============================================================================
// Library
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryRepo: Send + Sync {
    async fn save(&self, entry: &LibraryEntry) -> Result<(), RepoError>;
    async fn count(&self) -> Result<u64, RepoError>;
    /// Case-insensitive substring match over title, category and body.
    async fn search(
        &self,
        query: &LibraryQuery,
        limit: u32,
    ) -> Result<Vec<LibraryEntry>, RepoError>;
}

// =============================================================================
// Unit of work
// =============================================================================

/// One record write inside a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Campaign(Campaign),
    Ship(Ship),
    Contact(Contact),
    RemoveContact(ContactId),
    Order(Order),
    RemoveOrder(OrderId),
    FuelSource(FuelSource),
    LogEntry(ShipLogEntry),
}

/// Writes applied in order, all or nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Apply every change in one transaction. On error nothing is written.
    async fn commit(&self, changes: ChangeSet) -> Result<(), RepoError>;
}
