//! Outbound deliveries produced by a command.
//!
//! Handlers never send directly. They return a [`CommandOutcome`] listing
//! what goes to whom, and the connection manager delivers it once the
//! command has committed.

use starbridge_domain::{CampaignId, ConnectionId, ShipId};
use starbridge_shared::ServerMessage;

/// Audience of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only this connection.
    Connection(ConnectionId),
    /// `bridge:{ship}` members.
    Bridge(ShipId),
    /// `campaign:{id}` members.
    Campaign(CampaignId),
    /// GM sessions of the campaign.
    CampaignGm(CampaignId),
}

#[derive(Debug, Clone)]
pub struct Delivery {
    pub scope: Scope,
    pub message: ServerMessage,
}

/// Everything one command sends, in order.
#[derive(Debug, Clone, Default)]
pub struct CommandOutcome {
    deliveries: Vec<Delivery>,
}

impl CommandOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, scope: Scope, message: ServerMessage) -> Self {
        self.push(scope, message);
        self
    }

    pub fn reply(connection_id: ConnectionId, message: ServerMessage) -> Self {
        Self::new().to(Scope::Connection(connection_id), message)
    }

    pub fn bridge(ship_id: ShipId, message: ServerMessage) -> Self {
        Self::new().to(Scope::Bridge(ship_id), message)
    }

    pub fn campaign(campaign_id: CampaignId, message: ServerMessage) -> Self {
        Self::new().to(Scope::Campaign(campaign_id), message)
    }

    pub fn push(&mut self, scope: Scope, message: ServerMessage) {
        self.deliveries.push(Delivery { scope, message });
    }

    pub fn extend(&mut self, other: CommandOutcome) {
        self.deliveries.extend(other.deliveries);
    }

    pub fn into_deliveries(self) -> Vec<Delivery> {
        self.deliveries
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}
