//! Connection management for WebSocket clients.
//!
//! Owns the session registry, the room router and each connection's
//! outbound channel behind one lock, so topic membership always matches the
//! session it was derived from.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use starbridge_domain::{CampaignId, ConnectionId, CrewRole};
use starbridge_shared::{CrewMember, ServerMessage};

use super::broadcast::{CommandOutcome, Scope};
use super::rooms::{RoomRouter, Topic};
use super::session_registry::{Session, SessionPatch, SessionRegistry};

#[derive(Default)]
struct Inner {
    registry: SessionRegistry,
    router: RoomRouter,
    senders: HashMap<ConnectionId, mpsc::Sender<ServerMessage>>,
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    inner: RwLock<Inner>,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register a new connection with an empty session.
    pub async fn register(&self, connection_id: ConnectionId, sender: mpsc::Sender<ServerMessage>) {
        let mut inner = self.inner.write().await;
        inner.registry.open(connection_id);
        inner.senders.insert(connection_id, sender);
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection. Returns the session it had.
    pub async fn unregister(&self, connection_id: ConnectionId) -> Option<Session> {
        let mut inner = self.inner.write().await;
        inner.router.leave_all(connection_id);
        inner.senders.remove(&connection_id);
        let session = inner.registry.release(connection_id);
        if session.is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
        session
    }

    pub async fn session(&self, connection_id: ConnectionId) -> Option<Session> {
        let inner = self.inner.read().await;
        inner.registry.resolve(connection_id).cloned()
    }

    /// Merge identity into a session, enforcing the per-campaign seats:
    /// one GM, one session per player slot, one holder per single-seat role.
    pub async fn bind(
        &self,
        connection_id: ConnectionId,
        patch: SessionPatch,
    ) -> Result<Session, ConnectionError> {
        let mut inner = self.inner.write().await;
        let mut next = inner
            .registry
            .resolve(connection_id)
            .cloned()
            .ok_or(ConnectionError::NotFound)?;
        next.apply(patch.clone());

        if let Some(campaign_id) = next.campaign_id {
            for other in inner
                .registry
                .in_campaign(campaign_id)
                .filter(|s| s.connection_id != connection_id)
            {
                if next.is_gm && other.is_gm {
                    return Err(ConnectionError::GmAlreadyConnected);
                }
                if next.slot_id.is_some() && other.slot_id == next.slot_id {
                    return Err(ConnectionError::SlotTaken);
                }
                if let (Some(ship_id), Some(role)) = (next.ship_id, next.role) {
                    if !role.allows_multiple()
                        && other.ship_id == Some(ship_id)
                        && other.role == Some(role)
                    {
                        return Err(ConnectionError::RoleTaken(role));
                    }
                }
            }
        }

        let session = inner.registry.bind(connection_id, patch);
        let mut topics = Vec::with_capacity(2);
        if let Some(campaign_id) = session.campaign_id {
            topics.push(Topic::Campaign(campaign_id));
        }
        if let Some(ship_id) = session.ship_id {
            topics.push(Topic::Bridge(ship_id));
        }
        inner.router.sync(connection_id, &topics);
        Ok(session)
    }

    /// Roster of a campaign: GM first, then by station.
    pub async fn crew_of(&self, campaign_id: CampaignId) -> Vec<CrewMember> {
        let inner = self.inner.read().await;
        let mut crew: Vec<CrewMember> = inner
            .registry
            .in_campaign(campaign_id)
            .map(Session::crew_member)
            .collect();
        crew.sort_by_key(|m| (!m.is_gm, m.role, m.connection_id));
        crew
    }

    /// Deliver every message of an outcome to its audience as it stands now.
    ///
    /// Fire-and-forget: a full or closed channel drops the message with a warning.
    pub async fn deliver(&self, outcome: CommandOutcome) {
        if outcome.is_empty() {
            return;
        }
        let inner = self.inner.read().await;
        for delivery in outcome.into_deliveries() {
            let recipients: Vec<ConnectionId> = match delivery.scope {
                Scope::Connection(id) => vec![id],
                Scope::Bridge(ship_id) => {
                    inner.router.members_of(Topic::Bridge(ship_id)).into_iter().collect()
                }
                Scope::Campaign(campaign_id) => inner
                    .router
                    .members_of(Topic::Campaign(campaign_id))
                    .into_iter()
                    .collect(),
                Scope::CampaignGm(campaign_id) => inner
                    .registry
                    .in_campaign(campaign_id)
                    .filter(|s| s.is_gm)
                    .map(|s| s.connection_id)
                    .collect(),
            };
            for connection_id in recipients {
                inner.send(connection_id, delivery.message.clone());
            }
        }
    }

    /// Send one message to one connection.
    pub async fn send_to(&self, connection_id: ConnectionId, message: ServerMessage) {
        let inner = self.inner.read().await;
        inner.send(connection_id, message);
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.senders.len()
    }

    /// Drop every session, topic and sender. Send tasks end once their
    /// channel closes.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.write().await;
        let connections = inner.senders.len();
        let sessions = inner.registry.len();
        inner.senders.clear();
        inner.router.clear();
        inner.registry.clear();
        tracing::info!(connections, sessions, "Connection manager shut down");
    }
}

impl Inner {
    fn send(&self, connection_id: ConnectionId, message: ServerMessage) {
        let Some(sender) = self.senders.get(&connection_id) else {
            tracing::debug!(connection_id = %connection_id, "No open channel for recipient");
            return;
        };
        if let Err(e) = sender.try_send(message) {
            tracing::warn!(
                connection_id = %connection_id,
                error = %e,
                "Failed to deliver message"
            );
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during connection operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    #[error("Connection not found")]
    NotFound,
    #[error("Campaign already has a GM connected")]
    GmAlreadyConnected,
    #[error("That player slot is already in use")]
    SlotTaken,
    #[error("The {} station is already taken", .0.display_name())]
    RoleTaken(CrewRole),
}
