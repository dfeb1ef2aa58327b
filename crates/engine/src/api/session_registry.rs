//! Session registry - who each live connection is.
//!
//! A session is assembled in steps (campaign join, role selection, bridge
//! join) and thrown away on disconnect. Nothing here is persisted.

use std::collections::HashMap;

use starbridge_domain::{Actor, CampaignId, ConnectionId, CrewRole, PlayerSlotId, ShipId};
use starbridge_shared::CrewMember;

/// Identity of one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub campaign_id: Option<CampaignId>,
    pub ship_id: Option<ShipId>,
    pub role: Option<CrewRole>,
    pub is_gm: bool,
    pub slot_id: Option<PlayerSlotId>,
    pub display_name: Option<String>,
}

impl Session {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            campaign_id: None,
            ship_id: None,
            role: None,
            is_gm: false,
            slot_id: None,
            display_name: None,
        }
    }

    pub fn actor(&self) -> Actor {
        Actor {
            role: self.role,
            is_gm: self.is_gm,
        }
    }

    /// Name used when attributing log entries and transmissions.
    pub fn label(&self) -> String {
        if let Some(name) = &self.display_name {
            return name.clone();
        }
        match (self.is_gm, self.role) {
            (_, Some(role)) => role.display_name().to_string(),
            (true, None) => "GM".to_string(),
            (false, None) => "Crew".to_string(),
        }
    }

    pub fn crew_member(&self) -> CrewMember {
        CrewMember {
            connection_id: self.connection_id,
            is_gm: self.is_gm,
            slot_id: self.slot_id,
            name: self.display_name.clone(),
            ship_id: self.ship_id,
            role: self.role,
        }
    }

    /// Merge a patch, then drop anything left without its prerequisites.
    pub fn apply(&mut self, patch: SessionPatch) {
        patch.campaign_id.apply(&mut self.campaign_id);
        patch.ship_id.apply(&mut self.ship_id);
        patch.role.apply(&mut self.role);
        patch.slot_id.apply(&mut self.slot_id);
        patch.display_name.apply(&mut self.display_name);
        if let Some(is_gm) = patch.is_gm {
            self.is_gm = is_gm;
        }
        self.normalize();
    }

    /// Drop fields whose prerequisites are missing: a role needs a ship and a
    /// ship needs a campaign.
    fn normalize(&mut self) {
        if self.campaign_id.is_none() {
            if self.ship_id.is_some() || self.is_gm || self.slot_id.is_some() {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    "Dropping campaign-scoped identity without a campaign"
                );
            }
            self.ship_id = None;
            self.is_gm = false;
            self.slot_id = None;
        }
        if self.ship_id.is_none() && self.role.is_some() {
            tracing::warn!(
                connection_id = %self.connection_id,
                role = ?self.role,
                "Dropping crew role without a ship"
            );
            self.role = None;
        }
    }
}

/// One field of a [`SessionPatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    fn apply(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Set(value) => *slot = Some(value),
            Patch::Clear => *slot = None,
        }
    }

    fn from_option(value: Option<T>) -> Self {
        value.map_or(Patch::Clear, Patch::Set)
    }
}

/// Partial identity merged into a session. Untouched fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub campaign_id: Patch<CampaignId>,
    pub ship_id: Patch<ShipId>,
    pub role: Patch<CrewRole>,
    pub is_gm: Option<bool>,
    pub slot_id: Patch<PlayerSlotId>,
    pub display_name: Patch<String>,
}

impl SessionPatch {
    /// Clears every field.
    pub fn reset() -> Self {
        Self {
            campaign_id: Patch::Clear,
            ship_id: Patch::Clear,
            role: Patch::Clear,
            is_gm: Some(false),
            slot_id: Patch::Clear,
            display_name: Patch::Clear,
        }
    }

    pub fn campaign(mut self, id: CampaignId) -> Self {
        self.campaign_id = Patch::Set(id);
        self
    }

    pub fn ship(mut self, id: ShipId) -> Self {
        self.ship_id = Patch::Set(id);
        self
    }

    pub fn clear_ship(mut self) -> Self {
        self.ship_id = Patch::Clear;
        self
    }

    pub fn role(mut self, role: CrewRole) -> Self {
        self.role = Patch::Set(role);
        self
    }

    pub fn clear_role(mut self) -> Self {
        self.role = Patch::Clear;
        self
    }

    pub fn gm(mut self, is_gm: bool) -> Self {
        self.is_gm = Some(is_gm);
        self
    }

    pub fn slot(mut self, slot_id: Option<PlayerSlotId>) -> Self {
        self.slot_id = Patch::from_option(slot_id);
        self
    }

    pub fn name(mut self, name: Option<String>) -> Self {
        self.display_name = Patch::from_option(name);
        self
    }
}

/// In-memory map from connection to session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty session for a freshly opened connection.
    pub fn open(&mut self, connection_id: ConnectionId) {
        self.sessions
            .entry(connection_id)
            .or_insert_with(|| Session::new(connection_id));
    }

    /// Merge `patch` into the session, creating it if needed. Always succeeds.
    pub fn bind(&mut self, connection_id: ConnectionId, patch: SessionPatch) -> Session {
        let session = self
            .sessions
            .entry(connection_id)
            .or_insert_with(|| Session::new(connection_id));
        session.apply(patch);

        tracing::debug!(
            connection_id = %connection_id,
            campaign_id = ?session.campaign_id,
            ship_id = ?session.ship_id,
            role = ?session.role,
            is_gm = session.is_gm,
            "Session bound"
        );
        session.clone()
    }

    pub fn resolve(&self, connection_id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&connection_id)
    }

    pub fn release(&mut self, connection_id: ConnectionId) -> Option<Session> {
        self.sessions.remove(&connection_id)
    }

    pub fn in_campaign(&self, campaign_id: CampaignId) -> impl Iterator<Item = &Session> + '_ {
        self.sessions
            .values()
            .filter(move |s| s.campaign_id == Some(campaign_id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
