//! Room router - topic membership for scoped broadcasts.

use std::collections::{HashMap, HashSet};
use std::fmt;

use starbridge_domain::{CampaignId, ConnectionId, ShipId};

/// A broadcast audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Everyone joined to the campaign, GM included.
    Campaign(CampaignId),
    /// Everyone currently crewing the ship.
    Bridge(ShipId),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Campaign(id) => write!(f, "campaign:{id}"),
            Topic::Bridge(id) => write!(f, "bridge:{id}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct RoomRouter {
    members: HashMap<Topic, HashSet<ConnectionId>>,
    memberships: HashMap<ConnectionId, HashSet<Topic>>,
}

impl RoomRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the connection was already a member.
    pub fn join(&mut self, connection_id: ConnectionId, topic: Topic) -> bool {
        let added = self.members.entry(topic).or_default().insert(connection_id);
        self.memberships
            .entry(connection_id)
            .or_default()
            .insert(topic);
        if added {
            tracing::debug!(connection_id = %connection_id, topic = %topic, "Joined topic");
        }
        added
    }

    pub fn leave(&mut self, connection_id: ConnectionId, topic: Topic) -> bool {
        let removed = match self.members.get_mut(&topic) {
            Some(members) => {
                let removed = members.remove(&connection_id);
                if members.is_empty() {
                    self.members.remove(&topic);
                }
                removed
            }
            None => false,
        };
        if let Some(topics) = self.memberships.get_mut(&connection_id) {
            topics.remove(&topic);
            if topics.is_empty() {
                self.memberships.remove(&connection_id);
            }
        }
        if removed {
            tracing::debug!(connection_id = %connection_id, topic = %topic, "Left topic");
        }
        removed
    }

    pub fn members_of(&self, topic: Topic) -> HashSet<ConnectionId> {
        self.members.get(&topic).cloned().unwrap_or_default()
    }

    pub fn topics_of(&self, connection_id: ConnectionId) -> HashSet<Topic> {
        self.memberships
            .get(&connection_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Leave every topic. Used on disconnect.
    pub fn leave_all(&mut self, connection_id: ConnectionId) {
        for topic in self.topics_of(connection_id) {
            self.leave(connection_id, topic);
        }
    }

    /// Make the connection's memberships exactly `wanted`.
    pub fn sync(&mut self, connection_id: ConnectionId, wanted: &[Topic]) {
        for topic in self.topics_of(connection_id) {
            if !wanted.contains(&topic) {
                self.leave(connection_id, topic);
            }
        }
        for topic in wanted {
            self.join(connection_id, *topic);
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.memberships.clear();
    }
}
