//! Order entity - a captain-issued directive to one station or the whole crew.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CampaignTime, CrewRole, DomainError, OrderId, ShipId};

/// Command log length per ship. Oldest orders are evicted past this.
pub const MAX_ORDERS_PER_SHIP: usize = 50;

/// Who an order is addressed to. Serialized as `"all"` or a role name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrderTarget {
    All,
    Role(CrewRole),
}

impl OrderTarget {
    /// Whether a crew member at `role` may acknowledge.
    pub fn addresses(&self, role: Option<CrewRole>) -> bool {
        match self {
            OrderTarget::All => role.is_some(),
            OrderTarget::Role(target) => role == Some(*target),
        }
    }
}

impl fmt::Display for OrderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderTarget::All => f.write_str("all"),
            OrderTarget::Role(role) => f.write_str(role.as_str()),
        }
    }
}

impl FromStr for OrderTarget {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(OrderTarget::All);
        }
        s.parse::<CrewRole>().map(OrderTarget::Role)
    }
}

impl TryFrom<String> for OrderTarget {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderTarget> for String {
    fn from(value: OrderTarget) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub ship_id: ShipId,
    pub target: OrderTarget,
    pub text: String,
    pub requires_ack: bool,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub acknowledged_by: Option<String>,
    #[serde(default)]
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub issued_at: DateTime<Utc>,
    pub game_time: CampaignTime,
}

impl Order {
    pub fn new(
        ship_id: ShipId,
        target: OrderTarget,
        text: impl Into<String>,
        requires_ack: bool,
        issued_at: DateTime<Utc>,
        game_time: CampaignTime,
    ) -> Result<Self, DomainError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(DomainError::validation("Order text cannot be empty"));
        }
        Ok(Self {
            id: OrderId::new(),
            ship_id,
            target,
            text,
            requires_ack,
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            issued_at,
            game_time,
        })
    }

    /// Whether `role` (or the GM) is allowed to acknowledge this order.
    pub fn can_acknowledge(&self, role: Option<CrewRole>, is_gm: bool) -> bool {
        is_gm || self.target.addresses(role)
    }

    /// One-way transition to acknowledged. A repeat call changes nothing
    /// and returns `false`.
    pub fn acknowledge(&mut self, by: impl Into<String>, at: DateTime<Utc>) -> bool {
        if self.acknowledged {
            return false;
        }
        self.acknowledged = true;
        self.acknowledged_by = Some(by.into());
        self.acknowledged_at = Some(at);
        true
    }
}
