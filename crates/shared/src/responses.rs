//! Response-side shapes shared by several server messages.

use serde::{Deserialize, Serialize};
use starbridge_domain::{Campaign, CampaignId, ConnectionId, CrewRole, PlayerSlotId, ShipId};

// =============================================================================
// Error Codes
// =============================================================================

/// Error classification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // === Client Errors ===
    /// Request was malformed or invalid
    BadRequest,
    /// Session has not completed the join step the action needs
    NotJoined,
    /// User lacks permission for this operation
    Forbidden,
    /// Requested resource not found
    NotFound,
    /// Operation conflicts with current state
    Conflict,
    /// Request data failed validation
    ValidationError,
    /// A game rule blocked the action (fuel, range, destroyed system...)
    PreconditionFailed,

    // === Server Errors ===
    /// Internal server error
    InternalError,
    /// Required service is unavailable
    ServiceUnavailable,

    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    /// Whether the client can fix this by changing its request.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            ErrorCode::InternalError | ErrorCode::ServiceUnavailable | ErrorCode::Unknown
        )
    }
}

// =============================================================================
// Session Types
// =============================================================================

/// One connected member of a campaign as shown on crew rosters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
    pub connection_id: ConnectionId,
    pub is_gm: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<PlayerSlotId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_id: Option<ShipId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<CrewRole>,
}

/// Lightweight campaign listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub id: CampaignId,
    pub name: String,
    pub gm_name: String,
    /// Imperial date, `YYYY-DDD HH:MM`.
    pub date: String,
}

impl From<&Campaign> for CampaignSummary {
    fn from(campaign: &Campaign) -> Self {
        Self {
            id: campaign.id,
            name: campaign.name.clone(),
            gm_name: campaign.gm_name.clone(),
            date: campaign.current_time.display(),
        }
    }
}
