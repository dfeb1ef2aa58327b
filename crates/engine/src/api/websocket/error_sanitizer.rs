//! Error sanitization for client-facing messages.
//!
//! Every handler returns [`CommandError`]. User errors keep their reason;
//! internal failures are logged in full and reach the client only as a
//! subsystem-tagged generic message.

use starbridge_domain::{DomainError, Subsystem};
use starbridge_shared::{ErrorCode, ServerMessage};

use crate::api::connections::ConnectionError;
use crate::infrastructure::correlation::CorrelationId;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::{
    CampaignError, CommsError, FuelError, LibraryError, MapError, NavigationError, OrdersError,
    PowerError, RepairsError, SensorsError, WeaponsError,
};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of one inbound command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Session has not reached the scope the action needs.
    #[error("{0}")]
    Identity(String),
    /// Role not permitted.
    #[error("{0}")]
    Forbidden(String),
    /// A game rule refused the action. State is unchanged.
    #[error("{message}")]
    Precondition { code: ErrorCode, message: String },
    /// Storage or other unexpected failure.
    #[error("{subsystem} failure: {source}")]
    Internal {
        subsystem: Subsystem,
        #[source]
        source: BoxedError,
    },
}

impl CommandError {
    pub fn precondition(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Precondition {
            code,
            message: message.into(),
        }
    }

    pub fn internal(subsystem: Subsystem, source: impl Into<BoxedError>) -> Self {
        Self::Internal {
            subsystem,
            source: source.into(),
        }
    }

    pub fn from_rule(error: DomainError) -> Self {
        let code = match &error {
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::Parse(_) => ErrorCode::BadRequest,
            DomainError::NotFound { .. } => ErrorCode::NotFound,
            DomainError::Constraint(_) | DomainError::CapacityExceeded { .. } => {
                ErrorCode::PreconditionFailed
            }
        };
        Self::precondition(code, error.reason())
    }

    /// A missing record is the client's problem; anything else is ours.
    pub fn from_repo(subsystem: Subsystem, error: RepoError) -> Self {
        match error {
            RepoError::NotFound { entity_type, .. } => {
                Self::precondition(ErrorCode::NotFound, format!("{entity_type} not found"))
            }
            other => Self::internal(subsystem, other),
        }
    }

    pub fn from_campaign(subsystem: Subsystem, error: CampaignError) -> Self {
        match error {
            CampaignError::Rule(e) => Self::from_rule(e),
            CampaignError::ShipNotInCampaign => {
                Self::Forbidden(CampaignError::ShipNotInCampaign.to_string())
            }
            CampaignError::Repo(e) => Self::from_repo(subsystem, e),
        }
    }

    /// Convert into the envelope sent to the requesting connection.
    ///
    /// `action` names the inbound event for the server-side log only.
    pub fn into_client_message(self, action: &str) -> ServerMessage {
        match self {
            CommandError::Identity(message) => ServerMessage::error(ErrorCode::NotJoined, message),
            CommandError::Forbidden(message) => ServerMessage::error(ErrorCode::Forbidden, message),
            CommandError::Precondition { code, message } => ServerMessage::error(code, message),
            CommandError::Internal { subsystem, source } => {
                let correlation_id = CorrelationId::new();
                tracing::error!(
                    error = %source,
                    action = action,
                    subsystem = %subsystem,
                    correlation_id = %correlation_id,
                    correlation_id_short = %correlation_id.short(),
                    "Command failed with internal error"
                );
                ServerMessage::Error {
                    code: ErrorCode::InternalError,
                    message: format!(
                        "{subsystem} operation failed - please try again (ref {})",
                        correlation_id.short()
                    ),
                    subsystem: Some(subsystem.display_name().to_string()),
                }
            }
        }
    }
}

impl From<CampaignError> for CommandError {
    fn from(error: CampaignError) -> Self {
        Self::from_campaign(Subsystem::Campaign, error)
    }
}

impl From<MapError> for CommandError {
    fn from(error: MapError) -> Self {
        match error {
            MapError::Rule(e) => Self::from_rule(e),
            MapError::NotShared => {
                Self::precondition(ErrorCode::PreconditionFailed, MapError::NotShared.to_string())
            }
            MapError::Repo(e) => Self::from_repo(Subsystem::Map, e),
        }
    }
}

impl From<FuelError> for CommandError {
    fn from(error: FuelError) -> Self {
        match error {
            FuelError::Rule(e) => Self::from_rule(e),
            FuelError::NothingToTransfer => Self::precondition(
                ErrorCode::PreconditionFailed,
                FuelError::NothingToTransfer.to_string(),
            ),
            FuelError::Repo(e) => Self::from_repo(Subsystem::Fuel, e),
        }
    }
}

impl From<NavigationError> for CommandError {
    fn from(error: NavigationError) -> Self {
        match error {
            NavigationError::Rule(e) => Self::from_rule(e),
            NavigationError::Repo(e) => Self::from_repo(Subsystem::Navigation, e),
        }
    }
}

impl From<PowerError> for CommandError {
    fn from(error: PowerError) -> Self {
        match error {
            PowerError::Rule(e) => Self::from_rule(e),
            PowerError::Repo(e) => Self::from_repo(Subsystem::Power, e),
        }
    }
}

impl From<WeaponsError> for CommandError {
    fn from(error: WeaponsError) -> Self {
        match error {
            WeaponsError::Rule(e) => Self::from_rule(e),
            WeaponsError::RoeDenied(reason) => Self::Forbidden(reason),
            WeaponsError::Repo(e) => Self::from_repo(Subsystem::Weapons, e),
        }
    }
}

impl From<OrdersError> for CommandError {
    fn from(error: OrdersError) -> Self {
        match error {
            OrdersError::Rule(e) => Self::from_rule(e),
            OrdersError::NotAddressee => Self::Forbidden(OrdersError::NotAddressee.to_string()),
            OrdersError::Repo(e) => Self::from_repo(Subsystem::Orders, e),
        }
    }
}

impl From<CommsError> for CommandError {
    fn from(error: CommsError) -> Self {
        match error {
            CommsError::Rule(e) => Self::from_rule(e),
            CommsError::Repo(e) => Self::from_repo(Subsystem::Comms, e),
        }
    }
}

impl From<SensorsError> for CommandError {
    fn from(error: SensorsError) -> Self {
        match error {
            SensorsError::Rule(e) => Self::from_rule(e),
            SensorsError::Repo(e) => Self::from_repo(Subsystem::Sensors, e),
        }
    }
}

impl From<RepairsError> for CommandError {
    fn from(error: RepairsError) -> Self {
        match error {
            RepairsError::Rule(e) => Self::from_rule(e),
            RepairsError::Repo(e) => Self::from_repo(Subsystem::Repairs, e),
        }
    }
}

impl From<LibraryError> for CommandError {
    fn from(error: LibraryError) -> Self {
        match error {
            LibraryError::Rule(e) => Self::from_rule(e),
            LibraryError::Repo(e) => Self::from_repo(Subsystem::Library, e),
        }
    }
}

impl From<ConnectionError> for CommandError {
    fn from(error: ConnectionError) -> Self {
        match error {
            ConnectionError::NotFound => Self::Identity(error.to_string()),
            ConnectionError::GmAlreadyConnected
            | ConnectionError::SlotTaken
            | ConnectionError::RoleTaken(_) => {
                Self::precondition(ErrorCode::Conflict, error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starbridge_domain::CrewRole;

    fn unpack(message: ServerMessage) -> (ErrorCode, String, Option<String>) {
        match message {
            ServerMessage::Error {
                code,
                message,
                subsystem,
            } => (code, message, subsystem),
            other => panic!("expected error envelope, got {other:?}"),
        }
    }

    #[test]
    fn storage_failures_never_reach_the_client() {
        let err = CommandError::from(FuelError::Repo(RepoError::database(
            "save",
            "disk I/O error at /var/lib/starbridge.db",
        )));
        let (code, message, subsystem) = unpack(err.into_client_message("refuel"));

        assert_eq!(code, ErrorCode::InternalError);
        assert!(message.starts_with("Fuel operation failed - please try again (ref "));
        assert!(!message.contains("disk"));
        assert_eq!(subsystem.as_deref(), Some("Fuel"));
    }

    #[test]
    fn missing_records_are_reported_as_not_found() {
        let err = CommandError::from(SensorsError::Repo(RepoError::not_found("Contact", "c-9")));
        let (code, message, subsystem) = unpack(err.into_client_message("scanContact"));
        assert_eq!(code, ErrorCode::NotFound);
        assert_eq!(message, "Contact not found");
        assert_eq!(subsystem, None);
    }

    #[test]
    fn domain_rules_keep_their_reason() {
        let err = CommandError::from(FuelError::Rule(DomainError::CapacityExceeded {
            requested: 25,
            free: 20,
        }));
        let (code, message, _) = unpack(err.into_client_message("refuel"));
        assert_eq!(code, ErrorCode::PreconditionFailed);
        assert_eq!(
            message,
            "Insufficient tank capacity: requested 25 tons but only 20 tons free"
        );
    }

    #[test]
    fn roe_refusal_is_forbidden_and_seat_conflicts_are_conflicts() {
        let err = CommandError::from(WeaponsError::RoeDenied("Weapons are on hold".into()));
        assert_eq!(
            unpack(err.into_client_message("fire")).0,
            ErrorCode::Forbidden
        );

        let err = CommandError::from(ConnectionError::RoleTaken(CrewRole::Pilot));
        let (code, message, _) = unpack(err.into_client_message("selectRole"));
        assert_eq!(code, ErrorCode::Conflict);
        assert_eq!(message, "The pilot station is already taken");
    }

    #[test]
    fn identity_errors_ask_the_client_to_finish_joining() {
        let err = CommandError::Identity("Not on a ship".into());
        let (code, message, _) = unpack(err.into_client_message("getFuelStatus"));
        assert_eq!(code, ErrorCode::NotJoined);
        assert_eq!(message, "Not on a ship");
    }
}
