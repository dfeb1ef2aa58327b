//! Starbridge Protocol - wire types shared by the server and browser clients
//!
//! - WebSocket message types (`ClientMessage`, `ServerMessage`)
//! - Error codes and roster/listing shapes
//!
//! Payloads reuse the domain's serde representations directly, so a ship or
//! contact on the wire has exactly the shape it has in the state store.

pub mod messages;
pub mod responses;

pub use messages::{ClientMessage, ServerMessage};
pub use responses::{CampaignSummary, CrewMember, ErrorCode};
