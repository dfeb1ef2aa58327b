//! Entities - records with identity that live in the state store.

mod campaign;
mod contact;
mod fuel_source;
mod library;
mod order;
mod ship;
mod ship_log;
mod transmission;

pub use campaign::{Campaign, Location, MapPoint, MapView, PlayerSlot};
pub use contact::{Contact, ManeuverDirection};
pub use fuel_source::{FuelSource, FuelSourceKind};
pub use library::{
    default_library, LibraryEntry, LibraryQuery, MAX_LIBRARY_RESULTS, MIN_QUERY_LEN,
};
pub use order::{Order, OrderTarget, MAX_ORDERS_PER_SHIP};
pub use ship::{Hull, JumpPlan, Ship};
pub use ship_log::{LogEntryKind, ShipLogEntry};
pub use transmission::{NewTransmission, Transmission, TransmissionPriority, BRIDGE_CHANNEL};
