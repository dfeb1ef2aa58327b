//! Shared vocabulary types.
//!
//! Plain enums used by entities and by the wire protocol alike. No I/O.

mod crew_role;
pub use crew_role::CrewRole;

mod sensors;
pub use sensors::{ContactKind, Disposition, RangeBand, ScanLevel};

mod ship_systems;
pub use ship_systems::{AlertStatus, ShipSystem, SystemStatus, WeaponsMode};
