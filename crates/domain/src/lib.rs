//! Starbridge domain: ships, crews and the rules that bind them.
//!
//! Pure types and rule functions. Nothing here touches I/O; randomness and
//! wall-clock time are passed in by the caller.

extern crate self as starbridge_domain;

pub mod authorization;
pub mod entities;
pub mod error;
pub mod game_time;
pub mod ids;
pub mod types;
pub mod value_objects;

pub use authorization::{
    can_perform, ActionKind, Actor, AllowedRoles, Denied, IdentityRequirement, Subsystem,
};

pub use entities::{
    default_library, Campaign, Contact, FuelSource, FuelSourceKind, Hull, JumpPlan, LibraryEntry,
    LibraryQuery, Location, LogEntryKind, ManeuverDirection, MapPoint, MapView, NewTransmission,
    Order, OrderTarget, PlayerSlot, Ship, ShipLogEntry, Transmission, TransmissionPriority,
    BRIDGE_CHANNEL, MAX_LIBRARY_RESULTS, MAX_ORDERS_PER_SHIP, MIN_QUERY_LEN,
};

pub use error::DomainError;

pub use game_time::CampaignTime;

pub use ids::{
    CampaignId, ConnectionId, ContactId, FuelSourceId, LibraryEntryId, LogEntryId, OrderId,
    PlayerSlotId, ShipId, TransmissionId,
};

pub use types::{
    AlertStatus, ContactKind, CrewRole, Disposition, RangeBand, ScanLevel, ShipSystem,
    SystemStatus, WeaponsMode,
};

pub use value_objects::{
    damage_total, jump_fuel_per_parsec, skill_check, CheckResult, FuelGrade, FuelProcessing,
    FuelState, PowerAllocation, PowerPreset, ProcessingProgress, ShipTemplate, SystemHealth,
    SystemsTable, TemplateStats, Turret, Weapon, WeaponKind, FUEL_PROCESSING_TONS_PER_HOUR,
    JUMP_FUEL_PERCENT, MAX_ALLOCATION, MAX_SYSTEM_HEALTH, STANDARD_TARGET,
};
