//! Value objects - immutable data defined by their attributes

mod dice;
mod fuel;
mod power;
mod ship_template;
mod systems;
mod weapons;

pub use dice::{damage_total, skill_check, CheckResult, STANDARD_TARGET};
pub use fuel::{
    jump_fuel_per_parsec, FuelGrade, FuelProcessing, FuelState, ProcessingProgress,
    FUEL_PROCESSING_TONS_PER_HOUR, JUMP_FUEL_PERCENT,
};
pub use power::{PowerAllocation, PowerPreset, MAX_ALLOCATION};
pub use ship_template::{ShipTemplate, TemplateStats};
pub use systems::{SystemHealth, SystemsTable, MAX_SYSTEM_HEALTH};
pub use weapons::{Turret, Weapon, WeaponKind};
