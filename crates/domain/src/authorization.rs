//! Declarative permission table for every crew action.
//!
//! Each [`ActionKind`] maps to the set of crew roles allowed to perform it.
//! The GM may perform every action. Handlers never check roles themselves;
//! they ask [`can_perform`] and surface the deny reason verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CrewRole;

/// Every role-scoped action a connected client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    // Campaign
    AdvanceTime,
    SetLocation,
    AddPlayerSlot,
    AddShip,
    GetShipLog,
    // Fuel
    GetFuelStatus,
    GetFuelSources,
    AddFuelSource,
    Refuel,
    StartFuelProcessing,
    CheckFuelProcessing,
    // Navigation
    PlotJump,
    Jump,
    Maneuver,
    // Power
    SetPower,
    ApplyPowerPreset,
    // Weapons
    SetWeaponsMode,
    Fire,
    EndTurn,
    // Captain
    IssueOrder,
    AcknowledgeOrder,
    GetOrders,
    SetAlertStatus,
    // Comms
    SendTransmission,
    GetTransmissions,
    MarkTransmissionRead,
    ArchiveTransmission,
    // Sensors
    GetContacts,
    ScanContact,
    MarkContact,
    SpawnContact,
    RemoveContact,
    ResetScan,
    SetContactTargetable,
    // Repairs
    RepairSystem,
    DamageSystem,
    ApplyHullDamage,
    // Map
    ShareMap,
    UnshareMap,
    UpdateMapView,
    // Library
    LibrarySearch,
}

/// Handler family an action belongs to. Used to tag sanitized errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subsystem {
    Session,
    Campaign,
    Fuel,
    Navigation,
    Power,
    Weapons,
    Orders,
    Comms,
    Sensors,
    Repairs,
    Map,
    Library,
}

impl Subsystem {
    pub fn display_name(&self) -> &'static str {
        match self {
            Subsystem::Session => "Session",
            Subsystem::Campaign => "Campaign",
            Subsystem::Fuel => "Fuel",
            Subsystem::Navigation => "Navigation",
            Subsystem::Power => "Power",
            Subsystem::Weapons => "Weapons",
            Subsystem::Orders => "Orders",
            Subsystem::Comms => "Comms",
            Subsystem::Sensors => "Sensors",
            Subsystem::Repairs => "Repairs",
            Subsystem::Map => "Map",
            Subsystem::Library => "Library",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How much identity a session must have assembled before an action runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRequirement {
    /// Joined a campaign.
    Campaign,
    /// Joined a campaign and bound to a ship.
    Ship,
}

/// Who, besides the GM, may perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedRoles {
    GmOnly,
    /// Any member of the campaign, with or without a crew role.
    AnyCrew,
    Roles(&'static [CrewRole]),
}

impl AllowedRoles {
    pub fn permits(&self, role: Option<CrewRole>) -> bool {
        match self {
            AllowedRoles::GmOnly => false,
            AllowedRoles::AnyCrew => true,
            AllowedRoles::Roles(roles) => role.is_some_and(|role| roles.contains(&role)),
        }
    }
}

const ENGINEER: &[CrewRole] = &[CrewRole::Engineer];
const ENGINEER_PILOT: &[CrewRole] = &[CrewRole::Engineer, CrewRole::Pilot];
const ENGINEER_PILOT_CAPTAIN: &[CrewRole] =
    &[CrewRole::Engineer, CrewRole::Pilot, CrewRole::Captain];
const ENGINEER_CAPTAIN: &[CrewRole] = &[CrewRole::Engineer, CrewRole::Captain];
const ENGINEER_DAMAGE_CONTROL: &[CrewRole] = &[CrewRole::Engineer, CrewRole::DamageControl];
const PILOT: &[CrewRole] = &[CrewRole::Pilot];
const PILOT_ASTROGATOR: &[CrewRole] = &[CrewRole::Pilot, CrewRole::Astrogator];
const CAPTAIN: &[CrewRole] = &[CrewRole::Captain];
const CAPTAIN_GUNNER: &[CrewRole] = &[CrewRole::Captain, CrewRole::Gunner];
const GUNNER_CAPTAIN: &[CrewRole] = &[CrewRole::Gunner, CrewRole::Captain];
const COMMS_CAPTAIN: &[CrewRole] = &[CrewRole::Comms, CrewRole::Captain];
const SENSORS: &[CrewRole] = &[CrewRole::Sensors];
const SENSORS_CAPTAIN: &[CrewRole] = &[CrewRole::Sensors, CrewRole::Captain];

impl ActionKind {
    pub const ALL: [ActionKind; 41] = [
        ActionKind::AdvanceTime,
        ActionKind::SetLocation,
        ActionKind::AddPlayerSlot,
        ActionKind::AddShip,
        ActionKind::GetShipLog,
        ActionKind::GetFuelStatus,
        ActionKind::GetFuelSources,
        ActionKind::AddFuelSource,
        ActionKind::Refuel,
        ActionKind::StartFuelProcessing,
        ActionKind::CheckFuelProcessing,
        ActionKind::PlotJump,
        ActionKind::Jump,
        ActionKind::Maneuver,
        ActionKind::SetPower,
        ActionKind::ApplyPowerPreset,
        ActionKind::SetWeaponsMode,
        ActionKind::Fire,
        ActionKind::EndTurn,
        ActionKind::IssueOrder,
        ActionKind::AcknowledgeOrder,
        ActionKind::GetOrders,
        ActionKind::SetAlertStatus,
        ActionKind::SendTransmission,
        ActionKind::GetTransmissions,
        ActionKind::MarkTransmissionRead,
        ActionKind::ArchiveTransmission,
        ActionKind::GetContacts,
        ActionKind::ScanContact,
        ActionKind::MarkContact,
        ActionKind::SpawnContact,
        ActionKind::RemoveContact,
        ActionKind::ResetScan,
        ActionKind::SetContactTargetable,
        ActionKind::RepairSystem,
        ActionKind::DamageSystem,
        ActionKind::ApplyHullDamage,
        ActionKind::ShareMap,
        ActionKind::UnshareMap,
        ActionKind::UpdateMapView,
        ActionKind::LibrarySearch,
    ];

    /// Roles allowed to perform this action in addition to the GM.
    pub fn allowed_roles(&self) -> AllowedRoles {
        use ActionKind as A;
        match self {
            A::AdvanceTime | A::SetLocation | A::AddPlayerSlot | A::AddShip => AllowedRoles::GmOnly,
            A::GetShipLog => AllowedRoles::AnyCrew,

            A::GetFuelStatus => AllowedRoles::AnyCrew,
            A::GetFuelSources | A::Refuel => AllowedRoles::Roles(ENGINEER_PILOT),
            A::AddFuelSource => AllowedRoles::GmOnly,
            A::StartFuelProcessing => AllowedRoles::Roles(ENGINEER),
            A::CheckFuelProcessing => AllowedRoles::Roles(ENGINEER_PILOT_CAPTAIN),

            A::PlotJump => AllowedRoles::Roles(PILOT_ASTROGATOR),
            A::Jump | A::Maneuver => AllowedRoles::Roles(PILOT),

            A::SetPower => AllowedRoles::Roles(ENGINEER),
            A::ApplyPowerPreset => AllowedRoles::Roles(ENGINEER_CAPTAIN),

            A::SetWeaponsMode => AllowedRoles::Roles(CAPTAIN_GUNNER),
            A::Fire => AllowedRoles::Roles(GUNNER_CAPTAIN),
            A::EndTurn => AllowedRoles::Roles(CAPTAIN),

            A::IssueOrder | A::SetAlertStatus => AllowedRoles::Roles(CAPTAIN),
            A::AcknowledgeOrder | A::GetOrders => AllowedRoles::AnyCrew,

            A::SendTransmission
            | A::GetTransmissions
            | A::MarkTransmissionRead
            | A::ArchiveTransmission => AllowedRoles::Roles(COMMS_CAPTAIN),

            A::GetContacts => AllowedRoles::AnyCrew,
            A::ScanContact => AllowedRoles::Roles(SENSORS),
            A::MarkContact => AllowedRoles::Roles(SENSORS_CAPTAIN),
            A::SpawnContact | A::RemoveContact | A::ResetScan | A::SetContactTargetable => {
                AllowedRoles::GmOnly
            }

            A::RepairSystem => AllowedRoles::Roles(ENGINEER_DAMAGE_CONTROL),
            A::DamageSystem | A::ApplyHullDamage => AllowedRoles::GmOnly,

            A::ShareMap | A::UnshareMap | A::UpdateMapView => AllowedRoles::GmOnly,

            A::LibrarySearch => AllowedRoles::AnyCrew,
        }
    }

    pub fn identity_requirement(&self) -> IdentityRequirement {
        use ActionKind as A;
        match self {
            A::AdvanceTime
            | A::SetLocation
            | A::AddPlayerSlot
            | A::AddShip
            | A::AddFuelSource
            | A::GetTransmissions
            | A::MarkTransmissionRead
            | A::ArchiveTransmission
            | A::GetContacts
            | A::SpawnContact
            | A::RemoveContact
            | A::ResetScan
            | A::SetContactTargetable
            | A::ShareMap
            | A::UnshareMap
            | A::UpdateMapView
            | A::LibrarySearch => IdentityRequirement::Campaign,
            _ => IdentityRequirement::Ship,
        }
    }

    pub fn subsystem(&self) -> Subsystem {
        use ActionKind as A;
        match self {
            A::AdvanceTime | A::SetLocation | A::AddPlayerSlot | A::AddShip | A::GetShipLog => {
                Subsystem::Campaign
            }
            A::GetFuelStatus
            | A::GetFuelSources
            | A::AddFuelSource
            | A::Refuel
            | A::StartFuelProcessing
            | A::CheckFuelProcessing => Subsystem::Fuel,
            A::PlotJump | A::Jump | A::Maneuver => Subsystem::Navigation,
            A::SetPower | A::ApplyPowerPreset => Subsystem::Power,
            A::SetWeaponsMode | A::Fire | A::EndTurn => Subsystem::Weapons,
            A::IssueOrder | A::AcknowledgeOrder | A::GetOrders | A::SetAlertStatus => {
                Subsystem::Orders
            }
            A::SendTransmission
            | A::GetTransmissions
            | A::MarkTransmissionRead
            | A::ArchiveTransmission => Subsystem::Comms,
            A::GetContacts
            | A::ScanContact
            | A::MarkContact
            | A::SpawnContact
            | A::RemoveContact
            | A::ResetScan
            | A::SetContactTargetable => Subsystem::Sensors,
            A::RepairSystem | A::DamageSystem | A::ApplyHullDamage => Subsystem::Repairs,
            A::ShareMap | A::UnshareMap | A::UpdateMapView => Subsystem::Map,
            A::LibrarySearch => Subsystem::Library,
        }
    }

    /// Unauthorized attempts are dropped without an error reply.
    pub fn silent_on_deny(&self) -> bool {
        matches!(self, ActionKind::UpdateMapView)
    }

    /// Wire name of the inbound event.
    pub fn as_str(&self) -> &'static str {
        use ActionKind as A;
        match self {
            A::AdvanceTime => "advanceTime",
            A::SetLocation => "setLocation",
            A::AddPlayerSlot => "addPlayerSlot",
            A::AddShip => "addShip",
            A::GetShipLog => "getShipLog",
            A::GetFuelStatus => "getFuelStatus",
            A::GetFuelSources => "getFuelSources",
            A::AddFuelSource => "addFuelSource",
            A::Refuel => "refuel",
            A::StartFuelProcessing => "startFuelProcessing",
            A::CheckFuelProcessing => "checkFuelProcessing",
            A::PlotJump => "plotJump",
            A::Jump => "jump",
            A::Maneuver => "maneuver",
            A::SetPower => "setPower",
            A::ApplyPowerPreset => "applyPowerPreset",
            A::SetWeaponsMode => "setWeaponsMode",
            A::Fire => "fire",
            A::EndTurn => "endTurn",
            A::IssueOrder => "issueOrder",
            A::AcknowledgeOrder => "acknowledgeOrder",
            A::GetOrders => "getOrders",
            A::SetAlertStatus => "setAlertStatus",
            A::SendTransmission => "sendTransmission",
            A::GetTransmissions => "getTransmissions",
            A::MarkTransmissionRead => "markTransmissionRead",
            A::ArchiveTransmission => "archiveTransmission",
            A::GetContacts => "getContacts",
            A::ScanContact => "scanContact",
            A::MarkContact => "markContact",
            A::SpawnContact => "spawnContact",
            A::RemoveContact => "removeContact",
            A::ResetScan => "resetScan",
            A::SetContactTargetable => "setContactTargetable",
            A::RepairSystem => "repairSystem",
            A::DamageSystem => "damageSystem",
            A::ApplyHullDamage => "applyHullDamage",
            A::ShareMap => "shareMap",
            A::UnshareMap => "unshareMap",
            A::UpdateMapView => "updateMapView",
            A::LibrarySearch => "librarySearch",
        }
    }

    /// Verb phrase used in deny reasons ("Only engineer can <activity>").
    fn activity(&self) -> &'static str {
        use ActionKind as A;
        match self {
            A::AdvanceTime => "advance campaign time",
            A::SetLocation => "change the campaign location",
            A::AddPlayerSlot => "add player slots",
            A::AddShip => "add ships",
            A::GetShipLog => "read the ship's log",
            A::GetFuelStatus => "check fuel status",
            A::GetFuelSources | A::Refuel => "manage refueling",
            A::AddFuelSource => "add fuel sources",
            A::StartFuelProcessing => "start fuel processing",
            A::CheckFuelProcessing => "check fuel processing",
            A::PlotJump => "plot jumps",
            A::Jump => "initiate a jump",
            A::Maneuver => "maneuver the ship",
            A::SetPower => "allocate power",
            A::ApplyPowerPreset => "apply power presets",
            A::SetWeaponsMode => "set weapons authorization",
            A::Fire => "fire weapons",
            A::EndTurn => "end the combat turn",
            A::IssueOrder => "issue orders",
            A::AcknowledgeOrder => "acknowledge orders",
            A::GetOrders => "view orders",
            A::SetAlertStatus => "set alert status",
            A::SendTransmission => "send transmissions",
            A::GetTransmissions | A::MarkTransmissionRead | A::ArchiveTransmission => {
                "manage transmissions"
            }
            A::GetContacts => "view contacts",
            A::ScanContact => "scan contacts",
            A::MarkContact => "mark contacts",
            A::SpawnContact => "spawn contacts",
            A::RemoveContact => "remove contacts",
            A::ResetScan => "reset scans",
            A::SetContactTargetable => "change contact targetability",
            A::RepairSystem => "repair systems",
            A::DamageSystem => "damage systems",
            A::ApplyHullDamage => "apply hull damage",
            A::ShareMap => "share the map",
            A::UnshareMap => "unshare the map",
            A::UpdateMapView => "update the shared map view",
            A::LibrarySearch => "search the library",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a session identity that authorization looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub role: Option<CrewRole>,
    pub is_gm: bool,
}

impl Actor {
    pub fn gm() -> Self {
        Self {
            role: None,
            is_gm: true,
        }
    }

    pub fn crew(role: CrewRole) -> Self {
        Self {
            role: Some(role),
            is_gm: false,
        }
    }
}

/// Why an action was refused. The reason is shown to the player as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denied {
    pub reason: String,
}

impl fmt::Display for Denied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Check whether `actor` may perform `action`.
pub fn can_perform(actor: Actor, action: ActionKind) -> Result<(), Denied> {
    if actor.is_gm {
        return Ok(());
    }
    let allowed = action.allowed_roles();
    if allowed.permits(actor.role) {
        return Ok(());
    }
    let who = match allowed {
        AllowedRoles::Roles(roles) => join_roles(roles),
        AllowedRoles::GmOnly | AllowedRoles::AnyCrew => "the GM".to_string(),
    };
    Err(Denied {
        reason: format!("Only {who} can {}", action.activity()),
    })
}

fn join_roles(roles: &[CrewRole]) -> String {
    let names: Vec<&str> = roles.iter().map(CrewRole::display_name).collect();
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => (*last).to_string(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
    }
}
