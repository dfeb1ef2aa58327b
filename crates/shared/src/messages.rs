//! WebSocket message types for client-server communication
//!
//! Every frame is a JSON object tagged by `type`, carrying the event name in
//! camelCase (`{"type":"refuel","sourceId":"...","tons":15}`).
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Renaming variants is a breaking change
//! - Unknown enum variants deserialize to `Unknown` variant for forward compatibility

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starbridge_domain::{
    ActionKind, AlertStatus, Campaign, CampaignId, CampaignTime, CheckResult, Contact,
    ContactId, ContactKind, CrewRole, Disposition, FuelGrade, FuelSource, FuelSourceId,
    FuelSourceKind, FuelState, Hull, JumpPlan, LibraryEntry, Location, ManeuverDirection,
    MapPoint, MapView, Order, OrderId, OrderTarget, PlayerSlotId, PowerAllocation, PowerPreset,
    ProcessingProgress, RangeBand, Ship, ShipId, ShipLogEntry, ShipSystem, ShipTemplate,
    SystemsTable, Transmission, TransmissionId, TransmissionPriority, WeaponKind, WeaponsMode,
};

use crate::responses::{CampaignSummary, CrewMember, ErrorCode};

// =============================================================================
// Client Messages (client → server)
// =============================================================================

/// Messages from a browser client to the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    // === Session lifecycle ===
    /// Heartbeat ping
    Heartbeat,
    /// Create a campaign with its primary ship; the caller becomes its GM
    CreateCampaign {
        name: String,
        gm_name: String,
        ship_name: String,
        ship_template: ShipTemplate,
    },
    ListCampaigns,
    JoinCampaign {
        campaign_id: CampaignId,
        #[serde(default)]
        as_gm: bool,
        #[serde(default)]
        slot_id: Option<PlayerSlotId>,
    },
    SelectRole {
        ship_id: ShipId,
        role: CrewRole,
    },
    /// Join (or re-sync) a ship's bridge. GM sessions may name any ship.
    JoinBridge {
        #[serde(default)]
        ship_id: Option<ShipId>,
    },
    LeaveBridge,
    LeaveCampaign,

    // === Campaign (GM) ===
    AdvanceTime {
        #[serde(default)]
        hours: u64,
        #[serde(default)]
        minutes: u64,
    },
    SetLocation {
        sector: String,
        hex: String,
    },
    AddPlayerSlot {
        name: String,
    },
    AddShip {
        name: String,
        template: ShipTemplate,
    },
    GetShipLog {
        #[serde(default)]
        limit: Option<u32>,
    },

    // === Fuel ===
    GetFuelStatus,
    GetFuelSources,
    AddFuelSource {
        name: String,
        kind: FuelSourceKind,
        #[serde(default)]
        available_tons: Option<u32>,
    },
    Refuel {
        source_id: FuelSourceId,
        tons: u32,
        /// Take what the source and tanks allow instead of failing.
        #[serde(default)]
        fill_available: bool,
    },
    StartFuelProcessing {
        tons: u32,
    },
    CheckFuelProcessing,

    // === Navigation ===
    PlotJump {
        distance: u32,
    },
    Jump {
        distance: u32,
        sector: String,
        hex: String,
    },
    Maneuver {
        contact_id: ContactId,
        direction: ManeuverDirection,
    },

    // === Power ===
    SetPower {
        allocations: BTreeMap<ShipSystem, u8>,
    },
    ApplyPowerPreset {
        preset: PowerPreset,
    },

    // === Weapons ===
    SetWeaponsMode {
        mode: WeaponsMode,
    },
    Fire {
        turret: usize,
        target: ContactId,
        weapon: usize,
    },
    EndTurn,

    // === Captain ===
    IssueOrder {
        target: OrderTarget,
        text: String,
        #[serde(default)]
        requires_ack: bool,
    },
    AcknowledgeOrder {
        order_id: OrderId,
    },
    GetOrders,
    SetAlertStatus {
        status: AlertStatus,
    },

    // === Comms ===
    SendTransmission {
        channel: String,
        body: String,
        #[serde(default)]
        priority: TransmissionPriority,
        /// Display name override for the sender.
        #[serde(default)]
        from: Option<String>,
    },
    GetTransmissions {
        #[serde(default)]
        include_archived: bool,
    },
    MarkTransmissionRead {
        transmission_id: TransmissionId,
    },
    ArchiveTransmission {
        transmission_id: TransmissionId,
    },

    // === Sensors ===
    GetContacts,
    ScanContact {
        contact_id: ContactId,
    },
    MarkContact {
        contact_id: ContactId,
        disposition: Disposition,
    },
    SpawnContact {
        name: String,
        #[serde(default)]
        kind: ContactKind,
        range_band: RangeBand,
        #[serde(default)]
        bearing: u16,
        #[serde(default)]
        disposition: Disposition,
        #[serde(default)]
        health: Option<u32>,
    },
    RemoveContact {
        contact_id: ContactId,
    },
    ResetScan {
        contact_id: ContactId,
    },
    SetContactTargetable {
        contact_id: ContactId,
        targetable: bool,
    },

    // === Repairs ===
    RepairSystem {
        system: ShipSystem,
    },
    DamageSystem {
        system: ShipSystem,
        amount: u8,
    },
    ApplyHullDamage {
        amount: u32,
    },

    // === Map (GM) ===
    ShareMap {
        center: MapPoint,
        sector: String,
        hex: String,
        zoom: f64,
    },
    UnshareMap,
    UpdateMapView {
        center: MapPoint,
        sector: String,
        hex: String,
        zoom: f64,
    },

    // === Library ===
    LibrarySearch {
        query: String,
    },

    /// Unknown message type for forward compatibility
    ///
    /// When deserializing an unknown variant, this variant is used instead of
    /// failing. Allows older clients to gracefully handle new message types.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// The authorization-table entry for this message.
    ///
    /// `None` for session lifecycle messages, which need no crew role.
    pub fn action_kind(&self) -> Option<ActionKind> {
        use ClientMessage as M;
        let kind = match self {
            M::Heartbeat
            | M::CreateCampaign { .. }
            | M::ListCampaigns
            | M::JoinCampaign { .. }
            | M::SelectRole { .. }
            | M::JoinBridge { .. }
            | M::LeaveBridge
            | M::LeaveCampaign
            | M::Unknown => return None,

            M::AdvanceTime { .. } => ActionKind::AdvanceTime,
            M::SetLocation { .. } => ActionKind::SetLocation,
            M::AddPlayerSlot { .. } => ActionKind::AddPlayerSlot,
            M::AddShip { .. } => ActionKind::AddShip,
            M::GetShipLog { .. } => ActionKind::GetShipLog,

            M::GetFuelStatus => ActionKind::GetFuelStatus,
            M::GetFuelSources => ActionKind::GetFuelSources,
            M::AddFuelSource { .. } => ActionKind::AddFuelSource,
            M::Refuel { .. } => ActionKind::Refuel,
            M::StartFuelProcessing { .. } => ActionKind::StartFuelProcessing,
            M::CheckFuelProcessing => ActionKind::CheckFuelProcessing,

            M::PlotJump { .. } => ActionKind::PlotJump,
            M::Jump { .. } => ActionKind::Jump,
            M::Maneuver { .. } => ActionKind::Maneuver,

            M::SetPower { .. } => ActionKind::SetPower,
            M::ApplyPowerPreset { .. } => ActionKind::ApplyPowerPreset,

            M::SetWeaponsMode { .. } => ActionKind::SetWeaponsMode,
            M::Fire { .. } => ActionKind::Fire,
            M::EndTurn => ActionKind::EndTurn,

            M::IssueOrder { .. } => ActionKind::IssueOrder,
            M::AcknowledgeOrder { .. } => ActionKind::AcknowledgeOrder,
            M::GetOrders => ActionKind::GetOrders,
            M::SetAlertStatus { .. } => ActionKind::SetAlertStatus,

            M::SendTransmission { .. } => ActionKind::SendTransmission,
            M::GetTransmissions { .. } => ActionKind::GetTransmissions,
            M::MarkTransmissionRead { .. } => ActionKind::MarkTransmissionRead,
            M::ArchiveTransmission { .. } => ActionKind::ArchiveTransmission,

            M::GetContacts => ActionKind::GetContacts,
            M::ScanContact { .. } => ActionKind::ScanContact,
            M::MarkContact { .. } => ActionKind::MarkContact,
            M::SpawnContact { .. } => ActionKind::SpawnContact,
            M::RemoveContact { .. } => ActionKind::RemoveContact,
            M::ResetScan { .. } => ActionKind::ResetScan,
            M::SetContactTargetable { .. } => ActionKind::SetContactTargetable,

            M::RepairSystem { .. } => ActionKind::RepairSystem,
            M::DamageSystem { .. } => ActionKind::DamageSystem,
            M::ApplyHullDamage { .. } => ActionKind::ApplyHullDamage,

            M::ShareMap { .. } => ActionKind::ShareMap,
            M::UnshareMap => ActionKind::UnshareMap,
            M::UpdateMapView { .. } => ActionKind::UpdateMapView,

            M::LibrarySearch { .. } => ActionKind::LibrarySearch,
        };
        Some(kind)
    }
}

// =============================================================================
// Server Messages (server → client)
// =============================================================================

/// Messages from the server to browser clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Heartbeat response
    Pong,
    /// Error envelope, only ever sent to the requesting connection
    Error {
        code: ErrorCode,
        message: String,
        /// Handler family for internal failures ("Fuel", "Library"...)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subsystem: Option<String>,
    },

    // === Session ===
    CampaignCreated {
        campaign: Campaign,
        ship: Ship,
    },
    CampaignList {
        campaigns: Vec<CampaignSummary>,
    },
    CampaignJoined {
        campaign: Campaign,
        ships: Vec<Ship>,
        is_gm: bool,
    },
    RoleSelected {
        ship_id: ShipId,
        role: CrewRole,
    },
    /// Full snapshot of a bridge; the reconnect re-sync point
    BridgeJoined {
        ship: Ship,
        contacts: Vec<Contact>,
        orders: Vec<Order>,
        crew: Vec<CrewMember>,
    },
    CrewChanged {
        campaign_id: CampaignId,
        crew: Vec<CrewMember>,
    },

    // === Campaign ===
    TimeAdvanced {
        current_time: CampaignTime,
        date: String,
    },
    LocationChanged {
        location: Location,
    },
    CampaignUpdated {
        campaign: Campaign,
        ships: Vec<Ship>,
    },
    ShipLog {
        ship_id: ShipId,
        entries: Vec<ShipLogEntry>,
    },
    /// A log entry pushed to GM connections (ROE violations)
    LogEntryAdded {
        entry: ShipLogEntry,
    },

    // === Fuel ===
    FuelStatus {
        ship_id: ShipId,
        fuel: FuelState,
        jump_fuel_per_parsec: u32,
    },
    FuelSources {
        sources: Vec<FuelSource>,
    },
    Refueled {
        ship_id: ShipId,
        source: FuelSource,
        tons: u32,
        grade: FuelGrade,
        fuel: FuelState,
    },
    FuelProcessingStarted {
        ship_id: ShipId,
        fuel: FuelState,
        hours_required: u64,
    },
    FuelProcessingStatus {
        ship_id: ShipId,
        fuel: FuelState,
        #[serde(default)]
        progress: Option<ProcessingProgress>,
    },
    FuelProcessingCompleted {
        ship_id: ShipId,
        fuel: FuelState,
    },

    // === Navigation ===
    JumpPlotted {
        ship_id: ShipId,
        plan: JumpPlan,
    },
    JumpCompleted {
        ship_id: ShipId,
        plan: JumpPlan,
        location: Location,
        fuel: FuelState,
    },

    // === Sensors ===
    ContactUpdated {
        contact: Contact,
    },
    ContactDestroyed {
        contact_id: ContactId,
        name: String,
    },
    ContactRemoved {
        contact_id: ContactId,
    },
    ContactList {
        contacts: Vec<Contact>,
    },

    // === Power ===
    PowerChanged {
        ship_id: ShipId,
        power: PowerAllocation,
        #[serde(default)]
        preset: Option<PowerPreset>,
    },

    // === Weapons ===
    WeaponsModeChanged {
        ship_id: ShipId,
        mode: WeaponsMode,
    },
    WeaponFired {
        ship_id: ShipId,
        turret: usize,
        weapon: usize,
        weapon_kind: WeaponKind,
        target_id: ContactId,
        attack: CheckResult,
        damage: u32,
        target_destroyed: bool,
        roe_violation: bool,
    },
    TurnStarted {
        ship_id: ShipId,
        round: u32,
    },

    // === Captain ===
    OrderIssued {
        order: Order,
    },
    OrderAcknowledged {
        order: Order,
    },
    OrderList {
        ship_id: ShipId,
        orders: Vec<Order>,
    },
    AlertStatusChanged {
        ship_id: ShipId,
        status: AlertStatus,
    },

    // === Comms ===
    TransmissionReceived {
        transmission: Transmission,
    },
    TransmissionList {
        transmissions: Vec<Transmission>,
    },
    TransmissionUpdated {
        transmission: Transmission,
    },

    // === Repairs ===
    SystemsChanged {
        ship_id: ShipId,
        system: ShipSystem,
        systems: SystemsTable,
        #[serde(default)]
        repair_check: Option<CheckResult>,
    },
    HullChanged {
        ship_id: ShipId,
        hull: Hull,
    },

    // === Map ===
    MapShared {
        view: MapView,
        /// Clients should switch to the map tab on receipt
        auto_switch: bool,
    },
    MapUnshared,
    MapViewUpdated {
        view: MapView,
    },

    // === Library ===
    LibraryResults {
        query: String,
        results: Vec<LibraryEntry>,
    },

    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Build an error envelope.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code,
            message: message.into(),
            subsystem: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_use_camel_case_event_names_and_fields() {
        let source = FuelSourceId::new();
        let json = format!(r#"{{"type":"refuel","sourceId":"{source}","tons":15}}"#);
        let msg: ClientMessage = serde_json::from_str(&json).expect("parse refuel");
        match msg {
            ClientMessage::Refuel {
                source_id,
                tons,
                fill_available,
            } => {
                assert_eq!(source_id, source);
                assert_eq!(tons, 15);
                assert!(!fill_available);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_type_is_tolerated() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"warpToLudicrousSpeed"}"#).expect("parse");
        assert!(matches!(msg, ClientMessage::Unknown));
        assert_eq!(msg.action_kind(), None);
    }

    #[test]
    fn lifecycle_messages_have_no_action_kind() {
        assert_eq!(ClientMessage::Heartbeat.action_kind(), None);
        assert_eq!(
            ClientMessage::EndTurn.action_kind(),
            Some(ActionKind::EndTurn)
        );
    }

    #[test]
    fn wire_names_match_action_kind_names() {
        let samples = [
            r#"{"type":"getFuelStatus"}"#,
            r#"{"type":"checkFuelProcessing"}"#,
            r#"{"type":"endTurn"}"#,
            r#"{"type":"unshareMap"}"#,
            r#"{"type":"getContacts"}"#,
            r#"{"type":"librarySearch","query":"jump"}"#,
            r#"{"type":"applyPowerPreset","preset":"combat"}"#,
        ];
        for json in samples {
            let msg: ClientMessage = serde_json::from_str(json).expect("parse");
            let kind = msg.action_kind().expect("action message");
            assert!(json.contains(&format!("\"{}\"", kind.as_str())), "{json}");
        }
    }

    #[test]
    fn error_envelope_omits_missing_subsystem() {
        let json = serde_json::to_value(ServerMessage::error(
            ErrorCode::Forbidden,
            "Only engineer or pilot can manage refueling",
        ))
        .expect("serialize");
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "forbidden");
        assert!(json.get("subsystem").is_none());
    }
}
