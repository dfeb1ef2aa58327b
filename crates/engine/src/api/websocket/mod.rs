//! WebSocket handling for bridge client connections.
//!
//! Every inbound frame goes through the same path: parse, resolve the
//! session, check the authorization table, take the campaign's command lock,
//! run the handler, then deliver its outcome while the lock is still held.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};

mod ws_campaign;
mod ws_captain;
mod ws_comms;
mod ws_fuel;
mod ws_library;
mod ws_map;
mod ws_navigation;
mod ws_power;
mod ws_repairs;
mod ws_sensors;
mod ws_session;
mod ws_weapons;

pub mod error_sanitizer;

use starbridge_domain::{
    can_perform, ActionKind, CampaignId, ConnectionId, IdentityRequirement, ShipId,
};
use starbridge_shared::{ClientMessage, ErrorCode, ServerMessage};

use super::broadcast::{CommandOutcome, Scope};
use super::connections::ConnectionManager;
use super::session_registry::Session;
use crate::app::App;
use error_sanitizer::CommandError;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub app: Arc<App>,
    pub connections: Arc<ConnectionManager>,
    pub campaign_locks: CampaignLocks,
}

impl WsState {
    pub fn new(app: Arc<App>, connections: Arc<ConnectionManager>) -> Self {
        Self {
            app,
            connections,
            campaign_locks: CampaignLocks::new(),
        }
    }
}

/// One command lock per campaign.
///
/// A command holds its campaign's lock from the first read to the last
/// delivery, so two crew members acting on the same ship never interleave
/// their read-modify-write cycles. Campaigns never wait on each other.
#[derive(Default)]
pub struct CampaignLocks {
    locks: DashMap<CampaignId, Arc<Mutex<()>>>,
}

impl CampaignLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, campaign_id: CampaignId) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(campaign_id).or_default().clone();
        lock.lock_owned().await
    }
}

/// Identity a command runs under, checked against its action's requirement.
pub(crate) struct CommandContext {
    pub connection_id: ConnectionId,
    pub session: Session,
    pub campaign_id: CampaignId,
    pub action: ActionKind,
}

impl CommandContext {
    async fn resolve(
        state: &WsState,
        connection_id: ConnectionId,
        action: ActionKind,
    ) -> Result<Self, CommandError> {
        let session = state
            .connections
            .session(connection_id)
            .await
            .ok_or_else(|| CommandError::Identity("Connection not found".into()))?;
        let campaign_id = session
            .campaign_id
            .ok_or_else(|| CommandError::Identity("Not in a campaign".into()))?;
        if action.identity_requirement() == IdentityRequirement::Ship && session.ship_id.is_none()
        {
            return Err(CommandError::Identity("Not on a ship".into()));
        }
        Ok(Self {
            connection_id,
            session,
            campaign_id,
            action,
        })
    }

    /// The bound ship. Present for every ship-scoped action.
    pub fn ship_id(&self) -> Result<ShipId, CommandError> {
        self.session
            .ship_id
            .ok_or_else(|| CommandError::Identity("Not on a ship".into()))
    }

    pub fn reply(&self, message: ServerMessage) -> CommandOutcome {
        CommandOutcome::reply(self.connection_id, message)
    }
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = ConnectionId::new();

    // Create a bounded channel for sending messages to this client
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    state.connections.register(connection_id, tx.clone()).await;

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // Forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "Failed to serialize server message"),
            }
        }
    });

    // Frames from one connection are handled strictly in order
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(msg) => handle_message(msg, &state, connection_id).await,
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                    let error = ServerMessage::error(
                        ErrorCode::BadRequest,
                        format!("Invalid message format: {e}"),
                    );
                    let _ = tx.try_send(error);
                }
            },
            Ok(Message::Ping(_)) => {
                let _ = tx.try_send(ServerMessage::Pong);
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    // Clean up
    ws_session::handle_disconnect(&state, connection_id).await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Run one parsed client message to completion, including delivery.
async fn handle_message(msg: ClientMessage, state: &WsState, connection_id: ConnectionId) {
    let label = message_label(&msg);
    let result = match msg {
        ClientMessage::Heartbeat => Ok(CommandOutcome::reply(connection_id, ServerMessage::Pong)),

        ClientMessage::CreateCampaign {
            name,
            gm_name,
            ship_name,
            ship_template,
        } => {
            ws_session::handle_create_campaign(
                state,
                connection_id,
                &name,
                &gm_name,
                &ship_name,
                ship_template,
            )
            .await
        }
        ClientMessage::ListCampaigns => ws_session::handle_list_campaigns(state, connection_id).await,
        ClientMessage::JoinCampaign {
            campaign_id,
            as_gm,
            slot_id,
        } => {
            tracing::info!(
                connection_id = %connection_id,
                campaign_id = %campaign_id,
                as_gm,
                "JoinCampaign message received"
            );
            ws_session::handle_join_campaign(state, connection_id, campaign_id, as_gm, slot_id)
                .await
        }
        ClientMessage::SelectRole { ship_id, role } => {
            ws_session::handle_select_role(state, connection_id, ship_id, role).await
        }
        ClientMessage::JoinBridge { ship_id } => {
            ws_session::handle_join_bridge(state, connection_id, ship_id).await
        }
        ClientMessage::LeaveBridge => ws_session::handle_leave_bridge(state, connection_id).await,
        ClientMessage::LeaveCampaign => {
            ws_session::handle_leave_campaign(state, connection_id).await
        }

        ClientMessage::Unknown => {
            tracing::debug!(connection_id = %connection_id, "Unknown message type received");
            Err(CommandError::precondition(
                ErrorCode::BadRequest,
                "Unknown message type",
            ))
        }

        action => {
            // Bridge actions deliver under their campaign lock
            handle_action(action, state, connection_id).await;
            return;
        }
    };

    match result {
        Ok(outcome) => state.connections.deliver(outcome).await,
        Err(e) => {
            let reply = e.into_client_message(label);
            state.connections.send_to(connection_id, reply).await;
        }
    }
}

/// Identity, authorization, lock, handler, delivery.
async fn handle_action(msg: ClientMessage, state: &WsState, connection_id: ConnectionId) {
    let Some(action) = msg.action_kind() else {
        return;
    };

    let ctx = match CommandContext::resolve(state, connection_id, action).await {
        Ok(ctx) => ctx,
        Err(e) => {
            let reply = e.into_client_message(action.as_str());
            state.connections.send_to(connection_id, reply).await;
            return;
        }
    };

    if let Err(denied) = can_perform(ctx.session.actor(), action) {
        if action.silent_on_deny() {
            tracing::debug!(
                connection_id = %connection_id,
                action = %action,
                "Unauthorized action dropped"
            );
            return;
        }
        tracing::debug!(
            connection_id = %connection_id,
            action = %action,
            reason = %denied,
            "Action denied"
        );
        let reply = CommandError::Forbidden(denied.reason).into_client_message(action.as_str());
        state.connections.send_to(connection_id, reply).await;
        return;
    }

    let _guard = state.campaign_locks.lock(ctx.campaign_id).await;
    match dispatch_action(state, &ctx, msg).await {
        Ok(outcome) => state.connections.deliver(outcome).await,
        Err(e) => {
            let reply = e.into_client_message(action.as_str());
            state.connections.send_to(connection_id, reply).await;
        }
    }
}

/// Typed dispatch table: one arm per bridge action.
async fn dispatch_action(
    state: &WsState,
    ctx: &CommandContext,
    msg: ClientMessage,
) -> Result<CommandOutcome, CommandError> {
    use ClientMessage as M;
    match msg {
        // Campaign
        M::AdvanceTime { hours, minutes } => {
            ws_campaign::handle_advance_time(state, ctx, hours, minutes).await
        }
        M::SetLocation { sector, hex } => {
            ws_campaign::handle_set_location(state, ctx, &sector, &hex).await
        }
        M::AddPlayerSlot { name } => ws_campaign::handle_add_player_slot(state, ctx, &name).await,
        M::AddShip { name, template } => {
            ws_campaign::handle_add_ship(state, ctx, &name, template).await
        }
        M::GetShipLog { limit } => ws_campaign::handle_get_ship_log(state, ctx, limit).await,

        // Fuel
        M::GetFuelStatus => ws_fuel::handle_get_fuel_status(state, ctx).await,
        M::GetFuelSources => ws_fuel::handle_get_fuel_sources(state, ctx).await,
        M::AddFuelSource {
            name,
            kind,
            available_tons,
        } => ws_fuel::handle_add_fuel_source(state, ctx, &name, kind, available_tons).await,
        M::Refuel {
            source_id,
            tons,
            fill_available,
        } => ws_fuel::handle_refuel(state, ctx, source_id, tons, fill_available).await,
        M::StartFuelProcessing { tons } => {
            ws_fuel::handle_start_fuel_processing(state, ctx, tons).await
        }
        M::CheckFuelProcessing => ws_fuel::handle_check_fuel_processing(state, ctx).await,

        // Navigation
        M::PlotJump { distance } => ws_navigation::handle_plot_jump(state, ctx, distance).await,
        M::Jump {
            distance,
            sector,
            hex,
        } => ws_navigation::handle_jump(state, ctx, distance, &sector, &hex).await,
        M::Maneuver {
            contact_id,
            direction,
        } => ws_navigation::handle_maneuver(state, ctx, contact_id, direction).await,

        // Power
        M::SetPower { allocations } => ws_power::handle_set_power(state, ctx, &allocations).await,
        M::ApplyPowerPreset { preset } => {
            ws_power::handle_apply_power_preset(state, ctx, preset).await
        }

        // Weapons
        M::SetWeaponsMode { mode } => ws_weapons::handle_set_weapons_mode(state, ctx, mode).await,
        M::Fire {
            turret,
            target,
            weapon,
        } => ws_weapons::handle_fire(state, ctx, turret, weapon, target).await,
        M::EndTurn => ws_weapons::handle_end_turn(state, ctx).await,

        // Captain
        M::IssueOrder {
            target,
            text,
            requires_ack,
        } => ws_captain::handle_issue_order(state, ctx, target, &text, requires_ack).await,
        M::AcknowledgeOrder { order_id } => {
            ws_captain::handle_acknowledge_order(state, ctx, order_id).await
        }
        M::GetOrders => ws_captain::handle_get_orders(state, ctx).await,
        M::SetAlertStatus { status } => {
            ws_captain::handle_set_alert_status(state, ctx, status).await
        }

        // Comms
        M::SendTransmission {
            channel,
            body,
            priority,
            from,
        } => ws_comms::handle_send_transmission(state, ctx, channel, body, priority, from).await,
        M::GetTransmissions { include_archived } => {
            ws_comms::handle_get_transmissions(state, ctx, include_archived).await
        }
        M::MarkTransmissionRead { transmission_id } => {
            ws_comms::handle_mark_read(state, ctx, transmission_id).await
        }
        M::ArchiveTransmission { transmission_id } => {
            ws_comms::handle_archive(state, ctx, transmission_id).await
        }

        // Sensors
        M::GetContacts => ws_sensors::handle_get_contacts(state, ctx).await,
        M::ScanContact { contact_id } => ws_sensors::handle_scan(state, ctx, contact_id).await,
        M::MarkContact {
            contact_id,
            disposition,
        } => ws_sensors::handle_mark(state, ctx, contact_id, disposition).await,
        M::SpawnContact {
            name,
            kind,
            range_band,
            bearing,
            disposition,
            health,
        } => {
            let new = crate::use_cases::sensors::NewContact {
                name,
                kind,
                range_band,
                bearing,
                disposition,
                health,
            };
            ws_sensors::handle_spawn(state, ctx, new).await
        }
        M::RemoveContact { contact_id } => ws_sensors::handle_remove(state, ctx, contact_id).await,
        M::ResetScan { contact_id } => ws_sensors::handle_reset_scan(state, ctx, contact_id).await,
        M::SetContactTargetable {
            contact_id,
            targetable,
        } => ws_sensors::handle_set_targetable(state, ctx, contact_id, targetable).await,

        // Repairs
        M::RepairSystem { system } => ws_repairs::handle_repair(state, ctx, system).await,
        M::DamageSystem { system, amount } => {
            ws_repairs::handle_damage_system(state, ctx, system, amount).await
        }
        M::ApplyHullDamage { amount } => ws_repairs::handle_hull_damage(state, ctx, amount).await,

        // Map
        M::ShareMap {
            center,
            sector,
            hex,
            zoom,
        } => ws_map::handle_share_map(state, ctx, ws_map::view(center, sector, hex, zoom)).await,
        M::UnshareMap => ws_map::handle_unshare_map(state, ctx).await,
        M::UpdateMapView {
            center,
            sector,
            hex,
            zoom,
        } => {
            ws_map::handle_update_map_view(state, ctx, ws_map::view(center, sector, hex, zoom))
                .await
        }

        // Library
        M::LibrarySearch { query } => ws_library::handle_search(state, ctx, &query).await,

        M::Heartbeat
        | M::CreateCampaign { .. }
        | M::ListCampaigns
        | M::JoinCampaign { .. }
        | M::SelectRole { .. }
        | M::JoinBridge { .. }
        | M::LeaveBridge
        | M::LeaveCampaign
        | M::Unknown => Err(CommandError::precondition(
            ErrorCode::BadRequest,
            "Not a bridge action",
        )),
    }
}

/// Event name used in server-side logs for lifecycle messages.
fn message_label(msg: &ClientMessage) -> &'static str {
    match msg {
        ClientMessage::Heartbeat => "heartbeat",
        ClientMessage::CreateCampaign { .. } => "createCampaign",
        ClientMessage::ListCampaigns => "listCampaigns",
        ClientMessage::JoinCampaign { .. } => "joinCampaign",
        ClientMessage::SelectRole { .. } => "selectRole",
        ClientMessage::JoinBridge { .. } => "joinBridge",
        ClientMessage::LeaveBridge => "leaveBridge",
        ClientMessage::LeaveCampaign => "leaveCampaign",
        ClientMessage::Unknown => "unknown",
        other => other.action_kind().map_or("unknown", |kind| kind.as_str()),
    }
}

/// Crew roster broadcast to everyone in the campaign.
pub(crate) async fn crew_changed(state: &WsState, campaign_id: CampaignId) -> CommandOutcome {
    let crew = state.connections.crew_of(campaign_id).await;
    CommandOutcome::campaign(campaign_id, ServerMessage::CrewChanged { campaign_id, crew })
}

/// Bridge-scoped outcome when there is a ship, campaign-scoped otherwise.
pub(crate) fn ship_or_campaign(ship_id: Option<ShipId>, campaign_id: CampaignId) -> Scope {
    match ship_id {
        Some(ship_id) => Scope::Bridge(ship_id),
        None => Scope::Campaign(campaign_id),
    }
}

// =============================================================================
// WebSocket Integration Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support;
