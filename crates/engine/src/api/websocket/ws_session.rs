use starbridge_domain::{CrewRole, PlayerSlotId, ShipTemplate, Subsystem};
use starbridge_shared::CampaignSummary;

use super::*;
use crate::api::session_registry::SessionPatch;

async fn current_session(
    state: &WsState,
    connection_id: ConnectionId,
) -> Result<Session, CommandError> {
    state
        .connections
        .session(connection_id)
        .await
        .ok_or_else(|| CommandError::Identity("Connection not found".into()))
}

fn joined_campaign(session: &Session) -> Result<CampaignId, CommandError> {
    session
        .campaign_id
        .ok_or_else(|| CommandError::Identity("Not in a campaign".into()))
}

/// Roster updates for the campaign left behind (if any) and the one joined.
async fn roster_updates(
    state: &WsState,
    previous: Option<CampaignId>,
    current: Option<CampaignId>,
) -> CommandOutcome {
    let mut outcome = CommandOutcome::new();
    if let Some(previous) = previous.filter(|p| Some(*p) != current) {
        outcome.extend(crew_changed(state, previous).await);
    }
    if let Some(current) = current {
        outcome.extend(crew_changed(state, current).await);
    }
    outcome
}

pub(super) async fn handle_create_campaign(
    state: &WsState,
    connection_id: ConnectionId,
    name: &str,
    gm_name: &str,
    ship_name: &str,
    template: ShipTemplate,
) -> Result<CommandOutcome, CommandError> {
    let previous = current_session(state, connection_id).await?.campaign_id;
    let (campaign, ship) = state
        .app
        .use_cases
        .campaign
        .create(name, gm_name, ship_name, template)
        .await
        .map_err(|e| CommandError::from_campaign(Subsystem::Session, e))?;

    state
        .connections
        .bind(
            connection_id,
            SessionPatch::reset()
                .campaign(campaign.id)
                .gm(true)
                .name(Some(campaign.gm_name.clone())),
        )
        .await?;

    let campaign_id = campaign.id;
    let mut outcome = CommandOutcome::reply(
        connection_id,
        ServerMessage::CampaignCreated { campaign, ship },
    );
    outcome.extend(roster_updates(state, previous, Some(campaign_id)).await);
    Ok(outcome)
}

pub(super) async fn handle_list_campaigns(
    state: &WsState,
    connection_id: ConnectionId,
) -> Result<CommandOutcome, CommandError> {
    let campaigns = state
        .app
        .use_cases
        .campaign
        .list()
        .await
        .map_err(|e| CommandError::from_campaign(Subsystem::Session, e))?;
    Ok(CommandOutcome::reply(
        connection_id,
        ServerMessage::CampaignList {
            campaigns: campaigns.iter().map(CampaignSummary::from).collect(),
        },
    ))
}

pub(super) async fn handle_join_campaign(
    state: &WsState,
    connection_id: ConnectionId,
    campaign_id: CampaignId,
    as_gm: bool,
    slot_id: Option<PlayerSlotId>,
) -> Result<CommandOutcome, CommandError> {
    let previous = current_session(state, connection_id).await?.campaign_id;
    let campaigns = &state.app.use_cases.campaign;
    let campaign = campaigns
        .get(campaign_id)
        .await
        .map_err(|e| CommandError::from_campaign(Subsystem::Session, e))?;

    let display_name = match slot_id {
        Some(slot_id) => {
            let slot = campaign.slot(slot_id).ok_or_else(|| {
                CommandError::precondition(ErrorCode::NotFound, "Player slot not found")
            })?;
            Some(slot.name.clone())
        }
        None if as_gm => Some(campaign.gm_name.clone()),
        None => None,
    };

    let session = state
        .connections
        .bind(
            connection_id,
            SessionPatch::reset()
                .campaign(campaign_id)
                .gm(as_gm)
                .slot(slot_id)
                .name(display_name),
        )
        .await?;

    let ships = campaigns
        .ships(campaign_id)
        .await
        .map_err(|e| CommandError::from_campaign(Subsystem::Session, e))?;

    tracing::info!(
        connection_id = %connection_id,
        campaign_id = %campaign_id,
        is_gm = session.is_gm,
        "Joined campaign"
    );

    let mut outcome = CommandOutcome::reply(
        connection_id,
        ServerMessage::CampaignJoined {
            campaign,
            ships,
            is_gm: session.is_gm,
        },
    );
    outcome.extend(roster_updates(state, previous, Some(campaign_id)).await);
    Ok(outcome)
}

pub(super) async fn handle_select_role(
    state: &WsState,
    connection_id: ConnectionId,
    ship_id: ShipId,
    role: CrewRole,
) -> Result<CommandOutcome, CommandError> {
    let campaign_id = joined_campaign(&current_session(state, connection_id).await?)?;
    state
        .app
        .use_cases
        .campaign
        .ship_in_campaign(campaign_id, ship_id)
        .await
        .map_err(|e| CommandError::from_campaign(Subsystem::Session, e))?;

    state
        .connections
        .bind(connection_id, SessionPatch::default().ship(ship_id).role(role))
        .await?;

    tracing::info!(
        connection_id = %connection_id,
        ship_id = %ship_id,
        role = ?role,
        "Crew role selected"
    );

    let mut outcome =
        CommandOutcome::reply(connection_id, ServerMessage::RoleSelected { ship_id, role });
    outcome.extend(crew_changed(state, campaign_id).await);
    Ok(outcome)
}

/// Full bridge snapshot. Crew may only join the ship their role is on; the
/// GM may observe any ship of the campaign.
pub(super) async fn handle_join_bridge(
    state: &WsState,
    connection_id: ConnectionId,
    ship_id: Option<ShipId>,
) -> Result<CommandOutcome, CommandError> {
    let session = current_session(state, connection_id).await?;
    let campaign_id = joined_campaign(&session)?;
    let target = ship_id
        .or(session.ship_id)
        .ok_or_else(|| CommandError::Identity("Not on a ship".into()))?;
    if !session.is_gm && session.ship_id != Some(target) {
        return Err(CommandError::Forbidden(
            "Select a role on that ship before joining its bridge".into(),
        ));
    }

    let ship = state
        .app
        .use_cases
        .campaign
        .ship_in_campaign(campaign_id, target)
        .await
        .map_err(|e| CommandError::from_campaign(Subsystem::Session, e))?;

    let moved = session.ship_id != Some(target);
    let patch = if moved {
        SessionPatch::default().ship(target).clear_role()
    } else {
        SessionPatch::default()
    };
    state.connections.bind(connection_id, patch).await?;

    let contacts = state.app.use_cases.sensors.list(campaign_id).await?;
    let orders = state.app.use_cases.orders.list(target).await?;
    let crew = state.connections.crew_of(campaign_id).await;

    let mut outcome = CommandOutcome::reply(
        connection_id,
        ServerMessage::BridgeJoined {
            ship,
            contacts,
            orders,
            crew,
        },
    );
    if moved {
        outcome.extend(crew_changed(state, campaign_id).await);
    }
    Ok(outcome)
}

pub(super) async fn handle_leave_bridge(
    state: &WsState,
    connection_id: ConnectionId,
) -> Result<CommandOutcome, CommandError> {
    let campaign_id = joined_campaign(&current_session(state, connection_id).await?)?;
    state
        .connections
        .bind(connection_id, SessionPatch::default().clear_ship())
        .await?;
    Ok(crew_changed(state, campaign_id).await)
}

pub(super) async fn handle_leave_campaign(
    state: &WsState,
    connection_id: ConnectionId,
) -> Result<CommandOutcome, CommandError> {
    let previous = current_session(state, connection_id).await?.campaign_id;
    state
        .connections
        .bind(connection_id, SessionPatch::reset())
        .await?;
    Ok(roster_updates(state, previous, None).await)
}

/// Release the session and tell the rest of its campaign.
pub(super) async fn handle_disconnect(state: &WsState, connection_id: ConnectionId) {
    let Some(session) = state.connections.unregister(connection_id).await else {
        return;
    };
    if let Some(campaign_id) = session.campaign_id {
        let outcome = crew_changed(state, campaign_id).await;
        state.connections.deliver(outcome).await;
    }
}
