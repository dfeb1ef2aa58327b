use starbridge_domain::{NewTransmission, Transmission, TransmissionId, TransmissionPriority};

use super::*;

/// Bridge-channel traffic stays on its ship; everything else is campaign-wide.
fn audience(transmission: &Transmission) -> Scope {
    let ship_id = transmission
        .ship_id
        .filter(|_| transmission.is_bridge_traffic());
    ship_or_campaign(ship_id, transmission.campaign_id)
}

pub(super) async fn handle_send_transmission(
    state: &WsState,
    ctx: &CommandContext,
    channel: String,
    body: String,
    priority: TransmissionPriority,
    from: Option<String>,
) -> Result<CommandOutcome, CommandError> {
    let sender = from
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| ctx.session.label());
    let transmission = state
        .app
        .use_cases
        .comms
        .send(NewTransmission {
            campaign_id: ctx.campaign_id,
            ship_id: Some(ctx.ship_id()?),
            channel,
            sender,
            body,
            priority,
        })
        .await?;

    let scope = audience(&transmission);
    Ok(CommandOutcome::new().to(scope, ServerMessage::TransmissionReceived { transmission }))
}

pub(super) async fn handle_get_transmissions(
    state: &WsState,
    ctx: &CommandContext,
    include_archived: bool,
) -> Result<CommandOutcome, CommandError> {
    let transmissions = state
        .app
        .use_cases
        .comms
        .list(ctx.campaign_id, include_archived)
        .await?;
    Ok(ctx.reply(ServerMessage::TransmissionList { transmissions }))
}

pub(super) async fn handle_mark_read(
    state: &WsState,
    ctx: &CommandContext,
    transmission_id: TransmissionId,
) -> Result<CommandOutcome, CommandError> {
    let (transmission, changed) = state
        .app
        .use_cases
        .comms
        .mark_read(ctx.campaign_id, transmission_id)
        .await?;
    Ok(updated(ctx, transmission, changed))
}

pub(super) async fn handle_archive(
    state: &WsState,
    ctx: &CommandContext,
    transmission_id: TransmissionId,
) -> Result<CommandOutcome, CommandError> {
    let (transmission, changed) = state
        .app
        .use_cases
        .comms
        .archive(ctx.campaign_id, transmission_id)
        .await?;
    Ok(updated(ctx, transmission, changed))
}

fn updated(ctx: &CommandContext, transmission: Transmission, changed: bool) -> CommandOutcome {
    if !changed {
        return ctx.reply(ServerMessage::TransmissionUpdated { transmission });
    }
    let scope = audience(&transmission);
    CommandOutcome::new().to(scope, ServerMessage::TransmissionUpdated { transmission })
}
