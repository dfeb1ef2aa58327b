use starbridge_domain::{ContactId, Disposition};

use super::*;
use crate::use_cases::sensors::NewContact;

pub(super) async fn handle_get_contacts(
    state: &WsState,
    ctx: &CommandContext,
) -> Result<CommandOutcome, CommandError> {
    let contacts = state.app.use_cases.sensors.list(ctx.campaign_id).await?;
    Ok(ctx.reply(ServerMessage::ContactList { contacts }))
}

/// Scanning at the ceiling succeeds without a broadcast.
pub(super) async fn handle_scan(
    state: &WsState,
    ctx: &CommandContext,
    contact_id: ContactId,
) -> Result<CommandOutcome, CommandError> {
    let (contact, advanced) = state
        .app
        .use_cases
        .sensors
        .scan(ctx.ship_id()?, contact_id)
        .await?;
    let message = ServerMessage::ContactUpdated { contact };
    Ok(if advanced {
        CommandOutcome::campaign(ctx.campaign_id, message)
    } else {
        ctx.reply(message)
    })
}

pub(super) async fn handle_mark(
    state: &WsState,
    ctx: &CommandContext,
    contact_id: ContactId,
    disposition: Disposition,
) -> Result<CommandOutcome, CommandError> {
    let contact = state
        .app
        .use_cases
        .sensors
        .mark(ctx.campaign_id, contact_id, disposition)
        .await?;
    Ok(contact_updated(ctx, contact))
}

pub(super) async fn handle_spawn(
    state: &WsState,
    ctx: &CommandContext,
    new: NewContact,
) -> Result<CommandOutcome, CommandError> {
    let contact = state
        .app
        .use_cases
        .sensors
        .spawn(ctx.campaign_id, new)
        .await?;
    Ok(contact_updated(ctx, contact))
}

pub(super) async fn handle_remove(
    state: &WsState,
    ctx: &CommandContext,
    contact_id: ContactId,
) -> Result<CommandOutcome, CommandError> {
    let contact_id = state
        .app
        .use_cases
        .sensors
        .remove(ctx.campaign_id, contact_id)
        .await?;
    Ok(CommandOutcome::campaign(
        ctx.campaign_id,
        ServerMessage::ContactRemoved { contact_id },
    ))
}

pub(super) async fn handle_reset_scan(
    state: &WsState,
    ctx: &CommandContext,
    contact_id: ContactId,
) -> Result<CommandOutcome, CommandError> {
    let contact = state
        .app
        .use_cases
        .sensors
        .reset_scan(ctx.campaign_id, contact_id)
        .await?;
    Ok(contact_updated(ctx, contact))
}

pub(super) async fn handle_set_targetable(
    state: &WsState,
    ctx: &CommandContext,
    contact_id: ContactId,
    targetable: bool,
) -> Result<CommandOutcome, CommandError> {
    let contact = state
        .app
        .use_cases
        .sensors
        .set_targetable(ctx.campaign_id, contact_id, targetable)
        .await?;
    Ok(contact_updated(ctx, contact))
}

fn contact_updated(ctx: &CommandContext, contact: starbridge_domain::Contact) -> CommandOutcome {
    CommandOutcome::campaign(ctx.campaign_id, ServerMessage::ContactUpdated { contact })
}
