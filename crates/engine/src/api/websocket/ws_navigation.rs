use starbridge_domain::{ContactId, ManeuverDirection};

use super::*;

pub(super) async fn handle_plot_jump(
    state: &WsState,
    ctx: &CommandContext,
    distance: u32,
) -> Result<CommandOutcome, CommandError> {
    let ship_id = ctx.ship_id()?;
    let plan = state.app.use_cases.navigation.plot(ship_id, distance).await?;
    Ok(ctx.reply(ServerMessage::JumpPlotted { ship_id, plan }))
}

/// The bridge sees the jump; the whole campaign sees where and when it ended.
pub(super) async fn handle_jump(
    state: &WsState,
    ctx: &CommandContext,
    distance: u32,
    sector: &str,
    hex: &str,
) -> Result<CommandOutcome, CommandError> {
    let outcome = state
        .app
        .use_cases
        .navigation
        .jump(ctx.ship_id()?, distance, sector, hex, &ctx.session.label())
        .await?;

    let ship_id = outcome.ship.id;
    let campaign = outcome.campaign;
    Ok(CommandOutcome::bridge(
        ship_id,
        ServerMessage::JumpCompleted {
            ship_id,
            plan: outcome.plan,
            location: campaign.location.clone(),
            fuel: outcome.ship.fuel,
        },
    )
    .to(
        Scope::Campaign(ctx.campaign_id),
        ServerMessage::LocationChanged {
            location: campaign.location,
        },
    )
    .to(
        Scope::Campaign(ctx.campaign_id),
        ServerMessage::TimeAdvanced {
            current_time: campaign.current_time,
            date: campaign.current_time.display(),
        },
    ))
}

pub(super) async fn handle_maneuver(
    state: &WsState,
    ctx: &CommandContext,
    contact_id: ContactId,
    direction: ManeuverDirection,
) -> Result<CommandOutcome, CommandError> {
    let contact = state
        .app
        .use_cases
        .navigation
        .maneuver(ctx.ship_id()?, contact_id, direction)
        .await?;
    Ok(CommandOutcome::campaign(
        ctx.campaign_id,
        ServerMessage::ContactUpdated { contact },
    ))
}
