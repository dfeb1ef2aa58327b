use starbridge_domain::{FuelSourceId, FuelSourceKind};

use super::*;

pub(super) async fn handle_get_fuel_status(
    state: &WsState,
    ctx: &CommandContext,
) -> Result<CommandOutcome, CommandError> {
    let (ship, jump_fuel_per_parsec) = state.app.use_cases.fuel.status(ctx.ship_id()?).await?;
    Ok(ctx.reply(ServerMessage::FuelStatus {
        ship_id: ship.id,
        fuel: ship.fuel,
        jump_fuel_per_parsec,
    }))
}

pub(super) async fn handle_get_fuel_sources(
    state: &WsState,
    ctx: &CommandContext,
) -> Result<CommandOutcome, CommandError> {
    let sources = state.app.use_cases.fuel.sources(ctx.campaign_id).await?;
    Ok(ctx.reply(ServerMessage::FuelSources { sources }))
}

pub(super) async fn handle_add_fuel_source(
    state: &WsState,
    ctx: &CommandContext,
    name: &str,
    kind: FuelSourceKind,
    available_tons: Option<u32>,
) -> Result<CommandOutcome, CommandError> {
    let sources = state
        .app
        .use_cases
        .fuel
        .add_source(ctx.campaign_id, name, kind, available_tons)
        .await?;
    Ok(CommandOutcome::campaign(
        ctx.campaign_id,
        ServerMessage::FuelSources { sources },
    ))
}

pub(super) async fn handle_refuel(
    state: &WsState,
    ctx: &CommandContext,
    source_id: FuelSourceId,
    tons: u32,
    fill_available: bool,
) -> Result<CommandOutcome, CommandError> {
    let refuelled = state
        .app
        .use_cases
        .fuel
        .refuel(
            ctx.ship_id()?,
            source_id,
            tons,
            fill_available,
            &ctx.session.label(),
        )
        .await?;

    let ship_id = refuelled.ship.id;
    Ok(CommandOutcome::bridge(
        ship_id,
        ServerMessage::Refueled {
            ship_id,
            source: refuelled.source,
            tons: refuelled.tons,
            grade: refuelled.grade,
            fuel: refuelled.ship.fuel,
        },
    ))
}

pub(super) async fn handle_start_fuel_processing(
    state: &WsState,
    ctx: &CommandContext,
    tons: u32,
) -> Result<CommandOutcome, CommandError> {
    let started = state
        .app
        .use_cases
        .fuel
        .start_processing(ctx.ship_id()?, tons, &ctx.session.label())
        .await?;
    let ship_id = started.ship.id;
    Ok(CommandOutcome::bridge(
        ship_id,
        ServerMessage::FuelProcessingStarted {
            ship_id,
            fuel: started.ship.fuel,
            hours_required: started.hours_required,
        },
    ))
}

/// Status goes to the requester; completion is announced to the whole bridge.
pub(super) async fn handle_check_fuel_processing(
    state: &WsState,
    ctx: &CommandContext,
) -> Result<CommandOutcome, CommandError> {
    let (ship, progress) = state
        .app
        .use_cases
        .fuel
        .check_processing(ctx.ship_id()?)
        .await?;

    let mut outcome = ctx.reply(ServerMessage::FuelProcessingStatus {
        ship_id: ship.id,
        fuel: ship.fuel,
        progress,
    });
    if progress.is_some_and(|p| p.complete) {
        outcome.push(
            Scope::Bridge(ship.id),
            ServerMessage::FuelProcessingCompleted {
                ship_id: ship.id,
                fuel: ship.fuel,
            },
        );
    }
    Ok(outcome)
}
