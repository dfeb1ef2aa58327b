use std::collections::BTreeMap;

use starbridge_domain::{PowerPreset, ShipSystem};

use super::*;

pub(super) async fn handle_set_power(
    state: &WsState,
    ctx: &CommandContext,
    allocations: &BTreeMap<ShipSystem, u8>,
) -> Result<CommandOutcome, CommandError> {
    let ship = state
        .app
        .use_cases
        .power
        .set_power(ctx.ship_id()?, allocations)
        .await?;
    Ok(CommandOutcome::bridge(
        ship.id,
        ServerMessage::PowerChanged {
            ship_id: ship.id,
            power: ship.power,
            preset: None,
        },
    ))
}

pub(super) async fn handle_apply_power_preset(
    state: &WsState,
    ctx: &CommandContext,
    preset: PowerPreset,
) -> Result<CommandOutcome, CommandError> {
    let ship = state
        .app
        .use_cases
        .power
        .apply_preset(ctx.ship_id()?, preset)
        .await?;
    Ok(CommandOutcome::bridge(
        ship.id,
        ServerMessage::PowerChanged {
            ship_id: ship.id,
            power: ship.power,
            preset: Some(preset),
        },
    ))
}
