use starbridge_domain::ShipSystem;

use super::*;

pub(super) async fn handle_repair(
    state: &WsState,
    ctx: &CommandContext,
    system: ShipSystem,
) -> Result<CommandOutcome, CommandError> {
    let attempt = state
        .app
        .use_cases
        .repairs
        .repair(ctx.ship_id()?, system, &ctx.session.label())
        .await?;
    let ship_id = attempt.ship.id;
    Ok(CommandOutcome::bridge(
        ship_id,
        ServerMessage::SystemsChanged {
            ship_id,
            system: attempt.system,
            systems: attempt.ship.systems,
            repair_check: Some(attempt.check),
        },
    ))
}

pub(super) async fn handle_damage_system(
    state: &WsState,
    ctx: &CommandContext,
    system: ShipSystem,
    amount: u8,
) -> Result<CommandOutcome, CommandError> {
    let ship = state
        .app
        .use_cases
        .repairs
        .damage_system(ctx.ship_id()?, system, amount)
        .await?;
    let ship_id = ship.id;
    let destroyed = ship.systems.is_destroyed(system);
    let mut outcome = CommandOutcome::bridge(
        ship_id,
        ServerMessage::SystemsChanged {
            ship_id,
            system,
            systems: ship.systems,
            repair_check: None,
        },
    );
    // Destroyed systems lose their power allocation
    if destroyed {
        outcome.push(
            Scope::Bridge(ship_id),
            ServerMessage::PowerChanged {
                ship_id,
                power: ship.power,
                preset: None,
            },
        );
    }
    Ok(outcome)
}

pub(super) async fn handle_hull_damage(
    state: &WsState,
    ctx: &CommandContext,
    amount: u32,
) -> Result<CommandOutcome, CommandError> {
    let ship = state
        .app
        .use_cases
        .repairs
        .hull_damage(ctx.ship_id()?, amount)
        .await?;
    Ok(CommandOutcome::bridge(
        ship.id,
        ServerMessage::HullChanged {
            ship_id: ship.id,
            hull: ship.hull,
        },
    ))
}
