use starbridge_domain::{AlertStatus, OrderId, OrderTarget};

use super::*;

pub(super) async fn handle_issue_order(
    state: &WsState,
    ctx: &CommandContext,
    target: OrderTarget,
    text: &str,
    requires_ack: bool,
) -> Result<CommandOutcome, CommandError> {
    let ship_id = ctx.ship_id()?;
    let order = state
        .app
        .use_cases
        .orders
        .issue(ship_id, target, text, requires_ack, &ctx.session.label())
        .await?;
    Ok(CommandOutcome::bridge(
        ship_id,
        ServerMessage::OrderIssued { order },
    ))
}

/// A repeat acknowledgement is answered to the sender only.
pub(super) async fn handle_acknowledge_order(
    state: &WsState,
    ctx: &CommandContext,
    order_id: OrderId,
) -> Result<CommandOutcome, CommandError> {
    let ship_id = ctx.ship_id()?;
    let (order, changed) = state
        .app
        .use_cases
        .orders
        .acknowledge(
            ship_id,
            order_id,
            ctx.session.actor(),
            &ctx.session.label(),
        )
        .await?;

    let message = ServerMessage::OrderAcknowledged { order };
    Ok(if changed {
        CommandOutcome::bridge(ship_id, message)
    } else {
        ctx.reply(message)
    })
}

pub(super) async fn handle_get_orders(
    state: &WsState,
    ctx: &CommandContext,
) -> Result<CommandOutcome, CommandError> {
    let ship_id = ctx.ship_id()?;
    let orders = state.app.use_cases.orders.list(ship_id).await?;
    Ok(ctx.reply(ServerMessage::OrderList { ship_id, orders }))
}

pub(super) async fn handle_set_alert_status(
    state: &WsState,
    ctx: &CommandContext,
    status: AlertStatus,
) -> Result<CommandOutcome, CommandError> {
    let ship = state
        .app
        .use_cases
        .orders
        .set_alert(ctx.ship_id()?, status)
        .await?;
    Ok(CommandOutcome::bridge(
        ship.id,
        ServerMessage::AlertStatusChanged {
            ship_id: ship.id,
            status: ship.alert_status,
        },
    ))
}
