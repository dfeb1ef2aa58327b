use starbridge_domain::{MapPoint, MapView};

use super::*;

pub(super) fn view(center: MapPoint, sector: String, hex: String, zoom: f64) -> MapView {
    MapView {
        center,
        sector,
        hex,
        zoom,
    }
}

pub(super) async fn handle_share_map(
    state: &WsState,
    ctx: &CommandContext,
    view: MapView,
) -> Result<CommandOutcome, CommandError> {
    let view = state.app.use_cases.map.share(ctx.campaign_id, view).await?;
    tracing::info!(campaign_id = %ctx.campaign_id, sector = %view.sector, "Map shared");
    Ok(CommandOutcome::campaign(
        ctx.campaign_id,
        ServerMessage::MapShared {
            view,
            auto_switch: true,
        },
    ))
}

pub(super) async fn handle_unshare_map(
    state: &WsState,
    ctx: &CommandContext,
) -> Result<CommandOutcome, CommandError> {
    let was_shared = state.app.use_cases.map.unshare(ctx.campaign_id).await?;
    Ok(if was_shared {
        CommandOutcome::campaign(ctx.campaign_id, ServerMessage::MapUnshared)
    } else {
        ctx.reply(ServerMessage::MapUnshared)
    })
}

pub(super) async fn handle_update_map_view(
    state: &WsState,
    ctx: &CommandContext,
    view: MapView,
) -> Result<CommandOutcome, CommandError> {
    let view = state
        .app
        .use_cases
        .map
        .update_view(ctx.campaign_id, view)
        .await?;
    Ok(CommandOutcome::campaign(
        ctx.campaign_id,
        ServerMessage::MapViewUpdated { view },
    ))
}
