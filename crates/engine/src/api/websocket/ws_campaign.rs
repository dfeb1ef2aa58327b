use starbridge_domain::{ShipTemplate, Subsystem};

use super::*;

pub(super) async fn handle_advance_time(
    state: &WsState,
    ctx: &CommandContext,
    hours: u64,
    minutes: u64,
) -> Result<CommandOutcome, CommandError> {
    let campaign = state
        .app
        .use_cases
        .campaign
        .advance_time(ctx.campaign_id, hours, minutes)
        .await?;
    Ok(CommandOutcome::campaign(
        ctx.campaign_id,
        ServerMessage::TimeAdvanced {
            current_time: campaign.current_time,
            date: campaign.current_time.display(),
        },
    ))
}

pub(super) async fn handle_set_location(
    state: &WsState,
    ctx: &CommandContext,
    sector: &str,
    hex: &str,
) -> Result<CommandOutcome, CommandError> {
    let campaign = state
        .app
        .use_cases
        .campaign
        .set_location(ctx.campaign_id, sector, hex)
        .await?;
    tracing::info!(
        campaign_id = %ctx.campaign_id,
        sector = %campaign.location.sector,
        hex = %campaign.location.hex,
        "Campaign location set"
    );
    Ok(CommandOutcome::campaign(
        ctx.campaign_id,
        ServerMessage::LocationChanged {
            location: campaign.location,
        },
    ))
}

pub(super) async fn handle_add_player_slot(
    state: &WsState,
    ctx: &CommandContext,
    name: &str,
) -> Result<CommandOutcome, CommandError> {
    let campaigns = &state.app.use_cases.campaign;
    let (campaign, slot) = campaigns.add_player_slot(ctx.campaign_id, name).await?;
    let ships = campaigns.ships(ctx.campaign_id).await?;
    tracing::debug!(campaign_id = %ctx.campaign_id, slot_id = %slot.id, "Player slot added");
    Ok(CommandOutcome::campaign(
        ctx.campaign_id,
        ServerMessage::CampaignUpdated { campaign, ships },
    ))
}

pub(super) async fn handle_add_ship(
    state: &WsState,
    ctx: &CommandContext,
    name: &str,
    template: ShipTemplate,
) -> Result<CommandOutcome, CommandError> {
    let (campaign, ships) = state
        .app
        .use_cases
        .campaign
        .add_ship(ctx.campaign_id, name, template)
        .await?;
    Ok(CommandOutcome::campaign(
        ctx.campaign_id,
        ServerMessage::CampaignUpdated { campaign, ships },
    ))
}

pub(super) async fn handle_get_ship_log(
    state: &WsState,
    ctx: &CommandContext,
    limit: Option<u32>,
) -> Result<CommandOutcome, CommandError> {
    let ship_id = ctx.ship_id()?;
    let entries = state
        .app
        .use_cases
        .ship_log
        .recent(ship_id, limit)
        .await
        .map_err(|e| CommandError::from_repo(Subsystem::Campaign, e))?;
    Ok(ctx.reply(ServerMessage::ShipLog { ship_id, entries }))
}
