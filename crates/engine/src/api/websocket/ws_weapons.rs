use starbridge_domain::{ContactId, WeaponsMode};

use super::*;
use crate::use_cases::weapons::FireSelection;

pub(super) async fn handle_set_weapons_mode(
    state: &WsState,
    ctx: &CommandContext,
    mode: WeaponsMode,
) -> Result<CommandOutcome, CommandError> {
    let ship = state
        .app
        .use_cases
        .weapons
        .set_mode(ctx.ship_id()?, mode)
        .await?;
    Ok(CommandOutcome::bridge(
        ship.id,
        ServerMessage::WeaponsModeChanged {
            ship_id: ship.id,
            mode: ship.weapons_mode,
        },
    ))
}

/// One shot. The bridge sees the roll, the campaign sees the target's new
/// state, and a rules-of-engagement breach is pushed to the GM.
pub(super) async fn handle_fire(
    state: &WsState,
    ctx: &CommandContext,
    turret: usize,
    weapon: usize,
    target: ContactId,
) -> Result<CommandOutcome, CommandError> {
    let selection = FireSelection {
        turret,
        weapon,
        target,
    };
    let fired = state
        .app
        .use_cases
        .weapons
        .fire(
            ctx.ship_id()?,
            ctx.session.actor(),
            &ctx.session.label(),
            selection,
        )
        .await?;

    let ship_id = fired.ship.id;
    let mut outcome = CommandOutcome::bridge(
        ship_id,
        ServerMessage::WeaponFired {
            ship_id,
            turret,
            weapon,
            weapon_kind: fired.kind,
            target_id: fired.contact.id,
            attack: fired.attack,
            damage: fired.damage,
            target_destroyed: fired.destroyed,
            roe_violation: fired.roe_violation,
        },
    );

    let campaign = Scope::Campaign(ctx.campaign_id);
    if fired.destroyed {
        outcome.push(
            campaign,
            ServerMessage::ContactDestroyed {
                contact_id: fired.contact.id,
                name: fired.contact.name,
            },
        );
    } else if fired.damage > 0 {
        outcome.push(
            campaign,
            ServerMessage::ContactUpdated {
                contact: fired.contact,
            },
        );
    }

    if let Some(entry) = fired.roe_entry {
        outcome.push(
            Scope::CampaignGm(ctx.campaign_id),
            ServerMessage::LogEntryAdded { entry },
        );
    }
    Ok(outcome)
}

pub(super) async fn handle_end_turn(
    state: &WsState,
    ctx: &CommandContext,
) -> Result<CommandOutcome, CommandError> {
    let (ship, round) = state.app.use_cases.weapons.end_turn(ctx.ship_id()?).await?;
    Ok(CommandOutcome::bridge(
        ship.id,
        ServerMessage::TurnStarted {
            ship_id: ship.id,
            round,
        },
    ))
}
