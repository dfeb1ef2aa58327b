use starbridge_domain::{Contact, ContactKind, Disposition, LogEntryKind, RangeBand};

use super::*;

/// GM places a neutral contact in range of the scout's pulse laser.
async fn spawn_target(gm_ws: &mut TestSocket) -> Contact {
    ws_send_client(
        gm_ws,
        &ClientMessage::SpawnContact {
            name: "Free Trader Kesh".into(),
            kind: ContactKind::Ship,
            range_band: RangeBand::Medium,
            bearing: 90,
            disposition: Disposition::Neutral,
            health: Some(100),
        },
    )
    .await;

    match ws_expect_message(gm_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::ContactUpdated { .. })
    })
    .await
    {
        ServerMessage::ContactUpdated { contact } => contact,
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn when_gunner_fires_on_hold_then_shot_resolves_and_gm_is_told_of_the_violation() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut gunner_ws = ws_connect(addr).await;

    let (campaign, ship) = create_campaign(&mut gm_ws).await;
    join_as_crew(&mut gunner_ws, campaign.id, ship.id, CrewRole::Gunner).await;
    let target = spawn_target(&mut gm_ws).await;

    ws_send_client(
        &mut gunner_ws,
        &ClientMessage::Fire {
            turret: 0,
            target: target.id,
            weapon: 0,
        },
    )
    .await;

    match ws_expect_message(&mut gunner_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::WeaponFired { .. })
    })
    .await
    {
        ServerMessage::WeaponFired {
            target_id,
            roe_violation,
            ..
        } => {
            assert_eq!(target_id, target.id);
            assert!(roe_violation);
        }
        other => panic!("unexpected message: {other:?}"),
    }

    match ws_expect_message(&mut gm_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::LogEntryAdded { .. })
    })
    .await
    {
        ServerMessage::LogEntryAdded { entry } => {
            assert_eq!(entry.kind, LogEntryKind::RoeViolation);
            assert_eq!(entry.ship_id, ship.id);
        }
        other => panic!("unexpected message: {other:?}"),
    }

    // Only the GM sees violation reports.
    ws_expect_no_message_matching(&mut gunner_ws, QUIET_PERIOD, |m| {
        matches!(m, ServerMessage::LogEntryAdded { .. })
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_captain_fires_on_hold_then_request_is_refused() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut captain_ws = ws_connect(addr).await;

    let (campaign, ship) = create_campaign(&mut gm_ws).await;
    join_as_crew(&mut captain_ws, campaign.id, ship.id, CrewRole::Captain).await;
    let target = spawn_target(&mut gm_ws).await;

    ws_send_client(
        &mut captain_ws,
        &ClientMessage::Fire {
            turret: 0,
            target: target.id,
            weapon: 0,
        },
    )
    .await;

    let (code, message, _) = ws_expect_error(&mut captain_ws).await;
    assert_eq!(code, ErrorCode::Forbidden);
    assert_eq!(message, "Weapons are on hold");

    ws_expect_no_message_matching(&mut gm_ws, QUIET_PERIOD, |m| {
        matches!(m, ServerMessage::WeaponFired { .. })
    })
    .await;

    server.abort();
}
