use starbridge_domain::{PowerPreset, Ship, ShipTemplate};

use super::*;

/// GM adds a second scout to the campaign.
async fn add_second_ship(gm_ws: &mut TestSocket) -> Ship {
    ws_send_client(
        gm_ws,
        &ClientMessage::AddShip {
            name: "Kestrel".into(),
            template: ShipTemplate::Scout,
        },
    )
    .await;

    match ws_expect_message(gm_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::CampaignUpdated { .. })
    })
    .await
    {
        ServerMessage::CampaignUpdated { ships, .. } => ships
            .into_iter()
            .find(|s| s.name == "Kestrel")
            .expect("new ship listed"),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn when_one_bridge_changes_power_then_other_ship_in_campaign_does_not_hear_it() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut beowulf_ws = ws_connect(addr).await;
    let mut kestrel_ws = ws_connect(addr).await;

    let (campaign, beowulf) = create_campaign(&mut gm_ws).await;
    let kestrel = add_second_ship(&mut gm_ws).await;

    join_as_crew(&mut beowulf_ws, campaign.id, beowulf.id, CrewRole::Engineer).await;
    join_as_crew(&mut kestrel_ws, campaign.id, kestrel.id, CrewRole::Engineer).await;

    ws_send_client(
        &mut beowulf_ws,
        &ClientMessage::ApplyPowerPreset {
            preset: PowerPreset::Combat,
        },
    )
    .await;

    match ws_expect_message(&mut beowulf_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::PowerChanged { .. })
    })
    .await
    {
        ServerMessage::PowerChanged {
            ship_id, preset, ..
        } => {
            assert_eq!(ship_id, beowulf.id);
            assert_eq!(preset, Some(PowerPreset::Combat));
        }
        other => panic!("unexpected message: {other:?}"),
    }

    ws_expect_no_message_matching(&mut kestrel_ws, QUIET_PERIOD, |m| {
        matches!(m, ServerMessage::PowerChanged { .. })
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_gm_advances_time_then_every_bridge_in_campaign_hears_it() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut beowulf_ws = ws_connect(addr).await;
    let mut kestrel_ws = ws_connect(addr).await;
    let mut outsider_ws = ws_connect(addr).await;

    let (campaign, beowulf) = create_campaign(&mut gm_ws).await;
    let kestrel = add_second_ship(&mut gm_ws).await;
    join_as_crew(&mut beowulf_ws, campaign.id, beowulf.id, CrewRole::Pilot).await;
    join_as_crew(&mut kestrel_ws, campaign.id, kestrel.id, CrewRole::Pilot).await;

    // A second campaign that must stay quiet.
    create_campaign(&mut outsider_ws).await;

    ws_send_client(
        &mut gm_ws,
        &ClientMessage::AdvanceTime {
            hours: 8,
            minutes: 0,
        },
    )
    .await;

    for ws in [&mut gm_ws, &mut beowulf_ws, &mut kestrel_ws] {
        ws_expect_message(ws, RECV_TIMEOUT, |m| {
            matches!(m, ServerMessage::TimeAdvanced { .. })
        })
        .await;
    }
    ws_expect_no_message_matching(&mut outsider_ws, QUIET_PERIOD, |m| {
        matches!(m, ServerMessage::TimeAdvanced { .. })
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_crew_disconnects_then_campaign_roster_drops_them() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state.clone()).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut pilot_ws = ws_connect(addr).await;

    let (campaign, ship) = create_campaign(&mut gm_ws).await;
    join_as_crew(&mut pilot_ws, campaign.id, ship.id, CrewRole::Pilot).await;
    assert_eq!(state.connections.crew_of(campaign.id).await.len(), 2);

    pilot_ws.close(None).await.expect("close");

    ws_expect_message(&mut gm_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::CrewChanged { crew, .. } if crew.len() == 1)
    })
    .await;
    assert_eq!(state.connections.crew_of(campaign.id).await.len(), 1);

    server.abort();
}
