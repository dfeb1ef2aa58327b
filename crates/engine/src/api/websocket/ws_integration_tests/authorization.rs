use starbridge_domain::{FuelSourceId, MapPoint};

use super::*;

#[tokio::test]
async fn when_gunner_tries_to_refuel_then_denial_names_the_allowed_stations() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut gunner_ws = ws_connect(addr).await;

    let (campaign, ship) = create_campaign(&mut gm_ws).await;
    join_as_crew(&mut gunner_ws, campaign.id, ship.id, CrewRole::Gunner).await;

    ws_send_client(
        &mut gunner_ws,
        &ClientMessage::Refuel {
            source_id: FuelSourceId::new(),
            tons: 5,
            fill_available: false,
        },
    )
    .await;

    let (code, message, _) = ws_expect_error(&mut gunner_ws).await;
    assert_eq!(code, ErrorCode::Forbidden);
    assert_eq!(message, "Only engineer or pilot can manage refueling");

    server.abort();
}

#[tokio::test]
async fn when_connection_has_not_joined_then_bridge_actions_are_refused() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state).await;

    let mut ws = ws_connect(addr).await;
    ws_send_client(&mut ws, &ClientMessage::GetFuelStatus).await;

    let (code, message, _) = ws_expect_error(&mut ws).await;
    assert_eq!(code, ErrorCode::NotJoined);
    assert_eq!(message, "Not in a campaign");

    server.abort();
}

#[tokio::test]
async fn when_crew_pans_the_shared_map_then_nothing_is_sent_back() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut pilot_ws = ws_connect(addr).await;

    let (campaign, ship) = create_campaign(&mut gm_ws).await;
    join_as_crew(&mut pilot_ws, campaign.id, ship.id, CrewRole::Pilot).await;

    ws_send_client(
        &mut pilot_ws,
        &ClientMessage::UpdateMapView {
            center: MapPoint { x: 1.0, y: 2.0 },
            sector: "Spinward Marches".into(),
            hex: "1910".into(),
            zoom: 2.0,
        },
    )
    .await;

    ws_expect_no_message_matching(&mut pilot_ws, QUIET_PERIOD, |m| {
        matches!(
            m,
            ServerMessage::Error { .. } | ServerMessage::MapViewUpdated { .. }
        )
    })
    .await;
    ws_expect_no_message_matching(&mut gm_ws, QUIET_PERIOD, |m| {
        matches!(m, ServerMessage::MapViewUpdated { .. })
    })
    .await;

    // Connection is still serviced afterwards.
    ws_send_client(&mut pilot_ws, &ClientMessage::Heartbeat).await;
    ws_expect_message(&mut pilot_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::Pong)
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_second_gm_joins_then_join_is_rejected() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut other_ws = ws_connect(addr).await;

    let (campaign, _ship) = create_campaign(&mut gm_ws).await;

    ws_send_client(
        &mut other_ws,
        &ClientMessage::JoinCampaign {
            campaign_id: campaign.id,
            as_gm: true,
            slot_id: None,
        },
    )
    .await;

    let (code, message, _) = ws_expect_error(&mut other_ws).await;
    assert_eq!(code, ErrorCode::Conflict);
    assert_eq!(message, "Campaign already has a GM connected");

    server.abort();
}

#[tokio::test]
async fn when_station_is_taken_then_second_captain_is_rejected_but_gunners_share() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut first_ws = ws_connect(addr).await;
    let mut second_ws = ws_connect(addr).await;

    let (campaign, ship) = create_campaign(&mut gm_ws).await;
    join_as_crew(&mut first_ws, campaign.id, ship.id, CrewRole::Captain).await;

    ws_send_client(
        &mut second_ws,
        &ClientMessage::JoinCampaign {
            campaign_id: campaign.id,
            as_gm: false,
            slot_id: None,
        },
    )
    .await;
    ws_expect_message(&mut second_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::CampaignJoined { .. })
    })
    .await;

    ws_send_client(
        &mut second_ws,
        &ClientMessage::SelectRole {
            ship_id: ship.id,
            role: CrewRole::Captain,
        },
    )
    .await;
    let (code, message, _) = ws_expect_error(&mut second_ws).await;
    assert_eq!(code, ErrorCode::Conflict);
    assert_eq!(message, "The captain station is already taken");

    ws_send_client(
        &mut second_ws,
        &ClientMessage::SelectRole {
            ship_id: ship.id,
            role: CrewRole::Gunner,
        },
    )
    .await;
    ws_expect_message(&mut second_ws, RECV_TIMEOUT, |m| {
        matches!(
            m,
            ServerMessage::RoleSelected {
                role: CrewRole::Gunner,
                ..
            }
        )
    })
    .await;

    server.abort();
}
