use starbridge_domain::{FuelGrade, FuelSourceId, FuelSourceKind};

use super::*;

/// GM registers an unlimited refined source and reads its id back.
async fn add_refined_source(gm_ws: &mut TestSocket) -> FuelSourceId {
    ws_send_client(
        gm_ws,
        &ClientMessage::AddFuelSource {
            name: "Highport".into(),
            kind: FuelSourceKind::Refined,
            available_tons: None,
        },
    )
    .await;

    match ws_expect_message(gm_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::FuelSources { .. })
    })
    .await
    {
        ServerMessage::FuelSources { sources } => {
            sources
                .iter()
                .find(|s| s.name == "Highport")
                .expect("source listed")
                .id
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn when_refuel_exceeds_free_capacity_then_request_fails_and_tanks_are_unchanged() {
    let store = memory_store().await;
    let state = build_ws_state(Repositories::from_store(store), 4);
    let (addr, server) = spawn_ws_server(state.clone()).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut engineer_ws = ws_connect(addr).await;

    let (campaign, mut ship) = create_campaign(&mut gm_ws).await;
    ship.fuel.refined = 20;
    state
        .app
        .repositories
        .ship
        .save(&ship)
        .await
        .expect("save ship");

    join_as_crew(&mut engineer_ws, campaign.id, ship.id, CrewRole::Engineer).await;
    let source_id = add_refined_source(&mut gm_ws).await;

    ws_send_client(
        &mut engineer_ws,
        &ClientMessage::Refuel {
            source_id,
            tons: 25,
            fill_available: false,
        },
    )
    .await;

    let (code, message, subsystem) = ws_expect_error(&mut engineer_ws).await;
    assert_eq!(code, ErrorCode::PreconditionFailed);
    assert_eq!(
        message,
        "Insufficient tank capacity: requested 25 tons but only 20 tons free"
    );
    assert_eq!(subsystem, None);

    let stored = state
        .app
        .repositories
        .ship
        .get(ship.id)
        .await
        .expect("load ship")
        .expect("ship exists");
    assert_eq!(stored.fuel.refined, 20);

    server.abort();
}

#[tokio::test]
async fn when_engineer_refuels_then_only_the_bridge_hears_about_it() {
    let store = memory_store().await;
    let state = build_ws_state(Repositories::from_store(store), 4);
    let (addr, server) = spawn_ws_server(state.clone()).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut engineer_ws = ws_connect(addr).await;
    let mut pilot_ws = ws_connect(addr).await;

    let (campaign, mut ship) = create_campaign(&mut gm_ws).await;
    ship.fuel.refined = 20;
    state
        .app
        .repositories
        .ship
        .save(&ship)
        .await
        .expect("save ship");

    join_as_crew(&mut engineer_ws, campaign.id, ship.id, CrewRole::Engineer).await;
    join_as_crew(&mut pilot_ws, campaign.id, ship.id, CrewRole::Pilot).await;
    let source_id = add_refined_source(&mut gm_ws).await;

    ws_send_client(
        &mut engineer_ws,
        &ClientMessage::Refuel {
            source_id,
            tons: 15,
            fill_available: false,
        },
    )
    .await;

    for ws in [&mut engineer_ws, &mut pilot_ws] {
        match ws_expect_message(ws, RECV_TIMEOUT, |m| {
            matches!(m, ServerMessage::Refueled { .. })
        })
        .await
        {
            ServerMessage::Refueled {
                ship_id,
                tons,
                grade,
                fuel,
                ..
            } => {
                assert_eq!(ship_id, ship.id);
                assert_eq!(tons, 15);
                assert_eq!(grade, FuelGrade::Refined);
                assert_eq!(fuel.refined, 35);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    // The GM never joined this bridge.
    ws_expect_no_message_matching(&mut gm_ws, QUIET_PERIOD, |m| {
        matches!(m, ServerMessage::Refueled { .. })
    })
    .await;

    server.abort();
}
