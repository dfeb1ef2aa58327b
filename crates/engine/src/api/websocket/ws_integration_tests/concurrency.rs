use std::collections::BTreeMap;

use starbridge_domain::ShipSystem;

use super::*;

fn power_change(system: ShipSystem, level: u8) -> ClientMessage {
    ClientMessage::SetPower {
        allocations: BTreeMap::from([(system, level)]),
    }
}

#[tokio::test]
async fn when_two_stations_change_power_at_once_then_both_changes_survive() {
    let state = build_ws_state(Repositories::from_store(memory_store().await), 4);
    let (addr, server) = spawn_ws_server(state.clone()).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut engineer_ws = ws_connect(addr).await;

    let (campaign, ship) = create_campaign(&mut gm_ws).await;
    join_as_crew(&mut engineer_ws, campaign.id, ship.id, CrewRole::Engineer).await;

    ws_send_client(&mut gm_ws, &ClientMessage::JoinBridge { ship_id: Some(ship.id) }).await;
    ws_expect_message(&mut gm_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::BridgeJoined { .. })
    })
    .await;

    // Each side reads the ship, changes one system and writes it back.
    let gm_change = power_change(ShipSystem::Weapons, 10);
    let engineer_change = power_change(ShipSystem::Sensors, 20);
    tokio::join!(
        ws_send_client(&mut gm_ws, &gm_change),
        ws_send_client(&mut engineer_ws, &engineer_change),
    );

    ws_expect_message(&mut engineer_ws, RECV_TIMEOUT, |m| {
        matches!(
            m,
            ServerMessage::PowerChanged { power, .. }
                if power.get(ShipSystem::Weapons) == 10 && power.get(ShipSystem::Sensors) == 20
        )
    })
    .await;

    let stored = state
        .app
        .repositories
        .ship
        .get(ship.id)
        .await
        .expect("get")
        .expect("ship");
    assert_eq!(stored.power.get(ShipSystem::Weapons), 10);
    assert_eq!(stored.power.get(ShipSystem::Sensors), 20);

    server.abort();
}

#[tokio::test]
async fn campaign_lock_is_exclusive_per_campaign_only() {
    let locks = CampaignLocks::new();
    let busy = CampaignId::new();

    let held = locks.lock(busy).await;
    let waiting = tokio::time::timeout(QUIET_PERIOD, locks.lock(busy)).await;
    assert!(waiting.is_err(), "second command ran while the first held the lock");

    let other = tokio::time::timeout(QUIET_PERIOD, locks.lock(CampaignId::new())).await;
    assert!(other.is_ok(), "an unrelated campaign was blocked");

    drop(held);
    let next = tokio::time::timeout(QUIET_PERIOD, locks.lock(busy)).await;
    assert!(next.is_ok(), "lock was not released");
}
