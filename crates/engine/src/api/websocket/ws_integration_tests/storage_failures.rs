use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use starbridge_domain::{CampaignId, Ship, ShipId};

use super::*;
use crate::infrastructure::ports::{FuelSourceRepo, RepoError};
use crate::infrastructure::state_store::SqliteStore;

/// Ship storage that serves from `inner` until `failing` is raised, then
/// reports a database failure on every read.
struct FlakyShips {
    inner: Arc<SqliteStore>,
    failing: Arc<AtomicBool>,
}

impl FlakyShips {
    fn check(&self, operation: &'static str) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::database(
                operation,
                "disk I/O error at /var/lib/state.db",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ShipRepo for FlakyShips {
    async fn get(&self, id: ShipId) -> Result<Option<Ship>, RepoError> {
        self.check("get_ship")?;
        ShipRepo::get(self.inner.as_ref(), id).await
    }

    async fn save(&self, ship: &Ship) -> Result<(), RepoError> {
        ShipRepo::save(self.inner.as_ref(), ship).await
    }

    async fn list_in_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Ship>, RepoError> {
        self.check("list_ships")?;
        ShipRepo::list_in_campaign(self.inner.as_ref(), campaign_id).await
    }
}

#[tokio::test]
async fn when_storage_fails_then_client_gets_generic_subsystem_error() {
    let failing = Arc::new(AtomicBool::new(false));
    let store = memory_store().await;
    let mut repos = Repositories::from_store(store.clone());
    repos.ship = Arc::new(FlakyShips {
        inner: store,
        failing: failing.clone(),
    });

    let state = build_ws_state(repos, 4);
    let (addr, server) = spawn_ws_server(state).await;

    let mut gm_ws = ws_connect(addr).await;
    let mut engineer_ws = ws_connect(addr).await;

    let (campaign, ship) = create_campaign(&mut gm_ws).await;
    join_as_crew(&mut engineer_ws, campaign.id, ship.id, CrewRole::Engineer).await;

    failing.store(true, Ordering::SeqCst);
    ws_send_client(&mut engineer_ws, &ClientMessage::GetFuelStatus).await;

    let (code, message, subsystem) = ws_expect_error(&mut engineer_ws).await;
    assert_eq!(code, ErrorCode::InternalError);
    assert_eq!(subsystem.as_deref(), Some("Fuel"));
    assert!(message.starts_with("Fuel operation failed - please try again (ref "));
    assert!(!message.contains("disk"));

    // The failure stays with the requester.
    ws_expect_no_message_matching(&mut gm_ws, QUIET_PERIOD, |m| {
        matches!(m, ServerMessage::Error { .. })
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_refuel_cannot_commit_then_tanks_and_source_are_untouched() {
    let store = memory_store().await;
    let state = build_ws_state(Repositories::from_store(store.clone()), 4);
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

    ws_send_client(
        &mut gm_ws,
        &ClientMessage::AddFuelSource {
            name: "Highport".into(),
            kind: starbridge_domain::FuelSourceKind::Refined,
            available_tons: Some(100),
        },
    )
    .await;
    let source_id = match ws_expect_message(&mut gm_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::FuelSources { .. })
    })
    .await
    {
        ServerMessage::FuelSources { sources } => sources[0].id,
        other => panic!("unexpected message: {other:?}"),
    };

    store.reject_writes_of("fuel_source").await;
    ws_send_client(
        &mut engineer_ws,
        &ClientMessage::Refuel {
            source_id,
            tons: 15,
            fill_available: false,
        },
    )
    .await;

    let (code, _, subsystem) = ws_expect_error(&mut engineer_ws).await;
    assert_eq!(code, ErrorCode::InternalError);
    assert_eq!(subsystem.as_deref(), Some("Fuel"));

    ws_expect_no_message_matching(&mut pilot_ws, QUIET_PERIOD, |m| {
        matches!(m, ServerMessage::Refueled { .. })
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
    assert_eq!(stored.fuel.refined, 20);
    let source = state
        .app
        .repositories
        .fuel_source
        .get(source_id)
        .await
        .expect("get")
        .expect("source");
    assert_eq!(source.available_tons, Some(100));

    server.abort();
}
