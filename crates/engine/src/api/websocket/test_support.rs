use std::net::SocketAddr;
use std::time::Duration;

use axum::routing::get;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

use starbridge_domain::{Campaign, CrewRole, Ship, ShipTemplate};

use super::*;
use crate::app::Repositories;
use crate::infrastructure::clock::{FixedClock, FixedRandom};
use crate::infrastructure::state_store::SqliteStore;

pub(crate) type TestSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub(crate) const RECV_TIMEOUT: Duration = Duration::from_secs(2);
pub(crate) const QUIET_PERIOD: Duration = Duration::from_millis(300);

pub(crate) async fn memory_store() -> Arc<SqliteStore> {
    let clock = Arc::new(FixedClock(chrono::Utc::now()));
    Arc::new(SqliteStore::in_memory(clock).await.expect("in-memory store"))
}

/// Every die lands on `roll`.
pub(crate) fn build_ws_state(repos: Repositories, roll: i32) -> Arc<WsState> {
    let app = Arc::new(App::new(
        repos,
        Arc::new(FixedClock(chrono::Utc::now())),
        Arc::new(FixedRandom(roll)),
    ));
    Arc::new(WsState::new(app, Arc::new(ConnectionManager::new())))
}

pub(crate) async fn spawn_ws_server(
    state: Arc<WsState>,
) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let router = axum::Router::new().route("/ws", get(ws_handler).with_state(state));

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    (addr, handle)
}

pub(crate) async fn ws_connect(addr: SocketAddr) -> TestSocket {
    let url = format!("ws://{addr}/ws");
    let (ws, _resp) = connect_async(url).await.expect("connect");
    ws
}

pub(crate) async fn ws_send_client(ws: &mut TestSocket, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).expect("serialize client message");
    ws.send(WsMessage::Text(json)).await.expect("send");
}

pub(crate) async fn ws_recv_server(ws: &mut TestSocket) -> ServerMessage {
    loop {
        let msg = ws.next().await.expect("stream open").expect("frame");
        if let WsMessage::Text(text) = msg {
            return serde_json::from_str::<ServerMessage>(&text).expect("server message");
        }
    }
}

pub(crate) async fn ws_expect_message<F>(
    ws: &mut TestSocket,
    timeout: Duration,
    mut predicate: F,
) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    tokio::time::timeout(timeout, async {
        loop {
            let msg = ws_recv_server(ws).await;
            if predicate(&msg) {
                return msg;
            }
        }
    })
    .await
    .expect("expected message did not arrive")
}

pub(crate) async fn ws_expect_no_message_matching<F>(
    ws: &mut TestSocket,
    timeout: Duration,
    mut predicate: F,
) where
    F: FnMut(&ServerMessage) -> bool,
{
    let result = tokio::time::timeout(timeout, async {
        loop {
            let msg = ws_recv_server(ws).await;
            if predicate(&msg) {
                panic!("unexpected message: {msg:?}");
            }
        }
    })
    .await;

    assert!(result.is_err());
}

/// Create a scout campaign on `ws`, which becomes its GM.
pub(crate) async fn create_campaign(ws: &mut TestSocket) -> (Campaign, Ship) {
    ws_send_client(
        ws,
        &ClientMessage::CreateCampaign {
            name: "Spinward Run".into(),
            gm_name: "Sam".into(),
            ship_name: "Beowulf".into(),
            ship_template: ShipTemplate::Scout,
        },
    )
    .await;

    match ws_expect_message(ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::CampaignCreated { .. })
    })
    .await
    {
        ServerMessage::CampaignCreated { campaign, ship } => (campaign, ship),
        other => panic!("unexpected message: {other:?}"),
    }
}

/// Join `campaign_id` as a player, take `role` on `ship_id` and open its bridge.
pub(crate) async fn join_as_crew(
    ws: &mut TestSocket,
    campaign_id: CampaignId,
    ship_id: ShipId,
    role: CrewRole,
) {
    ws_send_client(
        ws,
        &ClientMessage::JoinCampaign {
            campaign_id,
            as_gm: false,
            slot_id: None,
        },
    )
    .await;
    ws_expect_message(ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::CampaignJoined { .. })
    })
    .await;

    ws_send_client(ws, &ClientMessage::SelectRole { ship_id, role }).await;
    ws_expect_message(ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::RoleSelected { .. })
    })
    .await;

    ws_send_client(ws, &ClientMessage::JoinBridge { ship_id: None }).await;
    ws_expect_message(ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::BridgeJoined { .. })
    })
    .await;
}

/// The next error envelope, unpacked.
pub(crate) async fn ws_expect_error(ws: &mut TestSocket) -> (ErrorCode, String, Option<String>) {
    match ws_expect_message(ws, RECV_TIMEOUT, |m| matches!(m, ServerMessage::Error { .. })).await {
        ServerMessage::Error {
            code,
            message,
            subsystem,
        } => (code, message, subsystem),
        other => panic!("unexpected message: {other:?}"),
    }
}
