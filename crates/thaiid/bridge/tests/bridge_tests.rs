//! Bridge tests against an in-process fake controller

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use thaiid_bridge::{Bridge, BridgeConfig, RemoteCommand};
use thaiid_card::{CardRecord, FieldKey};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
struct Recorded {
    pending: VecDeque<String>,
    blank: bool,
    failing_ack: bool,
    polls: usize,
    poll_queries: Vec<HashMap<String, String>>,
    headers: Vec<(String, String)>,
    acks: Vec<Value>,
    updates: Vec<Value>,
}

type Controller = Arc<Mutex<Recorded>>;

fn record_headers(controller: &Controller, headers: &HeaderMap) {
    let api_key = headers.get("x-api-key").and_then(|v| v.to_str().ok()).unwrap_or_default();
    let device = headers.get("x-device-id").and_then(|v| v.to_str().ok()).unwrap_or_default();
    controller
        .lock()
        .unwrap()
        .headers
        .push((api_key.to_string(), device.to_string()));
}

async fn latest_command(
    State(controller): State<Controller>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    record_headers(&controller, &headers);
    let mut recorded = controller.lock().unwrap();
    recorded.polls += 1;
    recorded.poll_queries.push(query);

    if recorded.blank {
        return (StatusCode::OK, String::new()).into_response();
    }
    match recorded.pending.pop_front() {
        Some(command) => Json(json!({"hasCommand": true, "command": command})).into_response(),
        None => Json(json!({"hasCommand": false})).into_response(),
    }
}

async fn acknowledge(
    State(controller): State<Controller>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    record_headers(&controller, &headers);
    let mut recorded = controller.lock().unwrap();
    recorded.acks.push(body);
    if recorded.failing_ack {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn card_update(
    State(controller): State<Controller>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    record_headers(&controller, &headers);
    controller.lock().unwrap().updates.push(body);
    StatusCode::OK
}

async fn card_latest() -> Json<Value> {
    Json(json!({"CID": "1101700203451", "NameEN": "Mr. Somchai Jaidee"}))
}

async fn spawn_controller(controller: Controller) -> SocketAddr {
    let app = Router::new()
        .route("/api/command/latest", get(latest_command))
        .route("/api/command/acknowledge", post(acknowledge))
        .route("/api/card/update", post(card_update))
        .route("/api/card/latest", get(card_latest))
        .with_state(controller);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn setup() -> (Controller, Bridge, mpsc::Receiver<RemoteCommand>) {
    let controller = Controller::default();
    let addr = spawn_controller(controller.clone()).await;
    let config = BridgeConfig::new(&addr.to_string(), "counter-1", "secret-key")
        .unwrap()
        .with_poll_interval(Duration::from_millis(20));
    let (tx, rx) = mpsc::channel(16);
    (controller, Bridge::new(config, tx).unwrap(), rx)
}

#[tokio::test]
async fn test_poll_once_delivers_and_acknowledges() {
    let (controller, bridge, mut rx) = setup().await;
    controller.lock().unwrap().pending.push_back("read_card".into());

    let command = bridge.poll_once().await.unwrap();

    assert_eq!(command, Some(RemoteCommand::ReadCard));
    assert_eq!(rx.try_recv().unwrap(), RemoteCommand::ReadCard);

    let recorded = controller.lock().unwrap();
    assert_eq!(recorded.poll_queries[0]["deviceId"], "counter-1");
    assert_eq!(recorded.acks, vec![json!({"command": "read_card", "deviceId": "counter-1"})]);
    assert!(
        recorded
            .headers
            .iter()
            .all(|(key, device)| key == "secret-key" && device == "counter-1")
    );
}

#[tokio::test]
async fn test_poll_once_without_command() {
    let (controller, bridge, mut rx) = setup().await;

    assert_eq!(bridge.poll_once().await.unwrap(), None);
    assert!(rx.try_recv().is_err());
    assert!(controller.lock().unwrap().acks.is_empty());
}

#[tokio::test]
async fn test_poll_once_blank_body() {
    let (controller, bridge, _rx) = setup().await;
    controller.lock().unwrap().blank = true;

    assert_eq!(bridge.poll_once().await.unwrap(), None);
}

#[tokio::test]
async fn test_acknowledge_failure_still_delivers() {
    let (controller, bridge, mut rx) = setup().await;
    {
        let mut recorded = controller.lock().unwrap();
        recorded.failing_ack = true;
        recorded.pending.push_back("clear_data".into());
    }

    assert_eq!(bridge.poll_once().await.unwrap(), Some(RemoteCommand::ClearData));
    assert_eq!(rx.try_recv().unwrap(), RemoteCommand::ClearData);
    assert_eq!(controller.lock().unwrap().acks.len(), 1);
}

#[tokio::test]
async fn test_push_card_data() {
    let (controller, bridge, _rx) = setup().await;
    let record = CardRecord::default()
        .with(FieldKey::Cid, "1101700203451")
        .with(FieldKey::Gender, "ชาย");

    assert!(bridge.push_card_data(&record, Some("/9j/AA==")).await);

    let recorded = controller.lock().unwrap();
    let update = &recorded.updates[0];
    assert_eq!(update["type"], "card_data");
    assert_eq!(update["deviceId"], "counter-1");
    assert!(update["timestamp"].as_i64().unwrap() > 0);
    assert_eq!(update["data"]["CID"], "1101700203451");
    assert_eq!(update["data"]["Gender"], "ชาย");
    assert_eq!(update["data"]["Address"], "");
    assert_eq!(update["photo"], "/9j/AA==");
}

#[tokio::test]
async fn test_push_status() {
    let (controller, bridge, _rx) = setup().await;

    bridge.push_status("เชื่อมต่อสำเร็จ").await;

    let recorded = controller.lock().unwrap();
    assert_eq!(recorded.updates[0]["type"], "status");
    assert_eq!(recorded.updates[0]["message"], "เชื่อมต่อสำเร็จ");
    assert!(recorded.updates[0].get("data").is_none());
}

#[tokio::test]
async fn test_unreachable_controller() {
    let config = BridgeConfig::new("127.0.0.1:1", "counter-1", "secret-key")
        .unwrap()
        .with_request_timeout(Duration::from_secs(2));
    let (tx, _rx) = mpsc::channel(1);
    let bridge = Bridge::new(config, tx).unwrap();

    assert!(!bridge.test_connection().await);
    assert!(!bridge.push_card_data(&CardRecord::default(), None).await);
    assert!(bridge.poll_once().await.is_err());
    assert!(bridge.latest_card_data().await.is_none());
}

#[tokio::test]
async fn test_connection_and_latest_card_data() {
    let (_controller, bridge, _rx) = setup().await;

    assert!(bridge.test_connection().await);
    let latest = bridge.latest_card_data().await.unwrap();
    assert_eq!(latest["CID"], "1101700203451");
}

#[tokio::test]
async fn test_no_polls_after_stop() {
    let (controller, bridge, mut rx) = setup().await;
    controller.lock().unwrap().pending.push_back("save_data".into());

    bridge.start_polling();
    bridge.start_polling();
    assert!(bridge.is_polling());

    let command = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(command, Some(RemoteCommand::SaveData));

    for _ in 0..100 {
        if controller.lock().unwrap().polls >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    bridge.stop_polling().await;
    assert!(!bridge.is_polling());

    let polls = controller.lock().unwrap().polls;
    assert!(polls >= 3);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(controller.lock().unwrap().polls, polls);
}

#[tokio::test]
async fn test_dispose_releases_client() {
    let (controller, bridge, _rx) = setup().await;
    bridge.start_polling();

    bridge.dispose().await;

    assert!(!bridge.is_polling());
    assert!(!bridge.test_connection().await);
    assert!(!bridge.push_card_data(&CardRecord::default(), None).await);
    let polls = controller.lock().unwrap().polls;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(controller.lock().unwrap().polls, polls);
}
