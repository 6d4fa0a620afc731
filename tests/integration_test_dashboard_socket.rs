mod common;

use std::time::Duration;

use checkin_backend::domain::models::attendance::GroupKey;
use common::{door_actor, TestApp};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(app: &TestApp) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("ws://{}/api/v1/ws/attendance", addr)
}

async fn next_frame(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for frame")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn wait_for_group(app: &TestApp, group: &GroupKey) {
    for _ in 0..50 {
        if app.state.hub.group_size(group).await > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("connection never joined {}", group);
}

#[tokio::test]
async fn test_socket_joins_event_and_receives_updates() {
    let app = TestApp::new().await;
    let event = app.seed_event("Live Gala", true).await;
    let senior = app.seed_senior(Some(&event.id), "Pearl", 2).await;
    let already = app.seed_guest(&senior.id, "Early").await;
    let guest = app.seed_guest(&senior.id, "Late").await;
    app.state.checkin_service.mark(&already.id, &door_actor()).await.unwrap();

    let base = serve(&app).await;
    let (mut socket, _) = connect_async(format!("{}?event_id={}", base, event.id)).await.unwrap();

    let joined = next_frame(&mut socket).await;
    assert_eq!(joined["type"], "joined");
    assert_eq!(joined["group"]["kind"], "event");
    assert_eq!(joined["group"]["id"], event.id.as_str());

    let snapshot = next_frame(&mut socket).await;
    assert_eq!(snapshot["type"], "snapshot");
    assert_eq!(snapshot["counts"][0]["attended_count"], 1);

    app.state.checkin_service.mark(&guest.id, &door_actor()).await.unwrap();

    let update = next_frame(&mut socket).await;
    assert_eq!(update["type"], "attendance_update");
    assert_eq!(update["attended_count"], 2);
    assert_eq!(update["guest_name"], "Late");
    assert_eq!(update["time_label"], "Just now");

    socket.close(None).await.unwrap();
}

#[tokio::test]
async fn test_socket_global_join_ping_and_leave() {
    let app = TestApp::new().await;
    let event = app.seed_event("Monitor", true).await;
    let senior = app.seed_senior(Some(&event.id), "Queenie", 1).await;
    let guest = app.seed_guest(&senior.id, "Ray").await;

    let base = serve(&app).await;
    let (mut socket, _) = connect_async(base).await.unwrap();

    socket.send(Message::Text(json!({ "type": "ping" }).to_string())).await.unwrap();
    assert_eq!(next_frame(&mut socket).await["type"], "pong");

    socket.send(Message::Text(json!({ "type": "join", "group": { "kind": "global" } }).to_string())).await.unwrap();
    assert_eq!(next_frame(&mut socket).await["type"], "joined");
    let snapshot = next_frame(&mut socket).await;
    assert_eq!(snapshot["counts"].as_array().unwrap().len(), 1);

    app.state.checkin_service.mark(&guest.id, &door_actor()).await.unwrap();
    let update = next_frame(&mut socket).await;
    assert_eq!(update["event_id"], event.id.as_str());

    socket.send(Message::Text(json!({ "type": "leave", "group": { "kind": "global" } }).to_string())).await.unwrap();
    assert_eq!(next_frame(&mut socket).await["type"], "left");
    assert_eq!(app.state.hub.group_size(&GroupKey::Global).await, 0);

    socket.send(Message::Text("not json".to_string())).await.unwrap();
    assert_eq!(next_frame(&mut socket).await["type"], "error");
}

#[tokio::test]
async fn test_socket_unknown_event_reports_error() {
    let app = TestApp::new().await;
    let base = serve(&app).await;
    let (mut socket, _) = connect_async(format!("{}?event_id=missing", base)).await.unwrap();

    let frame = next_frame(&mut socket).await;
    assert_eq!(frame["type"], "error");
    assert_eq!(frame["message"], "Event not found");
    assert_eq!(app.state.hub.group_size(&GroupKey::event("missing")).await, 0);
}

#[tokio::test]
async fn test_socket_close_removes_connection() {
    let app = TestApp::new().await;
    let event = app.seed_event("Short Visit", true).await;

    let base = serve(&app).await;
    let (mut socket, _) = connect_async(format!("{}?event_id={}", base, event.id)).await.unwrap();
    next_frame(&mut socket).await;
    next_frame(&mut socket).await;
    wait_for_group(&app, &GroupKey::event(&event.id)).await;

    socket.close(None).await.unwrap();
    drop(socket);

    for _ in 0..50 {
        if app.state.hub.connection_count().await == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("dashboard connection was not torn down");
}
