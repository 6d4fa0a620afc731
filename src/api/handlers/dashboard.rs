//! Live attendance socket.
//!
//! One task per connection multiplexes hub updates and client frames over a
//! single sink. Every join answers with a snapshot so a (re)connecting
//! dashboard can replace its counters instead of relying on replay.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::state::AppState;
use crate::api::dtos::{requests::{ClientFrame, EventScopeQuery}, responses::ServerFrame};
use crate::domain::models::{attendance::GroupKey, statistics::EventAttendanceCount};
use crate::domain::services::attendance_hub::ConnectionId;
use crate::error::AppError;

type WsSink = SplitSink<WebSocket, Message>;

pub async fn attendance_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventScopeQuery>,
) -> Response {
    let initial = query.event_id.filter(|id| !id.is_empty()).map(GroupKey::event);
    info!(group = ?initial, "Dashboard socket requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state, initial))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, initial: Option<GroupKey>) {
    let (conn, mut updates) = state.hub.connect().await;
    let (mut sender, mut receiver) = socket.split();

    if let Some(group) = initial {
        if join_and_snapshot(&state, conn, group, &mut sender).await.is_err() {
            state.hub.disconnect(conn).await;
            return;
        }
    }

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                if send_frame(&mut sender, &ServerFrame::AttendanceUpdate(update)).await.is_err() {
                    debug!(connection_id = %conn, "Send failed, closing dashboard socket");
                    break;
                }
            }
            incoming = receiver.next() => {
                let keep_open = match incoming {
                    Some(Ok(Message::Text(text))) => handle_client_text(&state, conn, text.as_str(), &mut sender).await,
                    Some(Ok(Message::Close(_))) | None => false,
                    Some(Ok(_)) => true,
                    Some(Err(e)) => {
                        debug!(connection_id = %conn, "Dashboard socket error: {}", e);
                        false
                    }
                };
                if !keep_open {
                    break;
                }
            }
        }
    }

    state.hub.disconnect(conn).await;
    info!(connection_id = %conn, "Dashboard socket closed");
}

/// Returns false when the socket should be closed.
async fn handle_client_text(state: &AppState, conn: ConnectionId, text: &str, sender: &mut WsSink) -> bool {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(connection_id = %conn, "Unreadable dashboard frame: {}", e);
            return send_frame(sender, &ServerFrame::Error { message: "Unrecognized message".into() }).await.is_ok();
        }
    };

    let sent = match frame {
        ClientFrame::Join { group } => join_and_snapshot(state, conn, group, sender).await,
        ClientFrame::Leave { group } => {
            state.hub.leave(conn, &group).await;
            send_frame(sender, &ServerFrame::Left { group }).await
        }
        ClientFrame::Ping => send_frame(sender, &ServerFrame::Pong).await,
    };
    sent.is_ok()
}

async fn join_and_snapshot(state: &AppState, conn: ConnectionId, group: GroupKey, sender: &mut WsSink) -> Result<(), axum::Error> {
    // Join before reading counts so no update falls between snapshot and subscription
    if state.hub.join(conn, group.clone()).await.is_err() {
        return send_frame(sender, &ServerFrame::Error { message: "Connection not registered".into() }).await;
    }

    let counts = match snapshot(state, &group).await {
        Ok(counts) => counts,
        Err(e) => {
            state.hub.leave(conn, &group).await;
            let message = match e {
                AppError::NotFound(msg) => msg,
                _ => "Could not load attendance".to_string(),
            };
            return send_frame(sender, &ServerFrame::Error { message }).await;
        }
    };

    send_frame(sender, &ServerFrame::Joined { group: group.clone() }).await?;
    send_frame(sender, &ServerFrame::Snapshot { group, counts }).await
}

async fn snapshot(state: &AppState, group: &GroupKey) -> Result<Vec<EventAttendanceCount>, AppError> {
    let events = match group {
        GroupKey::Event { id } => vec![
            state.event_repo.find_by_id(id).await?
                .ok_or(AppError::NotFound("Event not found".into()))?
        ],
        GroupKey::Global => state.event_repo.list().await?,
    };

    let mut counts = Vec::with_capacity(events.len());
    for event in events {
        counts.push(EventAttendanceCount {
            attended_count: state.guest_repo.count_attended_by_event(&event.id).await?,
            event_id: event.id,
            event_name: event.name,
        });
    }
    Ok(counts)
}

async fn send_frame(sender: &mut WsSink, frame: &ServerFrame) -> Result<(), axum::Error> {
    match serde_json::to_string(frame) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!("Failed to encode dashboard frame: {}", e);
            Ok(())
        }
    }
}
