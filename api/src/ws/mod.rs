//! WebSocket stream for lecturer displays: `GET /ws/attendance/{label}`.
//!
//! The socket is subscribed to `attendance:session:{label}` and receives every
//! event published there (token rotations, countdown ticks, marks). Clients
//! may send `{"type":"ping"}` and get `{"type":"pong"}` back.

use axum::{
    Router,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, Utf8Bytes, WebSocket},
    },
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use util::ws::{WebSocketManager, attendance_session_topic};

use crate::auth::require_lecturer;
use crate::state::AppState;

pub fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/attendance/{label}", get(attendance_session_ws_handler))
        .route_layer(from_fn_with_state(app_state.clone(), require_lecturer))
        .with_state(app_state)
}

pub async fn attendance_session_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Path(label): Path<String>,
) -> impl IntoResponse {
    let topic = attendance_session_topic(label.trim());
    let manager = app_state.ws_clone();
    ws.on_upgrade(move |socket| serve(socket, manager, topic))
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsIn {
    Ping,
}

fn text(value: serde_json::Value) -> Message {
    Message::Text(Utf8Bytes::from(value.to_string()))
}

async fn serve(socket: WebSocket, manager: WebSocketManager, topic: String) {
    let (mut sink, mut rx) = socket.split();

    let (tx_out, mut rx_out) = tokio::sync::mpsc::channel::<Message>(256);
    let writer = tokio::spawn(async move {
        while let Some(m) = rx_out.recv().await {
            if sink.send(m).await.is_err() {
                break;
            }
        }
    });

    // subscribe before READY so nothing published after it is missed
    let mut brx = manager.subscribe(&topic).await;
    let _ = tx_out
        .send(text(json!({ "type": "ready", "topic": topic })))
        .await;
    tracing::debug!(topic = %topic, "display socket subscribed");

    let pump_tx = tx_out.clone();
    let pump_topic = topic.clone();
    let pump = tokio::spawn(async move {
        loop {
            match brx.recv().await {
                Ok(msg) => {
                    if pump_tx.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(topic = %pump_topic, skipped, "display socket lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    while let Some(Ok(frame)) = rx.next().await {
        match frame {
            Message::Text(txt) => match serde_json::from_str::<WsIn>(txt.as_str()) {
                Ok(WsIn::Ping) => {
                    let _ = tx_out
                        .send(text(json!({ "type": "pong", "topic": topic })))
                        .await;
                }
                Err(e) => {
                    let _ = tx_out
                        .send(text(json!({
                            "type": "error",
                            "code": "bad_request",
                            "message": format!("invalid frame: {e}"),
                        })))
                        .await;
                }
            },
            Message::Ping(b) => {
                let _ = tx_out.send(Message::Pong(b)).await;
            }
            Message::Close(_) => break,
            Message::Pong(_) | Message::Binary(_) => {}
        }
    }

    pump.abort();
    drop(tx_out);
    let _ = writer.await;
    tracing::debug!(topic = %topic, "display socket closed");
}
