mod helpers;

use futures::SinkExt;
use helpers::app::json_request;
use helpers::{TOKEN, connect_ws, make_test_app, next_event, roster, send, spawn_server, test_state};
use serde_json::json;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;
use util::ws::attendance_session_topic;

#[tokio::test]
async fn display_socket_streams_rotation_and_countdown() {
    let state = test_state(roster());
    let addr = spawn_server(make_test_app(state.clone())).await;

    let mut socket = connect_ws(&addr, "Session 1", None).await.unwrap();
    next_event(&mut socket, "ready").await;

    let app = make_test_app(state.clone());
    send(&app, helpers::app::request("POST", "/api/attendance/sessions/Session%201/display")).await;

    let rotated = next_event(&mut socket, "attendance.token_rotated").await;
    assert_eq!(rotated["topic"], "attendance:session:Session 1");
    assert_eq!(rotated["payload"]["token"], 33);
    let tick = next_event(&mut socket, "attendance.countdown").await;
    assert_eq!(tick["payload"]["seconds_remaining"], 20);

    state.displays().stop_all();
}

#[tokio::test]
async fn display_socket_sees_marks_and_answers_ping() {
    let state = test_state(roster());
    let addr = spawn_server(make_test_app(state.clone())).await;

    let mut socket = connect_ws(&addr, "Session 2", None).await.unwrap();
    next_event(&mut socket, "ready").await;

    socket
        .send(Message::Text(json!({ "type": "ping" }).to_string().into()))
        .await
        .unwrap();
    next_event(&mut socket, "pong").await;

    let topic = attendance_session_topic("Session 2");
    for _ in 0..50 {
        if state.ws().subscriber_count(&topic).await > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let app = make_test_app(state.clone());
    send(
        &app,
        json_request(
            "POST",
            "/api/attendance/mark",
            json!({
                "session_label": "Session 2",
                "token": TOKEN,
                "student_id": "87654321",
                "claimed_name": "Nguyen Van A",
            }),
        ),
    )
    .await;

    let marked = next_event(&mut socket, "attendance.marked").await;
    assert_eq!(marked["payload"]["student_id"], "87654321");
    assert_eq!(marked["payload"]["recorded_at"], "01/01/1970 07:16:40");
}

#[tokio::test]
async fn display_socket_is_guarded_by_the_lecturer_key() {
    let state = test_state(roster()).with_lecturer_key(Some("s3cret".into()));
    let addr = spawn_server(make_test_app(state)).await;

    assert!(connect_ws(&addr, "Session 1", None).await.is_err());

    let mut socket = connect_ws(&addr, "Session 1", Some("s3cret")).await.unwrap();
    next_event(&mut socket, "ready").await;
}
