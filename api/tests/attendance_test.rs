mod helpers;

use axum::http::StatusCode;
use db::row_store::RowStore;
use helpers::app::{json_request, request};
use helpers::{NOW, TOKEN, make_test_app, roster, send, test_state};
use serde_json::json;

fn mark(label: &str, token: &str, id: &str, name: &str) -> serde_json::Value {
    json!({
        "session_label": label,
        "token": token,
        "student_id": id,
        "claimed_name": name,
    })
}

#[tokio::test]
async fn first_mark_is_recorded_then_reported_as_duplicate() {
    let store = roster();
    let app = make_test_app(test_state(store.clone()));

    let body = mark("Session 1", TOKEN, "12345678", "  tran   van b ");
    let (status, json) = send(&app, json_request("POST", "/api/attendance/mark", body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "recorded");
    assert_eq!(json["data"]["row"], 2);
    // 1970-01-01 00:16:40 UTC shown at UTC+7
    assert_eq!(json["data"]["recorded_at"], "01/01/1970 07:16:40");
    assert_eq!(json["message"], "Attendance recorded at 01/01/1970 07:16:40");

    let writes = store.writes();
    let (status, json) = send(&app, json_request("POST", "/api/attendance/mark", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "already_recorded");
    assert_eq!(json["data"]["recorded_at"], "01/01/1970 07:16:40");
    assert_eq!(json["message"], "Attendance already recorded at 01/01/1970 07:16:40");
    assert_eq!(store.writes(), writes);

    assert_eq!(store.read_cell(2, 4).await.unwrap(), "✅");
    assert_eq!(store.header_row().await.unwrap()[5], "time:Session 1");
}

#[tokio::test]
async fn stale_token_is_rejected_with_countdown_and_no_writes() {
    let store = roster();
    let app = make_test_app(test_state(store.clone()));

    let (status, json) = send(
        &app,
        json_request("POST", "/api/attendance/mark", mark("Session 1", "32", "12345678", "Tran Van B")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["data"]["code"], "token_invalid");
    assert_eq!(json["data"]["seconds_remaining"], 30 - NOW % 30);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let store = roster();
    let app = make_test_app(test_state(store.clone()));
    let body = json!({
        "session_label": "Session 1",
        "student_id": "12345678",
        "claimed_name": "Tran Van B",
    });

    let (status, json) = send(&app, json_request("POST", "/api/attendance/mark", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["data"]["code"], "token_invalid");
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn each_rejection_has_its_own_status() {
    let store = roster();
    let app = make_test_app(test_state(store.clone()));

    let cases = [
        (mark("Session 1", TOKEN, "12345678", "Someone Else"), StatusCode::FORBIDDEN, "identity_mismatch"),
        (mark("Session 1", TOKEN, "00000000", "Tran Van B"), StatusCode::NOT_FOUND, "student_not_found"),
        (mark("Session 1", TOKEN, "   ", "Tran Van B"), StatusCode::NOT_FOUND, "student_not_found"),
        (mark("Session 9", TOKEN, "12345678", "Tran Van B"), StatusCode::UNPROCESSABLE_ENTITY, "header_not_found"),
        (mark("Session 1", TOKEN, "12345678", ""), StatusCode::FORBIDDEN, "identity_mismatch"),
    ];
    for (body, expected, code) in cases {
        let (status, json) = send(&app, json_request("POST", "/api/attendance/mark", body)).await;
        assert_eq!(status, expected, "{json}");
        assert_eq!(json["data"]["code"], code);
    }
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn store_outage_is_service_unavailable() {
    let store = roster();
    store.set_unavailable(true);
    let app = make_test_app(test_state(store.clone()));

    let (status, json) = send(
        &app,
        json_request("POST", "/api/attendance/mark", mark("Session 1", TOKEN, "12345678", "Tran Van B")),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["data"]["code"], "store_unavailable");
    assert!(!json["message"].as_str().unwrap().contains("memory store"));
}

#[tokio::test]
async fn lists_sessions_and_running_displays() {
    let store = roster();
    let state = test_state(store);
    let app = make_test_app(state.clone());

    let (status, json) = send(&app, request("POST", "/api/attendance/sessions/Session%202/display")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json_list) = send(&app, request("GET", "/api/attendance/sessions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_list["data"]["sessions"], json!(["Session 1", "Session 2"]));
    assert_eq!(json_list["data"]["running"], json!(["Session 2"]));
    assert_eq!(json["data"]["running"], true);

    state.displays().stop_all();
}

#[tokio::test]
async fn setup_declares_columns_once() {
    let store = roster();
    let app = make_test_app(test_state(store.clone()));

    let (status, json) = send(&app, request("POST", "/api/attendance/sessions/Session%203/setup")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["presence_column"], 6);
    assert_eq!(json["data"]["time_column"], 7);

    let writes = store.writes();
    let (_, again) = send(&app, request("POST", "/api/attendance/sessions/Session%203/setup")).await;
    assert_eq!(again["data"], json["data"]);
    assert_eq!(store.writes(), writes);
}

#[tokio::test]
async fn display_start_returns_live_token_and_stop_is_reported_once() {
    let store = roster();
    let state = test_state(store.clone());
    let app = make_test_app(state.clone());

    let (status, json) = send(&app, request("POST", "/api/attendance/sessions/Session%201/display")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["token"], 33);
    assert_eq!(json["data"]["seconds_remaining"], 20);
    assert_eq!(json["data"]["window_seconds"], 30);
    let link = json["data"]["link"].as_str().unwrap();
    assert!(link.ends_with("?mode=student&session=Session+1&token=33"), "{link}");
    assert!(state.displays().is_running("Session 1"));
    // the time column was declared up front
    assert_eq!(store.header_row().await.unwrap()[5], "time:Session 1");

    let (status, _) = send(&app, request("DELETE", "/api/attendance/sessions/Session%201/display")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = send(&app, request("DELETE", "/api/attendance/sessions/Session%201/display")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn display_does_not_start_when_sheet_is_down() {
    let store = roster();
    store.set_unavailable(true);
    let state = test_state(store);
    let app = make_test_app(state.clone());

    let (status, _) = send(&app, request("POST", "/api/attendance/sessions/Session%201/display")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!state.displays().is_running("Session 1"));
}

#[tokio::test]
async fn token_endpoint_matches_what_students_must_submit() {
    let store = roster();
    let app = make_test_app(test_state(store));

    let (status, json) = send(&app, request("GET", "/api/attendance/sessions/Session%201/token")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["token"], 33);
    assert_eq!(json["data"]["running"], false);

    let token = json["data"]["token"].to_string();
    let (status, _) = send(
        &app,
        json_request("POST", "/api/attendance/mark", mark("Session 1", &token, "87654321", "nguyen van a")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn stats_count_present_and_absent_by_group() {
    let store = roster();
    let app = make_test_app(test_state(store));

    send(
        &app,
        json_request("POST", "/api/attendance/mark", mark("Session 1", TOKEN, "12345678", "Tran Van B")),
    )
    .await;

    let (status, json) = send(&app, request("GET", "/api/attendance/sessions/Session%201/stats")).await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!((data["present"].as_u64(), data["absent"].as_u64(), data["total"].as_u64()), (Some(1), Some(2), Some(3)));
    assert_eq!(data["rate"], 33.3);
    assert_eq!(data["groups"][0]["group"], "1");
    assert_eq!(data["groups"][0]["present"], 1);
    assert_eq!(data["groups"][2]["group"], "Unknown");
    assert_eq!(json["message"], "1 of 3 students present in Session 1");

    let (status, _) = send(&app, request("GET", "/api/attendance/sessions/Session%207/stats")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
