use api::state::AppState;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use chrono::{TimeZone, Utc};
use db::row_store::MemoryRowStore;
use serde_json::Value;
use services::TokenPolicy;
use services::display::Clock;
use std::sync::Arc;
use tower::ServiceExt;

/// Frozen test time. With 30 second windows the live token is 33.
pub const NOW: i64 = 1_000;
pub const TOKEN: &str = "33";

pub fn roster() -> Arc<MemoryRowStore> {
    Arc::new(MemoryRowStore::with_rows(
        ["Student ID", "Name", "Group", "Session 1", "Session 2"],
        [
            vec!["12345678", "Tran Van B", "1"],
            vec!["87654321", "Nguyen Van A", "2"],
            vec!["11112222", "Le Thi C", ""],
        ],
    ))
}

pub fn fixed_clock(secs: i64) -> Clock {
    Arc::new(move || Utc.timestamp_opt(secs, 0).unwrap())
}

/// State over `store` with a frozen clock, strict 30s tokens and no lecturer key.
pub fn test_state(store: Arc<MemoryRowStore>) -> AppState {
    AppState::new(store)
        .with_clock(fixed_clock(NOW))
        .with_policy(TokenPolicy::new(30, true))
        .with_lecturer_key(None)
}

pub fn make_test_app(state: AppState) -> Router {
    api::app(state)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
