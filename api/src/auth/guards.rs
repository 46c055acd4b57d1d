//! Access guard for lecturer-only routes.
//!
//! Lecturer routes are open when no `LECTURER_KEY` is configured. Otherwise the
//! caller presents the key as `Authorization: Bearer <key>`, or as a `key`
//! query parameter for clients that cannot set headers (browser WebSockets).

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::response::{ApiResponse, Empty};
use crate::state::AppState;

fn bearer(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn query_key(req: &Request<Body>) -> Option<String> {
    let query = req.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "key")
        .map(|(_, v)| v.into_owned())
}

/// Middleware admitting only callers holding the lecturer key.
pub async fn require_lecturer(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.lecturer_key() else {
        return next.run(req).await;
    };

    let presented = bearer(&req)
        .map(str::to_string)
        .or_else(|| query_key(&req));
    match presented {
        Some(key) if key == expected => next.run(req).await,
        Some(_) => {
            tracing::warn!(path = %req.uri().path(), "rejected lecturer key");
            (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::<Empty>::error("Invalid lecturer key")),
            )
                .into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<Empty>::error("Lecturer key required")),
        )
            .into_response(),
    }
}
