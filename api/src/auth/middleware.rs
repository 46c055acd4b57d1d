use axum::{
    body::Body,
    http::{Method, Request, header::USER_AGENT},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;

/// Logs method, path, status, latency and user-agent for each request.
/// CORS preflight `OPTIONS` requests pass through unlogged.
///
/// ```ignore
/// use axum::Router;
/// use axum::middleware::from_fn;
/// use api::auth::middleware::log_request;
///
/// let app = Router::new().layer(from_fn(log_request));
/// ```
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let started = Instant::now();
    let res = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        status = res.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        user_agent = %user_agent,
        "Incoming request"
    );
    res
}
