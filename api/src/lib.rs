pub mod auth;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{Router, middleware::from_fn};
use tower_http::cors::CorsLayer;

use crate::{auth::middleware::log_request, routes::routes, state::AppState, ws::ws_routes};

/// The complete application: `/api` and `/ws` with request logging and CORS.
pub fn app(app_state: AppState) -> Router {
    let cors = CorsLayer::very_permissive();
    Router::new()
        .nest("/api", routes(app_state.clone()))
        .nest("/ws", ws_routes(app_state))
        .layer(from_fn(log_request))
        .layer(cors)
}
