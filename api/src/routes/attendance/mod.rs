use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::auth::require_lecturer;
use crate::state::AppState;

pub mod common;
mod delete;
mod get;
mod post;

pub use delete::stop_display;
pub use get::{get_session_stats, get_session_token, list_sessions};
pub use post::{mark_attendance, setup_session, start_display};

pub fn attendance_routes(app_state: AppState) -> Router<AppState> {
    let lecturer = || from_fn_with_state(app_state.clone(), require_lecturer);
    Router::new()
        .route("/mark", post(mark_attendance))
        .route("/sessions", get(list_sessions).route_layer(lecturer()))
        .route(
            "/sessions/{label}/setup",
            post(setup_session).route_layer(lecturer()),
        )
        .route(
            "/sessions/{label}/display",
            post(start_display)
                .delete(stop_display)
                .route_layer(lecturer()),
        )
        .route(
            "/sessions/{label}/token",
            get(get_session_token).route_layer(lecturer()),
        )
        .route(
            "/sessions/{label}/stats",
            get(get_session_stats).route_layer(lecturer()),
        )
}
