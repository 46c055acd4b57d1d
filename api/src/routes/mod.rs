//! HTTP route entry point for `/api/...`.
//!
//! - `/health` → health check (public)
//! - `/attendance/mark` → student submissions (public)
//! - `/attendance/sessions/...` → session setup, display control, tokens and statistics (lecturer)
//! - `/students` → roster search (lecturer)

use axum::{Router, middleware::from_fn_with_state, routing::get};

use crate::auth::require_lecturer;
use crate::routes::{
    attendance::attendance_routes, health::health_check, students::get::search_students,
};
use crate::state::AppState;

pub mod attendance;
pub mod health;
pub mod students;

/// Builds the router for every HTTP endpoint, with state already applied.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/attendance", attendance_routes(app_state.clone()))
        .route(
            "/students",
            get(search_students)
                .route_layer(from_fn_with_state(app_state.clone(), require_lecturer)),
        )
        .with_state(app_state)
}
