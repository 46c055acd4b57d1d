use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    response::{ApiResponse, Empty},
    state::AppState,
};

/// DELETE /api/attendance/sessions/{label}/display
///
/// Stops the display loop for `label`. Submissions already in flight finish
/// normally; new ones are still judged against the clock.
///
/// ### Responses
/// - `200 OK` loop stopped
/// - `404 Not Found` no loop was running for `label`
pub async fn stop_display(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> (StatusCode, Json<ApiResponse<Empty>>) {
    let label = label.trim();
    if state.displays().stop(label) {
        (
            StatusCode::OK,
            Json(ApiResponse::success(Empty::default(), format!("Display stopped for {label}"))),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("No display running for {label}"))),
        )
    }
}
