use axum::{
    Json,
    extract::{Path, State},
};
use services::SessionToken;
use services::stats::{SessionStats, session_stats};

use super::common::{SessionsResponse, TokenResponse};
use crate::{error::ApiError, response::ApiResponse, state::AppState};

/// GET /api/attendance/sessions
///
/// Lists the session columns found in the sheet header and the labels with a
/// running display.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SessionsResponse>>, ApiError> {
    let header = state.recorder().header().await?;
    let sessions = state.recorder().layout().session_labels(&header);
    Ok(Json(ApiResponse::success(
        SessionsResponse {
            sessions,
            running: state.displays().running(),
        },
        "Sessions retrieved",
    )))
}

/// GET /api/attendance/sessions/{label}/token
///
/// The token a display for `label` shows at this moment. Computed from the
/// clock alone, so it works whether or not a display loop is running.
pub async fn get_session_token(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Json<ApiResponse<TokenResponse>> {
    let label = label.trim();
    let token = SessionToken::at(label, state.policy().window_seconds, state.now());
    let running = state.displays().is_running(label);
    Json(ApiResponse::success(
        TokenResponse::new(token, state.public_base_url(), running),
        "Current token",
    ))
}

/// GET /api/attendance/sessions/{label}/stats
///
/// Present/absent totals and rate for one session, broken down by group.
///
/// ### Responses
/// - `200 OK` with `SessionStats`
/// - `422 Unprocessable Entity` when `label` is not a column in the sheet
/// - `503 Service Unavailable`
pub async fn get_session_stats(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<Json<ApiResponse<SessionStats>>, ApiError> {
    let recorder = state.recorder();
    let header = recorder.header().await?;
    let records = recorder.records().await?;
    let stats = session_stats(recorder.layout(), &header, &records, &label)?;
    let message = format!(
        "{} of {} students present in {}",
        stats.present, stats.total, stats.session_label
    );
    Ok(Json(ApiResponse::success(stats, message)))
}
