use axum::{
    Json,
    extract::{Path, State},
};
use services::{RecordOutcome, Submission};
use util::ws::{attendance_session_topic, emit};

use super::common::{ATTENDANCE_MARKED, AttendanceMarked, SessionColumns, TokenResponse};
use crate::{error::ApiError, response::ApiResponse, state::AppState};

/// POST /api/attendance/mark
///
/// Records a student's presence for a session. The scanned token is checked
/// first; a stale or missing token never reaches the sheet.
///
/// ### Request Body
/// ```json
/// {
///   "session_label": "Session 1",
///   "token": "33",
///   "student_id": "12345678",
///   "claimed_name": "tran van b"
/// }
/// ```
///
/// ### Responses
/// - `200 OK` `{ "status": "recorded", "row": 2, "recorded_at": "..." }`
/// - `200 OK` `{ "status": "already_recorded", ... }` with the original time
/// - `400 Bad Request` token invalid or expired (`seconds_remaining` until the next code)
/// - `403 Forbidden` name does not match the roster
/// - `404 Not Found` unknown student id
/// - `422 Unprocessable Entity` session or roster column missing from the sheet
/// - `503 Service Unavailable` sheet unreachable or too slow
pub async fn mark_attendance(
    State(state): State<AppState>,
    Json(body): Json<Submission>,
) -> Result<Json<ApiResponse<RecordOutcome>>, ApiError> {
    let outcome = state
        .recorder()
        .submit(&body, state.policy(), state.now())
        .await?;

    let message = match &outcome {
        RecordOutcome::Recorded { recorded_at, .. } => {
            let event = AttendanceMarked {
                session_label: body.session_label.trim().to_string(),
                student_id: body.student_id.trim().to_string(),
                recorded_at: recorded_at.clone(),
            };
            let topic = attendance_session_topic(&event.session_label);
            emit(state.ws(), &topic, ATTENDANCE_MARKED, &event).await;
            format!("Attendance recorded at {recorded_at}")
        }
        RecordOutcome::AlreadyRecorded {
            recorded_at: Some(at),
            ..
        } => format!("Attendance already recorded at {at}"),
        RecordOutcome::AlreadyRecorded { .. } => "Attendance already recorded".to_string(),
    };
    Ok(Json(ApiResponse::success(outcome, message)))
}

/// POST /api/attendance/sessions/{label}/setup
///
/// Declares the presence and time columns for a session. Safe to repeat.
pub async fn setup_session(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<Json<ApiResponse<SessionColumns>>, ApiError> {
    let (presence_column, time_column) =
        state.recorder().ensure_session_columns(&label).await?;
    let session_label = label.trim().to_string();
    let message = format!("Columns ready for {session_label}");
    Ok(Json(ApiResponse::success(
        SessionColumns {
            session_label,
            presence_column,
            time_column,
        },
        message,
    )))
}

/// POST /api/attendance/sessions/{label}/display
///
/// Ensures the session columns exist, then starts (or restarts) the display
/// loop streaming tokens on `attendance:session:{label}`. Returns the token
/// showing right now.
pub async fn start_display(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    state.recorder().ensure_session_columns(&label).await?;

    let token = state.displays().start(
        &label,
        state.display_config(),
        state.ws_clone(),
        state.clock(),
    );
    let message = format!("Display started for {}", token.session_label);
    Ok(Json(ApiResponse::success(
        TokenResponse::new(token, state.public_base_url(), true),
        message,
    )))
}
