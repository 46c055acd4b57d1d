use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use services::search::{StudentSummary, search_students as search};

use crate::{error::ApiError, response::ApiResponse, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/students?q=
///
/// Case-insensitive search over student ids and names. A missing or blank
/// `q` lists the whole roster, each entry with its attended session count.
///
/// ### Responses
/// - `200 OK` with `Vec<StudentSummary>`
/// - `422 Unprocessable Entity` when the id or name column is missing
/// - `503 Service Unavailable` when the sheet cannot be read
pub async fn search_students(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<StudentSummary>>>, ApiError> {
    let recorder = state.recorder();
    let header = recorder.header().await?;
    let records = recorder.records().await?;
    let q = query.q.unwrap_or_default();

    let found = search(recorder.layout(), &header, &records, &q)?;
    let message = match found.len() {
        1 => "Found 1 student".to_string(),
        n => format!("Found {n} students"),
    };
    Ok(Json(ApiResponse::success(found, message)))
}
