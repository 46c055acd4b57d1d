use crate::response::ApiResponse;
use axum::{Json, response::IntoResponse};

/// GET /api/health
///
/// Returns a simple success response to indicate the API is running.
/// Does not touch the Row Store.
///
/// ```json
/// {
///   "success": true,
///   "data": "OK",
///   "message": "Health check passed"
/// }
/// ```
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK", "Health check passed"))
}
