//! HTTP mapping for [`AttendanceError`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::AttendanceError;

use crate::response::{ApiResponse, ErrorData};

/// Wrapper so handlers can `?` service errors straight into a response.
#[derive(Debug)]
pub struct ApiError(pub AttendanceError);

impl From<AttendanceError> for ApiError {
    fn from(err: AttendanceError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AttendanceError::TokenInvalid { .. } => StatusCode::BAD_REQUEST,
            AttendanceError::HeaderNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AttendanceError::StudentNotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::IdentityMismatch => StatusCode::FORBIDDEN,
            AttendanceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match &self.0 {
            AttendanceError::TokenInvalid { .. } => "token_invalid",
            AttendanceError::HeaderNotFound(_) => "header_not_found",
            AttendanceError::StudentNotFound(_) => "student_not_found",
            AttendanceError::IdentityMismatch => "identity_mismatch",
            AttendanceError::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Text shown to the caller. Backend details of an outage stay in the logs.
    pub fn message(&self) -> String {
        match &self.0 {
            AttendanceError::TokenInvalid { seconds_remaining } => format!(
                "Attendance code is invalid or expired. Scan the new code in {seconds_remaining}s"
            ),
            AttendanceError::HeaderNotFound(name) if name.is_empty() => {
                "Session label is required".to_string()
            }
            AttendanceError::HeaderNotFound(name) => {
                format!("Column '{name}' not found in the attendance sheet")
            }
            AttendanceError::StudentNotFound(id) if id.is_empty() => {
                "Student ID is required".to_string()
            }
            AttendanceError::StudentNotFound(id) => format!("Student ID '{id}' not found"),
            AttendanceError::IdentityMismatch => {
                "Name does not match the registered name for this Student ID".to_string()
            }
            AttendanceError::StoreUnavailable(_) => {
                "Attendance sheet is temporarily unavailable. Please try again".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let AttendanceError::StoreUnavailable(detail) = &self.0 {
            tracing::error!(detail = %detail, "request failed: store unavailable");
        }
        let data = ErrorData {
            code: self.code(),
            seconds_remaining: match self.0 {
                AttendanceError::TokenInvalid { seconds_remaining } => Some(seconds_remaining),
                _ => None,
            },
        };
        (
            self.status(),
            Json(ApiResponse::failure(data, self.message())),
        )
            .into_response()
    }
}
