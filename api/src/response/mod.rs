use serde::Serialize;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// ```json
/// {
///   "success": true,
///   "data": { "status": "recorded", "row": 2, "recorded_at": "08/09/2025 07:01:00" },
///   "message": "Attendance recorded at 08/09/2025 07:01:00"
/// }
/// ```
///
/// Failed requests carry `success: false`, a human-readable `message` and
/// either an empty `data` object or an [`ErrorData`] describing the failure.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Error response with default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }

    /// Error response that still carries a payload.
    pub fn failure(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            message: message.into(),
        }
    }
}

/// Empty `data` object for responses without a payload.
#[derive(Serialize, Default)]
pub struct Empty {}

/// Machine-readable half of an error response.
#[derive(Debug, Serialize, Default, PartialEq, Eq)]
pub struct ErrorData {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<i64>,
}
