use db::row_store::StoreError;
use thiserror::Error;

/// Everything a submission or a lecturer view can fail with.
///
/// `AlreadyRecorded` is deliberately absent: a duplicate submission is a
/// successful outcome (see `RecordOutcome`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("attendance code is invalid or expired; a new code appears in {seconds_remaining}s")]
    TokenInvalid { seconds_remaining: i64 },

    #[error("column '{0}' not found in the attendance sheet")]
    HeaderNotFound(String),

    #[error("student '{0}' not found")]
    StudentNotFound(String),

    #[error("name does not match the registered name for this student")]
    IdentityMismatch,

    #[error("attendance store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AttendanceError {
    /// Input problems the student or operator can fix, as opposed to outages.
    pub fn is_user_correctable(&self) -> bool {
        !matches!(self, AttendanceError::StoreUnavailable(_))
    }
}

impl From<StoreError> for AttendanceError {
    fn from(err: StoreError) -> Self {
        AttendanceError::StoreUnavailable(err.to_string())
    }
}
