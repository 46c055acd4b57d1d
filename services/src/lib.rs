//! Attendance domain: rotating session tokens, the token gate, idempotent
//! presence recording against the Row Store, and the lecturer-side views.

pub mod attendance_record;
pub mod attendance_session;
pub mod display;
pub mod error;
pub mod identity;
pub mod row_locks;
pub mod search;
pub mod sheet_layout;
pub mod stats;

pub use attendance_record::{AttendanceRecorder, RecordOutcome, Submission};
pub use attendance_session::{SessionToken, TokenPolicy, current_slot, seconds_remaining};
pub use error::AttendanceError;
pub use sheet_layout::SheetLayout;
