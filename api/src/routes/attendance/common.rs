use serde::Serialize;
use services::SessionToken;

/// Broadcast on the session topic after a first successful mark.
pub const ATTENDANCE_MARKED: &str = "attendance.marked";

#[derive(Debug, Serialize)]
pub struct AttendanceMarked {
    pub session_label: String,
    pub student_id: String,
    pub recorded_at: String,
}

/// Token currently on display for a session, plus the link encoded in the QR code.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub session_label: String,
    pub token: i64,
    pub window_seconds: i64,
    pub seconds_remaining: i64,
    pub link: String,
    pub running: bool,
}

impl TokenResponse {
    pub fn new(token: SessionToken, base_url: &str, running: bool) -> Self {
        let link = token.display_link(base_url);
        Self {
            session_label: token.session_label,
            token: token.token,
            window_seconds: token.window_seconds,
            seconds_remaining: token.seconds_remaining,
            link,
            running,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionColumns {
    pub session_label: String,
    pub presence_column: usize,
    pub time_column: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    /// Session labels declared in the sheet header, in column order.
    pub sessions: Vec<String>,
    /// Labels with a display loop running in this process.
    pub running: Vec<String>,
}
