//! Rotating session tokens and the gate that checks a scanned snapshot.
//!
//! A token is the index of the fixed-length time window containing "now":
//! `floor(unix_seconds / window_seconds)`. Nothing is stored; any two callers
//! observing the same second derive the same token.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::error::AttendanceError;

/// Slot index of the window containing `now`. Windows shorter than one second are treated as one second.
pub fn current_slot(now: DateTime<Utc>, window_seconds: i64) -> i64 {
    now.timestamp().div_euclid(window_seconds.max(1))
}

/// Seconds until the next slot boundary, in `1..=window_seconds`.
pub fn seconds_remaining(now: DateTime<Utc>, window_seconds: i64) -> i64 {
    let w = window_seconds.max(1);
    w - now.timestamp().rem_euclid(w)
}

/// The token shown on the lecturer display for one session label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionToken {
    pub session_label: String,
    pub token: i64,
    pub window_seconds: i64,
    pub seconds_remaining: i64,
}

impl SessionToken {
    pub fn at(session_label: impl Into<String>, window_seconds: i64, now: DateTime<Utc>) -> Self {
        Self {
            session_label: session_label.into(),
            token: current_slot(now, window_seconds),
            window_seconds: window_seconds.max(1),
            seconds_remaining: seconds_remaining(now, window_seconds),
        }
    }

    /// Link encoded into the scannable code: `base?mode=student&session=..&token=..`.
    ///
    /// An unparsable base falls back to a relative link so the display keeps working.
    pub fn display_link(&self, base_url: &str) -> String {
        let token = self.token.to_string();
        let params = [
            ("mode", "student"),
            ("session", self.session_label.as_str()),
            ("token", token.as_str()),
        ];
        match Url::parse_with_params(base_url, params) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!(base_url, "invalid public base url: {e}");
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(params)
                    .finish();
                format!("?{query}")
            }
        }
    }
}

/// Acceptance policy for scanned token snapshots.
///
/// Strict mode accepts only the exact current slot, bounding replay of a
/// screenshotted code to one window. Relaxed mode also accepts the adjacent
/// slots, tolerating one window of clock or network skew at the cost of a
/// wider replay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub window_seconds: i64,
    pub strict: bool,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            window_seconds: 30,
            strict: true,
        }
    }
}

impl TokenPolicy {
    pub fn new(window_seconds: i64, strict: bool) -> Self {
        Self {
            window_seconds: window_seconds.max(1),
            strict,
        }
    }

    pub fn is_valid(&self, snapshot: Option<&str>, now: DateTime<Utc>) -> bool {
        let Some(slot) = snapshot.and_then(|s| s.trim().parse::<i64>().ok()) else {
            return false;
        };
        let current = current_slot(now, self.window_seconds);
        if self.strict {
            slot == current
        } else {
            slot.abs_diff(current) <= 1
        }
    }

    /// Like [`is_valid`](Self::is_valid) but returns the accepted slot, or the
    /// countdown the student should wait for before rescanning.
    pub fn validate(&self, snapshot: Option<&str>, now: DateTime<Utc>) -> Result<i64, AttendanceError> {
        if self.is_valid(snapshot, now) {
            // is_valid guarantees the parse
            return Ok(snapshot
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or_else(|| current_slot(now, self.window_seconds)));
        }
        Err(AttendanceError::TokenInvalid {
            seconds_remaining: seconds_remaining(now, self.window_seconds),
        })
    }
}
