//! Lecturer display loops.
//!
//! Each running session label owns a tokio task ticking once per second. The
//! task emits `attendance.token_rotated` whenever the slot changes and
//! `attendance.countdown` on every tick, both on the session's topic. A
//! cancellation token is checked once per iteration; stopping a display does
//! not affect submissions already in flight.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use util::ws::{WebSocketManager, attendance_session_topic, emit};

use crate::attendance_session::SessionToken;

pub const TOKEN_ROTATED: &str = "attendance.token_rotated";
pub const COUNTDOWN: &str = "attendance.countdown";

#[derive(Debug, Clone, Serialize)]
pub struct TokenRotated {
    pub session_label: String,
    pub token: i64,
    pub link: String,
    pub seconds_remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Countdown {
    pub session_label: String,
    pub token: i64,
    pub seconds_remaining: i64,
}

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub window_seconds: i64,
    pub base_url: String,
    pub tick: Duration,
}

impl DisplayConfig {
    pub fn new(window_seconds: i64, base_url: impl Into<String>) -> Self {
        Self {
            window_seconds: window_seconds.max(1),
            base_url: base_url.into(),
            tick: Duration::from_secs(1),
        }
    }
}

/// Clock used by the display loop; tests substitute a scripted one.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

#[derive(Clone, Default)]
pub struct DisplayRegistry {
    running: Arc<Mutex<HashMap<String, CancellationToken>>>,
}

impl DisplayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the loop for `session_label` and returns the token showing now.
    pub fn start(
        &self,
        session_label: &str,
        config: DisplayConfig,
        ws: WebSocketManager,
        clock: Clock,
    ) -> SessionToken {
        let label = session_label.trim().to_string();
        let cancel = CancellationToken::new();
        {
            let mut running = self.running.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(previous) = running.insert(label.clone(), cancel.clone()) {
                previous.cancel();
                tracing::info!(session = %label, "display restarted");
            }
        }

        let current = SessionToken::at(label.clone(), config.window_seconds, clock());
        tracing::info!(
            session = %label,
            window_seconds = config.window_seconds,
            "display started"
        );
        tokio::spawn(run_display(label, config, ws, clock, cancel));
        current
    }

    /// Stops the loop for `session_label`. Returns `false` when none was running.
    pub fn stop(&self, session_label: &str) -> bool {
        let removed = self
            .running
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(session_label.trim());
        match removed {
            Some(cancel) => {
                cancel.cancel();
                tracing::info!(session = session_label.trim(), "display stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, session_label: &str) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(session_label.trim())
    }

    pub fn running(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .running
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .keys()
            .cloned()
            .collect();
        labels.sort();
        labels
    }

    pub fn stop_all(&self) {
        let mut running = self.running.lock().unwrap_or_else(|p| p.into_inner());
        for (_, cancel) in running.drain() {
            cancel.cancel();
        }
    }
}

async fn run_display(
    label: String,
    config: DisplayConfig,
    ws: WebSocketManager,
    clock: Clock,
    cancel: CancellationToken,
) {
    let topic = attendance_session_topic(&label);
    let mut interval = tokio::time::interval(config.tick);
    let mut last_slot: Option<i64> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let token = SessionToken::at(label.clone(), config.window_seconds, clock());
                if last_slot != Some(token.token) {
                    last_slot = Some(token.token);
                    let rotated = TokenRotated {
                        session_label: label.clone(),
                        token: token.token,
                        link: token.display_link(&config.base_url),
                        seconds_remaining: token.seconds_remaining,
                    };
                    tracing::debug!(session = %label, token = token.token, "token rotated");
                    emit(&ws, &topic, TOKEN_ROTATED, &rotated).await;
                }
                let countdown = Countdown {
                    session_label: label.clone(),
                    token: token.token,
                    seconds_remaining: token.seconds_remaining,
                };
                emit(&ws, &topic, COUNTDOWN, &countdown).await;
            }
        }
    }
    tracing::debug!(session = %label, "display loop exited");
}
