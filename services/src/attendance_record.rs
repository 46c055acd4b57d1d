//! Idempotent presence recording against the Row Store.
//!
//! For each `(student_id, session_label)` the presence cell goes from empty to
//! non-empty at most once. A repeated submission reads the existing marker and
//! reports the original arrival time instead of writing again. No write is
//! issued before the header, student and name checks have all passed.

use chrono::{DateTime, Utc};
use db::row_store::{DynRowStore, StoreError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

use crate::attendance_session::TokenPolicy;
use crate::error::AttendanceError;
use crate::identity::names_match;
use crate::row_locks::RowLocks;
use crate::sheet_layout::SheetLayout;

/// One student action: the scanned token plus who they claim to be.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Submission {
    pub session_label: String,
    #[serde(default)]
    pub token: Option<String>,
    pub student_id: String,
    pub claimed_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// First mark for the pair; `recorded_at` was just written.
    Recorded { row: usize, recorded_at: String },
    /// The pair was already present. `recorded_at` is the stored time, if any.
    AlreadyRecorded {
        row: usize,
        recorded_at: Option<String>,
    },
}

impl RecordOutcome {
    pub fn recorded_at(&self) -> Option<&str> {
        match self {
            RecordOutcome::Recorded { recorded_at, .. } => Some(recorded_at),
            RecordOutcome::AlreadyRecorded { recorded_at, .. } => recorded_at.as_deref(),
        }
    }
}

pub struct AttendanceRecorder {
    store: DynRowStore,
    layout: SheetLayout,
    timeout: Duration,
    locks: RowLocks,
    /// Held while appending header cells; the header row is shared by every session.
    header_lock: AsyncMutex<()>,
}

impl AttendanceRecorder {
    pub fn new(store: DynRowStore, layout: SheetLayout, timeout: Duration) -> Self {
        Self {
            store,
            layout,
            timeout,
            locks: RowLocks::new(),
            header_lock: AsyncMutex::new(()),
        }
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn store(&self) -> &DynRowStore {
        &self.store
    }

    /// Bounds one store call; expiry and backend errors both become `StoreUnavailable`.
    async fn call<T, F>(&self, fut: F) -> Result<T, AttendanceError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                tracing::error!(error = %e, "row store call failed");
                AttendanceError::from(e)
            }),
            Err(_) => {
                let ms = self.timeout.as_millis() as u64;
                tracing::error!(timeout_ms = ms, "row store call timed out");
                Err(StoreError::Timeout(ms).into())
            }
        }
    }

    /// Token gate followed by [`record`](Self::record). A rejected token never reaches the store.
    pub async fn submit(
        &self,
        submission: &Submission,
        policy: &TokenPolicy,
        now: DateTime<Utc>,
    ) -> Result<RecordOutcome, AttendanceError> {
        if let Err(e) = policy.validate(submission.token.as_deref(), now) {
            tracing::info!(
                session = %submission.session_label,
                student = %submission.student_id.trim(),
                "rejected attendance token"
            );
            return Err(e);
        }
        self.record(submission, now).await
    }

    /// Applies an already validated submission.
    pub async fn record(
        &self,
        submission: &Submission,
        now: DateTime<Utc>,
    ) -> Result<RecordOutcome, AttendanceError> {
        let label = submission.session_label.trim();
        let student_id = submission.student_id.trim();
        let _guard = self.locks.acquire(student_id, label).await;

        // 1. columns, only declared session headers take marks
        if !self.layout.is_session_label(label) {
            return Err(AttendanceError::HeaderNotFound(label.to_string()));
        }
        let header = self.call(self.store.header_row()).await?;
        let presence_col = SheetLayout::column_of(&header, label)
            .ok_or_else(|| AttendanceError::HeaderNotFound(label.to_string()))?;
        let id_col = self.require_column(&header, &self.layout.student_id_header)?;
        let name_col = self.require_column(&header, &self.layout.name_header)?;

        // 2. student row
        if student_id.is_empty() {
            return Err(AttendanceError::StudentNotFound(String::new()));
        }
        let row = self
            .call(self.store.find_row(id_col, student_id))
            .await?
            .ok_or_else(|| AttendanceError::StudentNotFound(student_id.to_string()))?;

        // 3. identity
        let stored_name = self.call(self.store.read_cell(row, name_col)).await?;
        if !names_match(&stored_name, &submission.claimed_name) {
            tracing::info!(student = student_id, session = label, "name mismatch");
            return Err(AttendanceError::IdentityMismatch);
        }

        // 4. duplicate check, the store is the only authority
        let marker = self.call(self.store.read_cell(row, presence_col)).await?;
        if self.layout.is_present(&marker) {
            let recorded_at = match self.layout.time_column(&header, label) {
                Some(col) => {
                    let ts = self.call(self.store.read_cell(row, col)).await?;
                    (!ts.trim().is_empty()).then_some(ts)
                }
                None => None,
            };
            tracing::info!(student = student_id, session = label, "attendance already recorded");
            return Ok(RecordOutcome::AlreadyRecorded { row, recorded_at });
        }

        // 5. time column, created on first use
        let time_col = match self.layout.time_column(&header, label) {
            Some(col) => col,
            None => {
                let _header_guard = self.header_lock.lock().await;
                let mut header = self.call(self.store.header_row()).await?;
                self.ensure_time_column(&mut header, label).await?
            }
        };

        // 6 + 7. marker then timestamp
        let recorded_at = self.layout.format_timestamp(now);
        self.call(self.store.write_cell(row, presence_col, &self.layout.presence_mark))
            .await?;
        self.call(self.store.write_cell(row, time_col, &recorded_at))
            .await?;

        tracing::info!(student = student_id, session = label, %recorded_at, "attendance recorded");
        Ok(RecordOutcome::Recorded { row, recorded_at })
    }

    /// Declares the presence and time columns of a session up front. Idempotent.
    ///
    /// Returns the `(presence_col, time_col)` pair.
    pub async fn ensure_session_columns(
        &self,
        session_label: &str,
    ) -> Result<(usize, usize), AttendanceError> {
        let label = session_label.trim();
        if !self.layout.is_session_label(label) {
            return Err(AttendanceError::HeaderNotFound(label.to_string()));
        }
        let _header_guard = self.header_lock.lock().await;
        let mut header = self.call(self.store.header_row()).await?;

        let presence_col = match SheetLayout::column_of(&header, label) {
            Some(col) => col,
            None => {
                let col = header.len() + 1;
                self.call(self.store.append_header_cell(col, label)).await?;
                header.push(label.to_string());
                col
            }
        };
        let time_col = self.ensure_time_column(&mut header, label).await?;
        Ok((presence_col, time_col))
    }

    /// Resolves the time column of `label` in a freshly read `header`, appending it
    /// when missing. Callers hold `header_lock`.
    async fn ensure_time_column(
        &self,
        header: &mut Vec<String>,
        label: &str,
    ) -> Result<usize, AttendanceError> {
        if let Some(col) = self.layout.time_column(header, label) {
            return Ok(col);
        }
        let col = header.len() + 1;
        let name = self.layout.time_column_name(label);
        self.call(self.store.append_header_cell(col, &name)).await?;
        tracing::info!(column = col, %name, "created time column");
        header.push(name);
        Ok(col)
    }

    /// Header row through the same timeout and error mapping as recording.
    pub async fn header(&self) -> Result<Vec<String>, AttendanceError> {
        self.call(self.store.header_row()).await
    }

    pub async fn records(&self) -> Result<Vec<Vec<String>>, AttendanceError> {
        self.call(self.store.records()).await
    }

    fn require_column(&self, header: &[String], name: &str) -> Result<usize, AttendanceError> {
        SheetLayout::column_of(header, name)
            .ok_or_else(|| AttendanceError::HeaderNotFound(name.to_string()))
    }
}
