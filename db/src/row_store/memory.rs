use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{HEADER_ROW, RowStore, StoreError, check_cell};

/// In-process sheet. `rows[0]` is the header row.
///
/// Besides serving tests it can simulate an outage (`set_unavailable`) and
/// counts writes so callers can assert that a rejected submission wrote nothing.
#[derive(Default)]
pub struct MemoryRowStore {
    rows: RwLock<Vec<Vec<String>>>,
    unavailable: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows<H, R>(header: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = Vec<&'static str>>,
    {
        let mut all = vec![header.into_iter().map(Into::into).collect::<Vec<String>>()];
        all.extend(
            rows.into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect::<Vec<_>>()),
        );
        Self {
            rows: RwLock::new(all),
            ..Self::default()
        }
    }

    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    /// Number of successful `write_cell` calls (header appends included).
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn ensure_up(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn header_row(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_up()?;
        Ok(self.rows.read().await.first().cloned().unwrap_or_default())
    }

    async fn find_row(&self, col: usize, value: &str) -> Result<Option<usize>, StoreError> {
        self.ensure_up()?;
        check_cell(HEADER_ROW, col)?;
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, r)| r.get(col - 1).map(String::as_str) == Some(value))
            .map(|(i, _)| i + 1))
    }

    async fn read_cell(&self, row: usize, col: usize) -> Result<String, StoreError> {
        self.ensure_up()?;
        check_cell(row, col)?;
        let rows = self.rows.read().await;
        Ok(rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or_default())
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        self.ensure_up()?;
        check_cell(row, col)?;
        let mut rows = self.rows.write().await;
        if rows.len() < row {
            rows.resize_with(row, Vec::new);
        }
        let cells = &mut rows[row - 1];
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn records(&self) -> Result<Vec<Vec<String>>, StoreError> {
        self.ensure_up()?;
        Ok(self.rows.read().await.iter().skip(1).cloned().collect())
    }
}
