//! The Row Store contract: a column-header keyed table of string cells.
//!
//! Rows and columns are 1-based, spreadsheet style. Row 1 is the header row,
//! data rows start at 2. Cells that were never written read back as `""`.
//!
//! Three adapters implement the contract:
//! - [`MemoryRowStore`] for tests and throwaway demos,
//! - [`SeaOrmRowStore`] persisting cells in the local `sheet_cells` table,
//! - [`SheetsRowStore`] talking to a remote spreadsheet values API.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod memory;
pub mod sea;
pub mod sheets;

pub use memory::MemoryRowStore;
pub use sea::SeaOrmRowStore;
pub use sheets::SheetsRowStore;

/// Index of the header row.
pub const HEADER_ROW: usize = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row store unavailable: {0}")]
    Unavailable(String),

    #[error("row store call timed out after {0} ms")]
    Timeout(u64),

    #[error("cell ({row}, {col}) is outside the sheet")]
    OutOfRange { row: usize, col: usize },

    #[error("unexpected row store response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait RowStore: Send + Sync {
    /// Ordered column names of row 1. Trailing blank headers may be omitted.
    async fn header_row(&self) -> Result<Vec<String>, StoreError>;

    /// First data row whose cell in `col` equals `value` exactly.
    async fn find_row(&self, col: usize, value: &str) -> Result<Option<usize>, StoreError>;

    async fn read_cell(&self, row: usize, col: usize) -> Result<String, StoreError>;

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError>;

    /// Writes a header name into row 1 at `col`.
    async fn append_header_cell(&self, col: usize, name: &str) -> Result<(), StoreError> {
        self.write_cell(HEADER_ROW, col, name).await
    }

    /// Every data row (row 2 onwards), in sheet order.
    async fn records(&self) -> Result<Vec<Vec<String>>, StoreError>;
}

/// Shared handle used by the services and the HTTP layer.
pub type DynRowStore = Arc<dyn RowStore>;

pub(crate) fn check_cell(row: usize, col: usize) -> Result<(), StoreError> {
    if row == 0 || col == 0 {
        return Err(StoreError::OutOfRange { row, col });
    }
    Ok(())
}

/// Spreadsheet column letters for a 1-based column index (`1 -> A`, `27 -> AA`).
pub fn column_letter(col: usize) -> String {
    let mut n = col;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
