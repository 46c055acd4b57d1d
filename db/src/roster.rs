//! Seeds an empty Row Store from a comma-separated roster.
//!
//! The first non-blank line is the header. Fields are split on `,` and trimmed;
//! quoting is not supported, so names must not contain commas.

use crate::row_store::{HEADER_ROW, RowStore, StoreError};

fn split_line(line: &str) -> Vec<String> {
    line.split(',').map(|f| f.trim().to_string()).collect()
}

/// Writes the roster into `store` starting at row 1. Returns the number of data rows.
pub async fn import_roster(store: &dyn RowStore, csv_text: &str) -> Result<usize, StoreError> {
    let mut lines = csv_text
        .lines()
        .map(|l| l.trim_start_matches('\u{feff}'))
        .filter(|l| !l.trim().is_empty());

    let Some(header) = lines.next() else {
        return Ok(0);
    };
    for (i, name) in split_line(header).iter().enumerate() {
        store.append_header_cell(i + 1, name).await?;
    }

    let mut count = 0;
    for (offset, line) in lines.enumerate() {
        let row = HEADER_ROW + 1 + offset;
        for (i, value) in split_line(line).iter().enumerate() {
            if !value.is_empty() {
                store.write_cell(row, i + 1, value).await?;
            }
        }
        count += 1;
    }
    tracing::info!(rows = count, "roster imported");
    Ok(count)
}

/// Imports only when the store has no header yet. Returns `None` when skipped.
pub async fn seed_if_empty(
    store: &dyn RowStore,
    csv_text: &str,
) -> Result<Option<usize>, StoreError> {
    if store.header_row().await?.iter().any(|h| !h.trim().is_empty()) {
        tracing::info!("row store already has a header; roster import skipped");
        return Ok(None);
    }
    import_roster(store, csv_text).await.map(Some)
}
