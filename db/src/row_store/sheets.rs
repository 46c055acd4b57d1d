//! Adapter for a remote spreadsheet exposing the Google Sheets v4 values API.
//!
//! Only the `values` endpoints are used: `GET .../values/{range}` and
//! `PUT .../values/{range}?valueInputOption=RAW`. Acquiring the bearer token is
//! the deployment's business; it arrives through configuration.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{HEADER_ROW, RowStore, StoreError, check_cell, column_letter};

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub api_base: String,
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub access_token: String,
    pub timeout: Duration,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    #[serde(default)]
    values: Vec<Vec<String>>,
}

pub struct SheetsRowStore {
    client: Client,
    config: SheetsConfig,
}

impl SheetsRowStore {
    pub fn new(config: SheetsConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// `Sheet1!B7`, `Sheet1!1:1`, `Sheet1!C:C` ... quoted when the sheet name needs it.
    fn a1(&self, reference: &str) -> String {
        a1_range(&self.config.worksheet, reference)
    }

    fn values_url(&self, range: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| StoreError::Unavailable(format!("bad api base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable("api base cannot hold a path".into()))?
            .push(&self.config.spreadsheet_id)
            .push("values")
            .push(range);
        Ok(url)
    }

    async fn get_range(&self, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let url = self.values_url(range)?;
        tracing::debug!(%range, "sheets GET");
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(transport_error)?;
        let body: ValueRange = check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(body.values)
    }

    async fn put_cell(&self, range: &str, value: &str) -> Result<(), StoreError> {
        let mut url = self.values_url(range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".into()),
            values: vec![vec![value.to_string()]],
        };
        tracing::debug!(%range, "sheets PUT");
        let resp = self
            .client
            .put(url)
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(resp).await?;
        Ok(())
    }
}

pub fn a1_range(worksheet: &str, reference: &str) -> String {
    let plain = worksheet
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        format!("{worksheet}!{reference}")
    } else {
        format!("'{}'!{reference}", worksheet.replace('\'', "''"))
    }
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Unavailable(format!("sheets request timed out: {e}"))
    } else {
        StoreError::Unavailable(e.to_string())
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::BAD_REQUEST => StoreError::Malformed(text),
        _ => StoreError::Unavailable(format!("sheets responded {status}: {text}")),
    })
}

#[async_trait]
impl RowStore for SheetsRowStore {
    async fn header_row(&self) -> Result<Vec<String>, StoreError> {
        let range = self.a1(&format!("{HEADER_ROW}:{HEADER_ROW}"));
        Ok(self.get_range(&range).await?.into_iter().next().unwrap_or_default())
    }

    async fn find_row(&self, col: usize, value: &str) -> Result<Option<usize>, StoreError> {
        check_cell(HEADER_ROW, col)?;
        let letter = column_letter(col);
        let range = self.a1(&format!("{letter}:{letter}"));
        let column = self.get_range(&range).await?;
        Ok(column
            .iter()
            .enumerate()
            .skip(HEADER_ROW)
            .find(|(_, cells)| cells.first().map(String::as_str) == Some(value))
            .map(|(i, _)| i + 1))
    }

    async fn read_cell(&self, row: usize, col: usize) -> Result<String, StoreError> {
        check_cell(row, col)?;
        let range = self.a1(&format!("{}{row}", column_letter(col)));
        Ok(self
            .get_range(&range)
            .await?
            .into_iter()
            .next()
            .and_then(|r| r.into_iter().next())
            .unwrap_or_default())
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        check_cell(row, col)?;
        let range = self.a1(&format!("{}{row}", column_letter(col)));
        self.put_cell(&range, value).await
    }

    async fn records(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let range = a1_sheet_only(&self.config.worksheet);
        Ok(self.get_range(&range).await?.into_iter().skip(HEADER_ROW).collect())
    }
}

/// A bare sheet name addresses the whole used range.
fn a1_sheet_only(worksheet: &str) -> String {
    a1_range(worksheet, "")
        .trim_end_matches('!')
        .to_string()
}
