//! Google Sheets adapter for the row store port.
//!
//! Each table is a sheet (tab) in one spreadsheet. `ensure_header` reads
//! the sheet's values to see whether any rows exist; `append_row` POSTs to
//! the values `:append` endpoint with `valueInputOption=USER_ENTERED`, the
//! same write the study originally performed.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{RowStore, StoreError};

/// Configuration for the sheets adapter.
#[derive(Debug, Clone)]
pub struct SheetsStoreConfig {
    /// OAuth bearer token for the Sheets API.
    access_token: Secret<String>,
    /// Target spreadsheet document.
    pub spreadsheet_id: String,
    /// Base URL for the API (default: https://sheets.googleapis.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl SheetsStoreConfig {
    /// Creates a configuration for the given spreadsheet.
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            spreadsheet_id: spreadsheet_id.into(),
            base_url: "https://sheets.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the access token (for making requests).
    fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// Spreadsheet-backed row store.
pub struct SheetsStore {
    config: SheetsStoreConfig,
    client: Client,
}

impl SheetsStore {
    /// Creates a new store with the given configuration.
    ///
    /// # Errors
    ///
    /// - `Unavailable` if the HTTP client cannot be constructed
    pub fn new(config: SheetsStoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::unavailable(format!("http client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Builds the values URL for reading a whole sheet.
    fn values_url(&self, table: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.config.base_url, self.config.spreadsheet_id, table
        )
    }

    /// Builds the append URL for a sheet.
    fn append_url(&self, table: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            self.config.base_url, self.config.spreadsheet_id, table
        )
    }

    /// Maps a response status to an error, passing successes through.
    async fn handle_response_status(
        &self,
        table: &str,
        response: Response,
    ) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(StoreError::table_not_found(table)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::unavailable(
                format!("authentication rejected ({status}): {body}"),
            )),
            _ => Err(StoreError::unavailable(format!(
                "unexpected status {status}: {body}"
            ))),
        }
    }

    /// Returns how many rows the sheet currently holds.
    async fn row_count(&self, table: &str) -> Result<usize, StoreError> {
        let response = self
            .client
            .get(self.values_url(table))
            .bearer_auth(self.config.access_token())
            .send()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        let response = self.handle_response_status(table, response).await?;

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| StoreError::parse(format!("values response: {e}")))?;

        Ok(range.values.map_or(0, |rows| rows.len()))
    }
}

#[async_trait]
impl RowStore for SheetsStore {
    async fn ensure_header(&self, table: &str, header: &[&str]) -> Result<(), StoreError> {
        if self.row_count(table).await? > 0 {
            return Ok(());
        }
        tracing::info!(table, "inserting header row");
        self.append_row(table, header.iter().map(|c| c.to_string()).collect())
            .await
    }

    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<(), StoreError> {
        let body = AppendBody { values: vec![row] };
        let response = self
            .client
            .post(self.append_url(table))
            .bearer_auth(self.config.access_token())
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        self.handle_response_status(table, response).await?;
        Ok(())
    }
}

// ----- Sheets API Types -----

#[derive(Debug, Deserialize)]
struct ValueRange {
    values: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Serialize)]
struct AppendBody {
    values: Vec<Vec<String>>,
}
