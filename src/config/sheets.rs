//! Spreadsheet persistence configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Google Sheets backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Target spreadsheet document id
    pub spreadsheet_id: String,

    /// OAuth bearer token for the Sheets API
    pub access_token: String,

    /// Base URL of the Sheets API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl SheetsConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate persistence configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ValidationError::InvalidSpreadsheetId);
        }
        if self.access_token.trim().is_empty() {
            return Err(ValidationError::MissingRequired(
                "MIRROR_STUDY__SHEETS__ACCESS_TOKEN",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_timeout() -> u64 {
    30
}
