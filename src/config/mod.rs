//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `MIRROR_STUDY` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use mirror_study::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Dialogue model: {}", config.ai.model);
//! ```

mod ai;
mod error;
mod sheets;
mod study;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use sheets::SheetsConfig;
pub use study::StudyConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the study chatbot. Load using
/// [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Dialogue endpoint configuration (OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Persistence configuration (Google Sheets)
    pub sheets: SheetsConfig,

    /// Study procedure configuration
    #[serde(default)]
    pub study: StudyConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `MIRROR_STUDY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `MIRROR_STUDY__AI__OPENAI_API_KEY=sk-...` -> `ai.openai_api_key`
    /// - `MIRROR_STUDY__SHEETS__SPREADSHEET_ID=...` -> `sheets.spreadsheet_id`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MIRROR_STUDY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.sheets.validate()?;
        self.study.validate()?;
        Ok(())
    }
}
