//! Row Store Port - Interface for the spreadsheet-backed append log.
//!
//! The study persists into two named tables ("survey", "conversation"),
//! each a row-oriented append log with a fixed header. Rows are only ever
//! appended; nothing is updated or deleted, which keeps independent
//! sessions safe without coordination.

use async_trait::async_trait;

/// Port for append-only row persistence.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Appends the header row if the table currently has zero rows.
    ///
    /// Idempotent: calling this on a table that already has its header
    /// (or any rows at all) is a no-op.
    async fn ensure_header(&self, table: &str, header: &[&str]) -> Result<(), StoreError>;

    /// Appends one row to the named table.
    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<(), StoreError>;
}

/// Row store errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Backing store is unreachable or rejected the call.
    #[error("persistence unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// The named table does not exist in the backing store.
    #[error("table not found: {table}")]
    TableNotFound {
        /// Requested table name.
        table: String,
    },

    /// The store returned something we could not interpret.
    #[error("parse error: {0}")]
    Parse(String),
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a table-not-found error.
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
