//! In-memory row store for testing.
//!
//! Keeps tables as plain vectors behind a mutex and supports failure
//! injection so submission tests can exercise total and partial
//! persistence failures deterministically.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::{RowStore, StoreError};

/// Map-backed row store.
#[derive(Debug, Default)]
pub struct InMemoryRowStore {
    tables: Mutex<HashMap<String, Vec<Vec<String>>>>,
    /// Remaining store calls to allow; `None` means never fail.
    budget: Mutex<Option<usize>>,
}

impl InMemoryRowStore {
    /// Creates an empty store that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the store fail every call after the first `calls` calls.
    ///
    /// Both `ensure_header` and `append_row` consume one call each, in
    /// the order they arrive.
    pub fn failing_after(self, calls: usize) -> Self {
        *self.budget.lock().unwrap() = Some(calls);
        self
    }

    /// Returns a copy of the named table's rows (header included).
    pub fn rows(&self, table: &str) -> Vec<Vec<String>> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Consumes one call from the failure budget.
    fn charge(&self) -> Result<(), StoreError> {
        let mut budget = self.budget.lock().unwrap();
        match budget.as_mut() {
            None => Ok(()),
            Some(0) => Err(StoreError::unavailable("injected store failure")),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn ensure_header(&self, table: &str, header: &[&str]) -> Result<(), StoreError> {
        self.charge()?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        if rows.is_empty() {
            rows.push(header.iter().map(|c| c.to_string()).collect());
        }
        Ok(())
    }

    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<(), StoreError> {
        self.charge()?;
        let mut tables = self.tables.lock().unwrap();
        tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }
}
