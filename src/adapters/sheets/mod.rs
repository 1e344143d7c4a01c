//! Row store adapters.

mod in_memory_store;
mod sheets_store;

pub use in_memory_store::InMemoryRowStore;
pub use sheets_store::{SheetsStore, SheetsStoreConfig};
