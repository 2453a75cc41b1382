//! Ledger store for cuotas
//!
//! The purchase ledger is a single table: one header row and one row per
//! purchase. This crate knows the column schema and how to talk to the
//! table, and nothing about what the values mean.

use async_trait::async_trait;
use cuotas_config::{StoreBackend, StoreConfig};
use std::sync::Arc;

pub mod csv_store;
pub mod error;
pub mod memory;
pub mod sheets;
pub mod types;

pub use csv_store::CsvStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sheets::SheetsStore;
pub use types::{CellValue, Column, Grid, SheetRow, FIRST_DATA_ROW};

// ==================== Store Trait ====================

/// Store reference type
pub type StoreRef = Arc<dyn LedgerStore>;

/// Row/column addressed table with a fixed header row.
///
/// Rows and columns are 1-based; row 1 is the header.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Every data row, keyed by header text
    async fn read_all_rows(&self) -> StoreResult<Vec<SheetRow>>;

    /// The header row as stored
    async fn read_header(&self) -> StoreResult<Vec<String>>;

    /// Add one row after the last existing row
    async fn append_row(&self, values: Vec<CellValue>) -> StoreResult<()>;

    /// Overwrite a single cell
    async fn update_cell(&self, row: usize, column: usize, value: CellValue) -> StoreResult<()>;

    /// Remove a data row, shifting later rows up by one
    async fn delete_row(&self, row: usize) -> StoreResult<()>;

    /// Short human-readable description for logs and the settings page
    fn describe(&self) -> String;
}

/// Build the store selected in the configuration
pub fn open_store(config: &StoreConfig) -> StoreResult<StoreRef> {
    let store: StoreRef = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Csv => Arc::new(CsvStore::open(config.csv_path.clone())?),
        StoreBackend::Sheets => {
            let sheets = config.sheets.clone().unwrap_or_default();
            Arc::new(SheetsStore::new(&sheets)?)
        }
    };
    log::info!("Using ledger store {}", store.describe());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory_store() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.describe(), "memory");
    }

    #[test]
    fn test_open_csv_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            backend: StoreBackend::Csv,
            csv_path: dir.path().join("ledger.csv"),
            ..StoreConfig::default()
        };
        let store = open_store(&config).unwrap();
        assert!(store.describe().starts_with("csv:"));
    }
}
