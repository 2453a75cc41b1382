//! In-process ledger store

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::types::{CellValue, Grid, SheetRow};
use crate::LedgerStore;

/// Ledger store holding the whole sheet in memory
#[derive(Debug)]
pub struct MemoryStore {
    grid: Mutex<Grid>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty sheet with the standard header row
    pub fn new() -> Self {
        Self {
            grid: Mutex::new(Grid::with_standard_header()),
        }
    }

    /// Standard header plus the given data rows
    pub fn with_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let mut grid = Grid::with_standard_header();
        for row in rows {
            grid.append(row);
        }
        Self { grid: Mutex::new(grid) }
    }

    /// Build from raw cells, header row included
    pub fn from_cells(cells: Vec<Vec<CellValue>>) -> Self {
        Self {
            grid: Mutex::new(Grid::from_cells(cells)),
        }
    }

    /// Copy of every sheet row, header included
    pub fn snapshot(&self) -> Vec<Vec<CellValue>> {
        self.lock().map(|g| g.cells().to_vec()).unwrap_or_default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Grid>> {
        self.grid.lock().map_err(|_| StoreError::InvalidResponse {
            message: "memory store lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn read_all_rows(&self) -> StoreResult<Vec<SheetRow>> {
        Ok(self.lock()?.records())
    }

    async fn read_header(&self) -> StoreResult<Vec<String>> {
        Ok(self.lock()?.header())
    }

    async fn append_row(&self, values: Vec<CellValue>) -> StoreResult<()> {
        self.lock()?.append(values);
        Ok(())
    }

    async fn update_cell(&self, row: usize, column: usize, value: CellValue) -> StoreResult<()> {
        self.lock()?.set(row, column, value)
    }

    async fn delete_row(&self, row: usize) -> StoreResult<()> {
        self.lock()?.remove_row(row)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
