//! CSV-file ledger store
//!
//! The file keeps the sheet layout: a header row followed by one row per
//! purchase. Every mutation rewrites the whole file.

use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::StoreResult;
use crate::types::{CellValue, Column, Grid, SheetRow};
use crate::LedgerStore;

/// Ledger store backed by a local CSV file
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl CsvStore {
    /// Open a CSV store, creating the file with the header row if missing
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            write_grid(&path, &Grid::with_standard_header())?;
            info!("Created ledger file {}", path.display());
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<Grid> {
        read_grid(&self.path)
    }

    fn save(&self, grid: &Grid) -> StoreResult<()> {
        write_grid(&self.path, grid)
    }
}

fn read_grid(path: &Path) -> StoreResult<Grid> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record?;
        cells.push(record.iter().map(CellValue::text).collect::<Vec<_>>());
    }

    if cells.is_empty() {
        return Ok(Grid::with_standard_header());
    }
    Ok(Grid::from_cells(cells))
}

fn write_grid(path: &Path, grid: &Grid) -> StoreResult<()> {
    let width = grid
        .cells()
        .iter()
        .map(|r| r.len())
        .max()
        .unwrap_or(0)
        .max(Column::ALL.len());

    let mut writer = WriterBuilder::new().flexible(false).from_path(path)?;
    for row in grid.cells() {
        let mut fields: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        fields.resize(width, String::new());
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

#[async_trait]
impl LedgerStore for CsvStore {
    async fn read_all_rows(&self) -> StoreResult<Vec<SheetRow>> {
        let _guard = self.lock.lock().await;
        let grid = self.load()?;
        debug!("Read {} rows from {}", grid.row_count().saturating_sub(1), self.path.display());
        Ok(grid.records())
    }

    async fn read_header(&self) -> StoreResult<Vec<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.header())
    }

    async fn append_row(&self, values: Vec<CellValue>) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut grid = self.load()?;
        grid.append(values);
        self.save(&grid)
    }

    async fn update_cell(&self, row: usize, column: usize, value: CellValue) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut grid = self.load()?;
        grid.set(row, column, value)?;
        self.save(&grid)
    }

    async fn delete_row(&self, row: usize) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut grid = self.load()?;
        grid.remove_row(row)?;
        self.save(&grid)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cuotas.csv");

        let store = CsvStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.read_header().await.unwrap(), Column::headers());
        assert!(store.read_all_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_persist_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cuotas.csv");
        let store = CsvStore::open(&path).unwrap();

        store
            .append_row(vec![
                CellValue::text("01/03/2024"),
                CellValue::text("Store A"),
                CellValue::Empty,
                CellValue::text("1000.00"),
                CellValue::Number(4.0),
                CellValue::text("Naranja"),
                CellValue::Number(1.0),
                CellValue::Empty,
                CellValue::text("id-1"),
            ])
            .await
            .unwrap();
        store
            .append_row(vec![CellValue::text("02/03/2024"), CellValue::text("Store B")])
            .await
            .unwrap();

        store.update_cell(2, Column::InstallmentsPaid.index(), CellValue::Number(2.0)).await.unwrap();
        store.delete_row(3).await.unwrap();

        let reopened = CsvStore::open(&path).unwrap();
        let rows = reopened.read_all_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(Column::InstallmentsPaid), &CellValue::text("2"));
        assert_eq!(rows[0].get(Column::TotalAmount), &CellValue::text("1000.00"));
        assert_eq!(rows[0].get(Column::Id), &CellValue::text("id-1"));
    }

    #[tokio::test]
    async fn test_reads_legacy_file_without_id_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        std::fs::write(
            &path,
            "Fecha de Compra,Comercio,Descripción,Monto Total,Cantidad de Cuotas,Tarjeta,Cuota Pagada (N°),Observaciones\n\
             05/04/2024,Kiosco,,300.00,3,Macro,0,\n",
        )
        .unwrap();

        let store = CsvStore::open(&path).unwrap();
        let rows = store.read_all_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(Column::Card), &CellValue::text("Macro"));
        assert_eq!(rows[0].get(Column::Id), &CellValue::Empty);
        assert_eq!(store.read_header().await.unwrap().len(), 8);
    }
}
