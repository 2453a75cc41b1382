//! Cell values, the purchase column schema and the in-memory grid shared
//! by the local backends.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{StoreError, StoreResult};

/// Sheet row number of the first data row (row 1 holds the headers)
pub const FIRST_DATA_ROW: usize = 2;

/// A single cell as the store hands it back: text, number or nothing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Convert to a JSON value for APIs that take typed cells
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(n.to_string())),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Empty => serde_json::Value::String(String::new()),
        }
    }

    /// Build from a JSON value returned by a remote store
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Empty),
            serde_json::Value::String(s) => CellValue::text(s.clone()),
            serde_json::Value::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            serde_json::Value::Null => CellValue::Empty,
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::text(s)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Empty => Ok(()),
        }
    }
}

/// Columns of the purchase sheet, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    PurchaseDate,
    Merchant,
    Description,
    TotalAmount,
    InstallmentCount,
    Card,
    InstallmentsPaid,
    Notes,
    Id,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::PurchaseDate,
        Column::Merchant,
        Column::Description,
        Column::TotalAmount,
        Column::InstallmentCount,
        Column::Card,
        Column::InstallmentsPaid,
        Column::Notes,
        Column::Id,
    ];

    /// Header text, which is the contract with the sheet
    pub fn header(&self) -> &'static str {
        match self {
            Column::PurchaseDate => "Fecha de Compra",
            Column::Merchant => "Comercio",
            Column::Description => "Descripción",
            Column::TotalAmount => "Monto Total",
            Column::InstallmentCount => "Cantidad de Cuotas",
            Column::Card => "Tarjeta",
            Column::InstallmentsPaid => "Cuota Pagada (N°)",
            Column::Notes => "Observaciones",
            Column::Id => "ID",
        }
    }

    /// 1-based column index
    pub fn index(&self) -> usize {
        Column::ALL.iter().position(|c| c == self).map(|p| p + 1).unwrap_or(0)
    }

    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.header() == header.trim())
    }

    pub fn headers() -> Vec<String> {
        Column::ALL.iter().map(|c| c.header().to_string()).collect()
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// One data row keyed by header, with its 1-based sheet row number
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetRow {
    pub row_number: usize,
    pub cells: HashMap<String, CellValue>,
}

impl SheetRow {
    pub fn get(&self, column: Column) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(column.header()).unwrap_or(&EMPTY)
    }

    /// Build a row from values in column order
    pub fn from_values(row_number: usize, values: &[CellValue]) -> Self {
        let cells = Column::ALL
            .iter()
            .zip(values.iter())
            .map(|(c, v)| (c.header().to_string(), v.clone()))
            .collect();
        Self { row_number, cells }
    }
}

/// A full sheet kept in memory: row 0 is the header row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    cells: Vec<Vec<CellValue>>,
}

impl Grid {
    /// Empty sheet with the standard purchase headers
    pub fn with_standard_header() -> Self {
        Self {
            cells: vec![Column::headers().into_iter().map(CellValue::Text).collect()],
        }
    }

    pub fn from_cells(cells: Vec<Vec<CellValue>>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Vec<CellValue>] {
        &self.cells
    }

    /// Number of sheet rows including the header
    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn header(&self) -> Vec<String> {
        self.cells
            .first()
            .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// Data rows keyed by header text; missing trailing cells read as empty
    pub fn records(&self) -> Vec<SheetRow> {
        let header = self.header();
        self.cells
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, row)| {
                let cells = header
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| !h.is_empty())
                    .map(|(j, h)| (h.clone(), row.get(j).cloned().unwrap_or_default()))
                    .collect();
                SheetRow { row_number: i + 1, cells }
            })
            .collect()
    }

    /// Push a row after the last one; on an empty grid this becomes the header
    pub fn append(&mut self, values: Vec<CellValue>) {
        self.cells.push(values);
    }

    /// Overwrite one cell; rows are 1-based and include the header row
    pub fn set(&mut self, row: usize, column: usize, value: CellValue) -> StoreResult<()> {
        if column == 0 {
            return Err(StoreError::ColumnOutOfRange { column });
        }
        let rows = self.cells.len();
        let target = row
            .checked_sub(1)
            .and_then(|r| self.cells.get_mut(r))
            .ok_or(StoreError::RowOutOfRange { row, rows })?;
        if target.len() < column {
            target.resize(column, CellValue::Empty);
        }
        target[column - 1] = value;
        Ok(())
    }

    /// Remove one data row, shifting later rows up
    pub fn remove_row(&mut self, row: usize) -> StoreResult<()> {
        if row < FIRST_DATA_ROW {
            return Err(StoreError::HeaderRow);
        }
        if row > self.cells.len() {
            return Err(StoreError::RowOutOfRange { row, rows: self.cells.len() });
        }
        self.cells.remove(row - 1);
        Ok(())
    }
}
