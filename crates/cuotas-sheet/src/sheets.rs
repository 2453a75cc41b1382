//! Google Sheets ledger store (Sheets API v4)
//!
//! Endpoints used:
//! - `GET  values/{range}`            read the whole tab
//! - `POST values/{range}:append`     append one row
//! - `PUT  values/{range}`            overwrite one cell
//! - `POST :batchUpdate`              `deleteDimension` for one row

use async_trait::async_trait;
use cuotas_config::SheetsConfig;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{StoreError, StoreResult};
use crate::types::{CellValue, Column, Grid, SheetRow, FIRST_DATA_ROW};
use crate::LedgerStore;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Ledger store backed by one tab of a Google spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsStore {
    http_client: Client,
    api_base: String,
    spreadsheet_id: String,
    sheet_name: String,
    sheet_id: i64,
    token: String,
}

impl SheetsStore {
    pub fn new(config: &SheetsConfig) -> StoreResult<Self> {
        let token = config.resolve_token().ok_or(StoreError::MissingToken)?;
        Ok(Self {
            http_client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            sheet_id: config.sheet_id,
            token,
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base,
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    async fn fetch_grid(&self) -> StoreResult<Grid> {
        let url = format!("{}?valueRenderOption=UNFORMATTED_VALUE", self.values_url(&table_range(&self.sheet_name)));
        let response = self.http_client.get(&url).bearer_auth(&self.token).send().await?;
        let response = check_status(response).await?;
        let body: ValueRange = response.json().await.map_err(|e| StoreError::InvalidResponse {
            message: e.to_string(),
        })?;
        Ok(grid_from_values(&body.values))
    }
}

/// Quote a tab name for A1 notation
pub fn quoted_sheet(sheet_name: &str) -> String {
    format!("'{}'", sheet_name.replace('\'', "''"))
}

/// 1-based column index to letters: 1 -> A, 27 -> AA
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Every purchase column of a tab, `A1` through the last column
pub fn table_range(sheet_name: &str) -> String {
    format!("{}!A1:{}", quoted_sheet(sheet_name), column_letter(Column::ALL.len()))
}

/// A1 reference of a single cell on a tab
pub fn cell_range(sheet_name: &str, row: usize, column: usize) -> String {
    format!("{}!{}{}", quoted_sheet(sheet_name), column_letter(column), row)
}

pub fn grid_from_values(values: &[Vec<serde_json::Value>]) -> Grid {
    Grid::from_cells(
        values
            .iter()
            .map(|row| row.iter().map(CellValue::from_json).collect())
            .collect(),
    )
}

async fn check_status(response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Http {
        status: Some(status.as_u16()),
        message,
    })
}

#[async_trait]
impl LedgerStore for SheetsStore {
    async fn read_all_rows(&self) -> StoreResult<Vec<SheetRow>> {
        let grid = self.fetch_grid().await?;
        debug!("Fetched {} rows from sheet '{}'", grid.row_count().saturating_sub(1), self.sheet_name);
        Ok(grid.records())
    }

    async fn read_header(&self) -> StoreResult<Vec<String>> {
        Ok(self.fetch_grid().await?.header())
    }

    async fn append_row(&self, values: Vec<CellValue>) -> StoreResult<()> {
        let url = format!(
            "{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            self.values_url(&quoted_sheet(&self.sheet_name))
        );
        let body = serde_json::json!({
            "values": [values.iter().map(CellValue::to_json).collect::<Vec<_>>()]
        });
        let response = self.http_client.post(&url).bearer_auth(&self.token).json(&body).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn update_cell(&self, row: usize, column: usize, value: CellValue) -> StoreResult<()> {
        if row == 0 {
            return Err(StoreError::RowOutOfRange { row, rows: 0 });
        }
        if column == 0 {
            return Err(StoreError::ColumnOutOfRange { column });
        }
        let url = format!(
            "{}?valueInputOption=RAW",
            self.values_url(&cell_range(&self.sheet_name, row, column))
        );
        let body = serde_json::json!({ "values": [[value.to_json()]] });
        let response = self.http_client.put(&url).bearer_auth(&self.token).json(&body).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn delete_row(&self, row: usize) -> StoreResult<()> {
        if row < FIRST_DATA_ROW {
            return Err(StoreError::HeaderRow);
        }
        let url = format!("{}/v4/spreadsheets/{}:batchUpdate", self.api_base, self.spreadsheet_id);
        let body = serde_json::json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": self.sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row - 1,
                        "endIndex": row,
                    }
                }
            }]
        });
        let response = self.http_client.post(&url).bearer_auth(&self.token).json(&body).send().await?;
        check_status(response).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sheets:{}/{}", self.spreadsheet_id, self.sheet_name)
    }
}
