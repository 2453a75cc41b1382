//! Conversion between sheet rows and purchases
//!
//! Reading never fails: a value that cannot be understood is replaced by a
//! fallback and reported as a `DataWarning`.

use chrono::{Duration, NaiveDate};
use cuotas_sheet::{CellValue, Column, SheetRow};

use crate::model::{Card, DataWarning, Purchase, RecordId};

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Format a date the way the sheet stores it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `dd/mm/yyyy` date; single-digit day and month are accepted
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let mut parts = text.split('/');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year_text = parts.next()?.trim();
    if parts.next().is_some() || year_text.len() != 4 {
        return None;
    }
    let year: i32 = year_text.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Spreadsheet serial day number (days since 1899-12-30) to a date
fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Parse a money amount: plain numbers, or text such as `"$1,234.50"`
pub fn parse_amount(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(text) => {
            let cleaned = text.trim();
            let cleaned = cleaned.strip_prefix('$').unwrap_or(cleaned).trim().replace(',', "");
            cleaned.parse::<f64>().ok()?
        }
        CellValue::Empty => return None,
    };
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Parse a non-negative whole number; `"3.0"` and `3.7` truncate to 3
pub fn parse_count(cell: &CellValue) -> Option<u32> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(text) => text.trim().parse::<f64>().ok()?,
        CellValue::Empty => return None,
    };
    if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 {
        Some(value.trunc() as u32)
    } else {
        None
    }
}

/// Amount as stored: two-decimal text
pub fn format_amount_cell(amount: f64) -> CellValue {
    CellValue::Text(format!("{:.2}", amount))
}

/// Card shown for rows whose card cell is blank
pub const UNASSIGNED_CARD: &str = "Sin tarjeta";

/// Decode one sheet row, collecting a warning for every fallback taken
pub fn decode_row(row: &SheetRow, warnings: &mut Vec<DataWarning>) -> Purchase {
    let mut warn = |column: Column, raw: &CellValue, fallback: &str| {
        let warning = DataWarning {
            row_number: row.row_number,
            column,
            raw: raw.to_string(),
            fallback: fallback.to_string(),
        };
        log::warn!("{}", warning);
        warnings.push(warning);
    };

    let date_cell = row.get(Column::PurchaseDate);
    let (purchase_date, date_text) = match date_cell {
        CellValue::Number(serial) => {
            let date = date_from_serial(*serial);
            (date, date.map(format_date).unwrap_or_else(|| date_cell.to_string()))
        }
        other => {
            let text = other.to_string().trim().to_string();
            (parse_date(&text), text)
        }
    };
    if purchase_date.is_none() && !date_text.is_empty() {
        warn(Column::PurchaseDate, date_cell, "sin fecha");
    }

    let amount_cell = row.get(Column::TotalAmount);
    let total_amount = parse_amount(amount_cell).unwrap_or_else(|| {
        warn(Column::TotalAmount, amount_cell, "0");
        0.0
    });

    let count_cell = row.get(Column::InstallmentCount);
    let installment_count = match parse_count(count_cell) {
        Some(n) if n >= 1 => n,
        _ => {
            warn(Column::InstallmentCount, count_cell, "1");
            1
        }
    };

    let paid_cell = row.get(Column::InstallmentsPaid);
    let installments_paid = parse_count(paid_cell).unwrap_or_else(|| {
        warn(Column::InstallmentsPaid, paid_cell, "0");
        0
    });

    let card_cell = row.get(Column::Card);
    let card = if card_cell.is_empty() {
        warn(Column::Card, card_cell, UNASSIGNED_CARD);
        Card::Other(UNASSIGNED_CARD.to_string())
    } else {
        Card::from_name(&card_cell.to_string())
    };

    let id_cell = row.get(Column::Id);
    let id = if id_cell.is_empty() {
        RecordId::positional(row.row_number)
    } else {
        RecordId::new(id_cell.to_string().trim())
    };

    Purchase {
        id,
        row_number: row.row_number,
        purchase_date,
        date_text,
        merchant: row.get(Column::Merchant).to_string(),
        description: row.get(Column::Description).to_string(),
        total_amount,
        installment_count,
        card,
        installments_paid,
        notes: row.get(Column::Notes).to_string(),
    }
}

/// Decode every row in sheet order
pub fn decode_rows(rows: &[SheetRow]) -> (Vec<Purchase>, Vec<DataWarning>) {
    let mut warnings = Vec::new();
    let purchases = rows.iter().map(|row| decode_row(row, &mut warnings)).collect();
    (purchases, warnings)
}

/// Value of one column of a purchase, as it is written to the sheet
pub fn encode_field(purchase: &Purchase, column: Column) -> CellValue {
    match column {
        Column::PurchaseDate => match purchase.purchase_date {
            Some(date) if purchase.date_text.is_empty() => CellValue::text(format_date(date)),
            _ => CellValue::text(purchase.date_text.clone()),
        },
        Column::Merchant => CellValue::text(purchase.merchant.clone()),
        Column::Description => CellValue::text(purchase.description.clone()),
        Column::TotalAmount => format_amount_cell(purchase.total_amount),
        Column::InstallmentCount => CellValue::from(purchase.installment_count),
        Column::Card => CellValue::text(purchase.card.name()),
        Column::InstallmentsPaid => CellValue::from(purchase.installments_paid),
        Column::Notes => CellValue::text(purchase.notes.clone()),
        Column::Id => CellValue::text(purchase.id.as_str()),
    }
}

/// Full row in column order
pub fn encode_purchase(purchase: &Purchase) -> Vec<CellValue> {
    Column::ALL.iter().map(|c| encode_field(purchase, *c)).collect()
}
