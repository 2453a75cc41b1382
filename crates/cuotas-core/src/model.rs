//! Purchase record model

use chrono::{Datelike, NaiveDate};
use cuotas_sheet::Column;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::calculator;

/// Card a purchase was charged to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Card {
    Naranja,
    Macro,
    /// Any other card name found in the sheet or configured by the user
    Other(String),
}

impl Card {
    pub fn name(&self) -> &str {
        match self {
            Card::Naranja => "Naranja",
            Card::Macro => "Macro",
            Card::Other(name) => name,
        }
    }

    /// Read a card name as stored, keeping unknown names verbatim
    pub fn from_name(name: &str) -> Self {
        let trimmed = name.trim();
        if trimmed.eq_ignore_ascii_case("naranja") {
            Card::Naranja
        } else if trimmed.eq_ignore_ascii_case("macro") {
            Card::Macro
        } else {
            Card::Other(trimmed.to_string())
        }
    }
}

impl FromStr for Card {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("card name cannot be empty".to_string());
        }
        Ok(Card::from_name(s))
    }
}

impl From<String> for Card {
    fn from(name: String) -> Self {
        Card::from_name(&name)
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.name().to_string()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Stable identifier of a purchase row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier for a new row
    pub fn generate() -> Self {
        Self(cuotas_utils::generate_id())
    }

    /// Identifier for a row that has no ID cell yet
    pub fn positional(row_number: usize) -> Self {
        Self(format!("row-{}", row_number))
    }

    pub fn is_positional(&self) -> bool {
        self.0.starts_with("row-")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calendar month bucket, formatted `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        let year: i32 = year.parse().map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month.parse().map_err(|_| format!("invalid month in '{}'", s))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in '{}'", s));
        }
        Ok(Self::new(year, month))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One purchase as read from the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: RecordId,
    /// Sheet row the purchase was read from; only valid until the next write
    pub row_number: usize,
    pub purchase_date: Option<NaiveDate>,
    /// Date cell text as stored
    pub date_text: String,
    pub merchant: String,
    pub description: String,
    pub total_amount: f64,
    pub installment_count: u32,
    pub card: Card,
    pub installments_paid: u32,
    pub notes: String,
}

impl Purchase {
    pub fn installment_amount(&self) -> f64 {
        calculator::installment_amount(self.total_amount, self.installment_count).unwrap_or(self.total_amount)
    }

    pub fn remaining_balance(&self) -> f64 {
        calculator::remaining_balance(self.total_amount, self.installment_count, self.installments_paid)
            .unwrap_or(self.total_amount)
    }

    pub fn is_fully_paid(&self) -> bool {
        self.installments_paid >= self.installment_count
    }

    pub fn month(&self) -> Option<YearMonth> {
        self.purchase_date.map(YearMonth::of)
    }

    /// Date for display: the parsed date when available, the raw text otherwise
    pub fn display_date(&self) -> String {
        self.purchase_date
            .map(crate::codec::format_date)
            .unwrap_or_else(|| self.date_text.clone())
    }

    /// Selector label, `"{n}. {date} - {merchant} (${amount})"`
    pub fn label(&self, position: usize) -> String {
        format!(
            "{}. {} - {} (${:.2})",
            position,
            self.display_date(),
            self.merchant,
            self.total_amount
        )
    }

    /// Copy with derived fields attached, for rendering and JSON
    pub fn view(&self) -> PurchaseView {
        PurchaseView {
            purchase: self.clone(),
            installment_amount: calculator::round_cents(self.installment_amount()),
            remaining_balance: calculator::round_cents(self.remaining_balance()),
            fully_paid: self.is_fully_paid(),
        }
    }
}

/// A purchase plus its derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseView {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub installment_amount: f64,
    pub remaining_balance: f64,
    pub fully_paid: bool,
}

/// A stored value that could not be read and was replaced by a fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataWarning {
    pub row_number: usize,
    pub column: Column,
    pub raw: String,
    pub fallback: String,
}

impl std::fmt::Display for DataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fila {}, columna '{}': no se pudo leer '{}', se usó {}",
            self.row_number,
            self.column.header(),
            self.raw,
            self.fallback
        )
    }
}

/// Every purchase in sheet order plus the fallbacks taken while reading
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerSnapshot {
    pub purchases: Vec<Purchase>,
    pub warnings: Vec<DataWarning>,
}

impl LedgerSnapshot {
    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
    }

    pub fn find(&self, id: &RecordId) -> Option<&Purchase> {
        self.purchases.iter().find(|p| &p.id == id)
    }

    /// Distinct cards in order of first appearance
    pub fn cards_in_order(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = Vec::new();
        for purchase in &self.purchases {
            if !cards.contains(&purchase.card) {
                cards.push(purchase.card.clone());
            }
        }
        cards
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn purchase(merchant: &str, date: &str, total: f64, count: u32, card: Card, paid: u32) -> Purchase {
        Purchase {
            id: RecordId::new(format!("id-{}", merchant.to_lowercase().replace(' ', "-"))),
            row_number: 2,
            purchase_date: crate::codec::parse_date(date),
            date_text: date.to_string(),
            merchant: merchant.to_string(),
            description: String::new(),
            total_amount: total,
            installment_count: count,
            card,
            installments_paid: paid,
            notes: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::purchase;
    use super::*;

    #[test]
    fn test_store_a_scenario() {
        let p = purchase("Store A", "01/03/2024", 1000.0, 4, Card::Naranja, 1);
        assert_eq!(p.installment_amount(), 250.0);
        assert_eq!(p.remaining_balance(), 750.0);
        assert!(!p.is_fully_paid());
        assert_eq!(p.month(), Some(YearMonth::new(2024, 3)));
    }

    #[test]
    fn test_remaining_balance_edges() {
        let unpaid = purchase("A", "01/01/2024", 900.0, 3, Card::Macro, 0);
        assert_eq!(unpaid.remaining_balance(), 900.0);
        let paid = purchase("B", "01/01/2024", 100.0, 3, Card::Macro, 3);
        assert!(paid.remaining_balance().abs() < 1e-9);
        assert!(paid.is_fully_paid());
        assert_eq!(paid.view().remaining_balance, 0.0);
    }

    #[test]
    fn test_card_names() {
        assert_eq!("naranja".parse::<Card>().unwrap(), Card::Naranja);
        assert_eq!(" Macro ".parse::<Card>().unwrap(), Card::Macro);
        assert_eq!("Visa".parse::<Card>().unwrap(), Card::Other("Visa".to_string()));
        assert!("  ".parse::<Card>().is_err());
        assert_eq!(serde_json::to_string(&Card::Naranja).unwrap(), "\"Naranja\"");
    }

    #[test]
    fn test_year_month_parse_and_order() {
        let march: YearMonth = "2024-03".parse().unwrap();
        assert_eq!(march.to_string(), "2024-03");
        assert!(YearMonth::new(2023, 12) < march);
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_label_format() {
        let p = purchase("Store A", "01/03/2024", 1000.0, 4, Card::Naranja, 1);
        assert_eq!(p.label(1), "1. 01/03/2024 - Store A ($1000.00)");

        let mut undated = p.clone();
        undated.purchase_date = None;
        undated.date_text = "pronto".to_string();
        assert_eq!(undated.label(3), "3. pronto - Store A ($1000.00)");
    }

    #[test]
    fn test_positional_ids() {
        let id = RecordId::positional(5);
        assert_eq!(id.as_str(), "row-5");
        assert!(id.is_positional());
        assert!(!RecordId::generate().is_positional());
    }

    #[test]
    fn test_view_serializes_flat() {
        let p = purchase("Store A", "01/03/2024", 1000.0, 4, Card::Naranja, 1);
        let json = serde_json::to_value(p.view()).unwrap();
        assert_eq!(json["merchant"], "Store A");
        assert_eq!(json["installment_amount"], 250.0);
        assert_eq!(json["remaining_balance"], 750.0);
        assert_eq!(json["card"], "Naranja");
    }
}
