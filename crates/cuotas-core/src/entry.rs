//! Entry of new purchases

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calculator;
use crate::codec::format_date;
use crate::error::ValidationIssue;
use crate::model::{Card, Purchase, RecordId};

/// A purchase as typed into the entry form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPurchase {
    pub purchase_date: NaiveDate,
    pub merchant: String,
    #[serde(default)]
    pub description: String,
    pub total_amount: f64,
    pub installment_count: u32,
    pub card: Card,
    #[serde(default)]
    pub installments_paid: u32,
    #[serde(default)]
    pub notes: String,
}

/// Live preview of the derived fields of a draft
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preview {
    pub installment_amount: f64,
    pub remaining_balance: f64,
}

impl NewPurchase {
    /// `None` while the installment count is still zero
    pub fn preview(&self) -> Option<Preview> {
        Some(Preview {
            installment_amount: calculator::installment_amount(self.total_amount, self.installment_count)?,
            remaining_balance: calculator::remaining_balance(
                self.total_amount,
                self.installment_count,
                self.installments_paid,
            )?,
        })
    }

    /// Rules for a new purchase.
    ///
    /// Numeric and date bounds always apply; with `strict` the edit rules
    /// apply too.
    pub fn validate(&self, strict: bool) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        // The sheet stores four-digit years only
        if !(1..=9999).contains(&self.purchase_date.year()) {
            issues.push(ValidationIssue::DateOutOfRange);
        }
        if !self.total_amount.is_finite() || self.total_amount < 0.0 {
            issues.push(ValidationIssue::NegativeAmount);
        }
        if self.installment_count == 0 {
            issues.push(ValidationIssue::ZeroInstallments);
        }
        if strict {
            if self.installments_paid > self.installment_count {
                issues.push(ValidationIssue::PaidExceedsCount);
            }
            if self.merchant.trim().is_empty() {
                issues.push(ValidationIssue::EmptyMerchant);
            }
        }
        issues
    }

    /// Purchase ready to be appended as the next row
    pub fn into_purchase(self, id: RecordId, row_number: usize) -> Purchase {
        Purchase {
            id,
            row_number,
            purchase_date: Some(self.purchase_date),
            date_text: format_date(self.purchase_date),
            merchant: self.merchant.trim().to_string(),
            description: self.description.trim().to_string(),
            total_amount: self.total_amount,
            installment_count: self.installment_count,
            card: self.card,
            installments_paid: self.installments_paid,
            notes: self.notes.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewPurchase {
        NewPurchase {
            purchase_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            merchant: "Store A".to_string(),
            description: String::new(),
            total_amount: 1000.0,
            installment_count: 4,
            card: Card::Naranja,
            installments_paid: 1,
            notes: String::new(),
        }
    }

    #[test]
    fn test_preview() {
        let preview = draft().preview().unwrap();
        assert_eq!(preview.installment_amount, 250.0);
        assert_eq!(preview.remaining_balance, 750.0);

        let zero = NewPurchase { installment_count: 0, ..draft() };
        assert!(zero.preview().is_none());
    }

    #[test]
    fn test_strict_validation_applies_edit_rules() {
        let bad = NewPurchase {
            merchant: "   ".to_string(),
            installments_paid: 5,
            ..draft()
        };
        assert_eq!(
            bad.validate(true),
            vec![ValidationIssue::PaidExceedsCount, ValidationIssue::EmptyMerchant]
        );
        assert!(bad.validate(false).is_empty());
    }

    #[test]
    fn test_numeric_bounds_always_apply() {
        let bad = NewPurchase {
            total_amount: -1.0,
            installment_count: 0,
            installments_paid: 0,
            ..draft()
        };
        let issues = bad.validate(false);
        assert_eq!(issues, vec![ValidationIssue::NegativeAmount, ValidationIssue::ZeroInstallments]);
        assert!(draft().validate(true).is_empty());
    }

    #[test]
    fn test_dates_outside_four_digit_years_are_rejected() {
        for (year, month, day) in [(10000, 1, 1), (275760, 9, 13), (0, 12, 31), (-5, 6, 1)] {
            let bad = NewPurchase {
                purchase_date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
                ..draft()
            };
            assert_eq!(bad.validate(false), vec![ValidationIssue::DateOutOfRange], "year {}", year);
        }
        for year in [1, 9999] {
            let edge = NewPurchase {
                purchase_date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
                ..draft()
            };
            assert!(edge.validate(true).is_empty(), "year {}", year);
        }
    }

    #[test]
    fn test_into_purchase_formats_date() {
        let purchase = draft().into_purchase(RecordId::new("x"), 7);
        assert_eq!(purchase.date_text, "01/03/2024");
        assert_eq!(purchase.row_number, 7);
        assert_eq!(purchase.remaining_balance(), 750.0);
    }
}
