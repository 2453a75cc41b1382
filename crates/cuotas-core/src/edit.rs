//! Editing existing purchases

use serde::{Deserialize, Serialize};

use crate::codec::parse_date;
use crate::error::ValidationIssue;
use crate::model::{Card, Purchase, RecordId};

/// Entry in the edit and delete selectors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionOption {
    pub id: RecordId,
    pub label: String,
}

/// Selector options in current sheet order, numbered from 1
pub fn selection_options(purchases: &[Purchase]) -> Vec<SelectionOption> {
    purchases
        .iter()
        .enumerate()
        .map(|(i, p)| SelectionOption {
            id: p.id.clone(),
            label: p.label(i + 1),
        })
        .collect()
}

/// Every mutable field of a purchase, as submitted by the edit form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEdit {
    pub date_text: String,
    pub merchant: String,
    pub description: String,
    pub total_amount: f64,
    pub card: Card,
    pub installment_count: u32,
    pub installments_paid: u32,
    pub notes: String,
}

impl PurchaseEdit {
    /// Form pre-filled from the stored purchase
    pub fn from_purchase(purchase: &Purchase) -> Self {
        Self {
            date_text: purchase.date_text.clone(),
            merchant: purchase.merchant.clone(),
            description: purchase.description.clone(),
            total_amount: purchase.total_amount,
            card: purchase.card.clone(),
            installment_count: purchase.installment_count,
            installments_paid: purchase.installments_paid,
            notes: purchase.notes.clone(),
        }
    }

    /// All failed rules at once; empty means the edit may be written
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.installments_paid > self.installment_count {
            issues.push(ValidationIssue::PaidExceedsCount);
        }
        if self.merchant.trim().is_empty() {
            issues.push(ValidationIssue::EmptyMerchant);
        }
        if self.date_text.trim().is_empty() {
            issues.push(ValidationIssue::EmptyDate);
        }
        if !self.total_amount.is_finite() || self.total_amount < 0.0 {
            issues.push(ValidationIssue::NegativeAmount);
        }
        if self.installment_count == 0 {
            issues.push(ValidationIssue::ZeroInstallments);
        }
        issues
    }

    /// The purchase as it will read back after the edit is written
    pub fn apply_to(&self, purchase: &Purchase) -> Purchase {
        let date_text = self.date_text.trim().to_string();
        Purchase {
            id: purchase.id.clone(),
            row_number: purchase.row_number,
            purchase_date: parse_date(&date_text),
            date_text,
            merchant: self.merchant.trim().to_string(),
            description: self.description.trim().to_string(),
            total_amount: self.total_amount,
            installment_count: self.installment_count,
            card: self.card.clone(),
            installments_paid: self.installments_paid,
            notes: self.notes.trim().to_string(),
        }
    }
}
