//! Installment arithmetic shared by every flow

/// Amount of one installment.
///
/// `installment_count` is at least 1 for every decoded purchase; a zero
/// count yields `None` so drafts can be previewed before they are valid.
pub fn installment_amount(total_amount: f64, installment_count: u32) -> Option<f64> {
    if installment_count == 0 {
        return None;
    }
    Some(total_amount / installment_count as f64)
}

/// Amount still owed after `installments_paid` installments
pub fn remaining_balance(total_amount: f64, installment_count: u32, installments_paid: u32) -> Option<f64> {
    installment_amount(total_amount, installment_count).map(|each| total_amount - each * installments_paid as f64)
}

/// Round to two fraction digits, as shown to the user and stored
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
