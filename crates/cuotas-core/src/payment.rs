//! Installment payments for one card

use serde::Serialize;

use crate::model::{Card, LedgerSnapshot, Purchase, PurchaseView};

/// Purchases of the selected card, each with whether it can take a payment
#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    /// `None` only when the ledger is empty
    pub card: Option<Card>,
    /// Every card in order of first appearance
    pub cards: Vec<Card>,
    pub items: Vec<PurchaseView>,
}

impl PaymentView {
    /// Build for `card`, defaulting to the first card in the ledger
    pub fn build(snapshot: &LedgerSnapshot, card: Option<Card>) -> Self {
        let cards = snapshot.cards_in_order();
        let card = card.or_else(|| cards.first().cloned());
        let items = match &card {
            Some(selected) => snapshot
                .purchases
                .iter()
                .filter(|p| &p.card == selected)
                .map(Purchase::view)
                .collect(),
            None => Vec::new(),
        };
        Self { card, cards, items }
    }

    pub fn payable_count(&self) -> usize {
        self.items.iter().filter(|i| !i.fully_paid).count()
    }
}

/// The purchase after one more installment is paid, or `None` if none remain
pub fn next_payment(purchase: &Purchase) -> Option<Purchase> {
    if purchase.is_fully_paid() {
        return None;
    }
    let mut paid = purchase.clone();
    paid.installments_paid += 1;
    Some(paid)
}
