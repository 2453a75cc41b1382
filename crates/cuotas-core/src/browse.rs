//! Browsing and filtering purchases

use serde::Serialize;

use crate::model::{Card, DataWarning, LedgerSnapshot, Purchase, PurchaseView, YearMonth};

/// Card filter: everything or one card
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum CardFilter {
    #[default]
    All,
    Only(Card),
}

/// Month filter: everything or one `YYYY-MM` bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MonthFilter {
    #[default]
    All,
    Only(YearMonth),
}

/// Both filters; a purchase must pass each of them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RecordFilter {
    pub card: CardFilter,
    pub month: MonthFilter,
}

impl RecordFilter {
    /// Build from query parameters; empty, "all" and "todas" mean no filter
    pub fn from_params(card: Option<&str>, month: Option<&str>) -> Self {
        let card = match card.map(str::trim) {
            Some(c) if !is_all(c) => CardFilter::Only(Card::from_name(c)),
            _ => CardFilter::All,
        };
        let month = match month.map(str::trim) {
            Some(m) if !is_all(m) => m.parse().map(MonthFilter::Only).unwrap_or_default(),
            _ => MonthFilter::All,
        };
        Self { card, month }
    }

    pub fn matches(&self, purchase: &Purchase) -> bool {
        let card_ok = match &self.card {
            CardFilter::All => true,
            CardFilter::Only(card) => &purchase.card == card,
        };
        // Undated purchases never match a month filter
        let month_ok = match self.month {
            MonthFilter::All => true,
            MonthFilter::Only(month) => purchase.month() == Some(month),
        };
        card_ok && month_ok
    }
}

fn is_all(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("all") || value.eq_ignore_ascii_case("todas")
}

/// Pending balance of one card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardTotal {
    pub card: Card,
    pub pending: f64,
}

/// Filtered purchases with totals and the available filter options
#[derive(Debug, Clone, Serialize)]
pub struct BrowseView {
    pub filter: RecordFilter,
    pub records: Vec<PurchaseView>,
    pub total_pending: f64,
    /// Cards in order of first appearance among the filtered records
    pub pending_by_card: Vec<CardTotal>,
    /// Every card in the ledger, sorted by name
    pub cards: Vec<Card>,
    /// Every month with at least one dated purchase, ascending
    pub months: Vec<YearMonth>,
    pub warnings: Vec<DataWarning>,
}

impl BrowseView {
    pub fn build(snapshot: &LedgerSnapshot, filter: RecordFilter) -> Self {
        let records: Vec<PurchaseView> = snapshot
            .purchases
            .iter()
            .filter(|p| filter.matches(p))
            .map(Purchase::view)
            .collect();

        let total_pending = records.iter().map(|r| r.purchase.remaining_balance()).sum();

        let mut pending_by_card: Vec<CardTotal> = Vec::new();
        for record in &records {
            let balance = record.purchase.remaining_balance();
            match pending_by_card.iter_mut().find(|t| t.card == record.purchase.card) {
                Some(total) => total.pending += balance,
                None => pending_by_card.push(CardTotal {
                    card: record.purchase.card.clone(),
                    pending: balance,
                }),
            }
        }

        let mut cards = snapshot.cards_in_order();
        cards.sort_by(|a, b| a.name().cmp(b.name()));

        let mut months: Vec<YearMonth> = snapshot.purchases.iter().filter_map(Purchase::month).collect();
        months.sort();
        months.dedup();

        Self {
            filter,
            records,
            total_pending,
            pending_by_card,
            cards,
            months,
            warnings: snapshot.warnings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::purchase;

    fn snapshot() -> LedgerSnapshot {
        LedgerSnapshot {
            purchases: vec![
                purchase("Store A", "01/03/2024", 1000.0, 4, Card::Naranja, 1),
                purchase("Store B", "15/04/2024", 600.0, 3, Card::Macro, 1),
                purchase("Store C", "20/03/2024", 300.0, 3, Card::Naranja, 0),
                purchase("Store D", "sin fecha", 100.0, 1, Card::Naranja, 0),
            ],
            warnings: vec![],
        }
    }

    #[test]
    fn test_filter_by_card() {
        let view = BrowseView::build(&snapshot(), RecordFilter::from_params(Some("Macro"), None));
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].purchase.merchant, "Store B");
        assert_eq!(view.total_pending, 400.0);
        assert_eq!(view.pending_by_card, vec![CardTotal { card: Card::Macro, pending: 400.0 }]);
    }

    #[test]
    fn test_no_filter_keeps_undated_records() {
        let view = BrowseView::build(&snapshot(), RecordFilter::default());
        assert_eq!(view.records.len(), 4);
        assert_eq!(view.total_pending, 750.0 + 400.0 + 300.0 + 100.0);
        assert_eq!(view.pending_by_card[0].card, Card::Naranja);
        assert_eq!(view.pending_by_card[0].pending, 1150.0);
        assert_eq!(view.pending_by_card[1].card, Card::Macro);
    }

    #[test]
    fn test_month_filter_excludes_undated_records() {
        let filter = RecordFilter::from_params(Some("todas"), Some("2024-03"));
        let view = BrowseView::build(&snapshot(), filter);
        let merchants: Vec<&str> = view.records.iter().map(|r| r.purchase.merchant.as_str()).collect();
        assert_eq!(merchants, vec!["Store A", "Store C"]);
    }

    #[test]
    fn test_filters_combine() {
        let filter = RecordFilter::from_params(Some("Macro"), Some("2024-03"));
        let view = BrowseView::build(&snapshot(), filter);
        assert!(view.records.is_empty());
        assert_eq!(view.total_pending, 0.0);
        assert!(view.pending_by_card.is_empty());
    }

    #[test]
    fn test_filter_options() {
        let view = BrowseView::build(&snapshot(), RecordFilter::default());
        assert_eq!(view.cards, vec![Card::Macro, Card::Naranja]);
        assert_eq!(view.months, vec![YearMonth::new(2024, 3), YearMonth::new(2024, 4)]);
    }

    #[test]
    fn test_unparseable_month_param_means_all() {
        let filter = RecordFilter::from_params(None, Some("marzo"));
        assert_eq!(filter.month, MonthFilter::All);
        assert_eq!(filter.card, CardFilter::All);
    }
}
