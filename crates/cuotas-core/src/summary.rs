//! Monthly summary and chart data

use cuotas_config::ChartConfig;
use serde::{Deserialize, Serialize};

use crate::calculator::round_cents;
use crate::model::{Card, LedgerSnapshot, YearMonth};

/// Totals of one (month, card) group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryGroup {
    pub month: YearMonth,
    pub card: Card,
    pub total_amount: f64,
    pub installment_count: u64,
    pub installments_paid: u64,
    /// Installments still to pay, a count rather than money
    pub pending_installments: i64,
}

/// Totals of one month across every card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    pub month: YearMonth,
    pub total_amount: f64,
    pub installment_count: u64,
    pub installments_paid: u64,
}

/// Chart data for visualization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub chart_type: String,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    pub options: serde_json::Value,
}

/// Chart dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Option<String>,
    pub border_color: Option<String>,
}

/// Purchases with a valid date grouped by month and card
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    /// Month descending, then card name ascending
    pub groups: Vec<SummaryGroup>,
    /// Month ascending
    pub months: Vec<MonthTotals>,
    /// Purchases left out because their date could not be read
    pub undated: usize,
}

impl MonthlySummary {
    pub fn build(snapshot: &LedgerSnapshot) -> Self {
        let mut groups: Vec<SummaryGroup> = Vec::new();
        let mut undated = 0;

        for purchase in &snapshot.purchases {
            let Some(month) = purchase.month() else {
                undated += 1;
                continue;
            };
            let group = match groups.iter_mut().position(|g| g.month == month && g.card == purchase.card) {
                Some(i) => &mut groups[i],
                None => {
                    groups.push(SummaryGroup {
                        month,
                        card: purchase.card.clone(),
                        total_amount: 0.0,
                        installment_count: 0,
                        installments_paid: 0,
                        pending_installments: 0,
                    });
                    let last = groups.len() - 1;
                    &mut groups[last]
                }
            };
            group.total_amount += purchase.total_amount;
            group.installment_count += purchase.installment_count as u64;
            group.installments_paid += purchase.installments_paid as u64;
        }

        for group in &mut groups {
            group.pending_installments = group.installment_count as i64 - group.installments_paid as i64;
        }
        groups.sort_by(|a, b| b.month.cmp(&a.month).then_with(|| a.card.name().cmp(b.card.name())));

        let mut months: Vec<MonthTotals> = Vec::new();
        for group in &groups {
            match months.iter_mut().find(|m| m.month == group.month) {
                Some(totals) => {
                    totals.total_amount += group.total_amount;
                    totals.installment_count += group.installment_count;
                    totals.installments_paid += group.installments_paid;
                }
                None => months.push(MonthTotals {
                    month: group.month,
                    total_amount: group.total_amount,
                    installment_count: group.installment_count,
                    installments_paid: group.installments_paid,
                }),
            }
        }
        months.sort_by(|a, b| a.month.cmp(&b.month));

        Self { groups, months, undated }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_pending_installments(&self) -> i64 {
        self.groups.iter().map(|g| g.pending_installments).sum()
    }

    fn labels(&self) -> Vec<String> {
        self.months.iter().map(|m| m.month.to_string()).collect()
    }

    fn options(style: &ChartConfig) -> serde_json::Value {
        serde_json::json!({
            "responsive": true,
            "plugins": { "legend": { "display": style.show_legend } },
            "scales": { "y": { "beginAtZero": true } }
        })
    }

    /// Bar chart: total purchase amount per month
    pub fn amount_chart(&self, style: &ChartConfig) -> ChartData {
        ChartData {
            chart_type: "bar".to_string(),
            title: "Monto total por mes".to_string(),
            labels: self.labels(),
            datasets: vec![ChartDataset {
                label: "Monto Total".to_string(),
                data: self.months.iter().map(|m| round_cents(m.total_amount)).collect(),
                background_color: Some(style.bar_color.clone()),
                border_color: Some(style.bar_color.clone()),
            }],
            options: Self::options(style),
        }
    }

    /// Line chart: total and paid installments per month
    pub fn installments_chart(&self, style: &ChartConfig) -> ChartData {
        ChartData {
            chart_type: "line".to_string(),
            title: "Cuotas totales y pagadas por mes".to_string(),
            labels: self.labels(),
            datasets: vec![
                ChartDataset {
                    label: "Cuotas Totales".to_string(),
                    data: self.months.iter().map(|m| m.installment_count as f64).collect(),
                    background_color: Some(style.total_color.clone()),
                    border_color: Some(style.total_color.clone()),
                },
                ChartDataset {
                    label: "Cuotas Pagadas".to_string(),
                    data: self.months.iter().map(|m| m.installments_paid as f64).collect(),
                    background_color: Some(style.paid_color.clone()),
                    border_color: Some(style.paid_color.clone()),
                },
            ],
            options: Self::options(style),
        }
    }
}
