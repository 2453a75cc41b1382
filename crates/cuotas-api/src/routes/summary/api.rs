//! Summary API endpoints - JSON API

use axum::extract::State;
use axum::Json;
use cuotas_core::ChartData;

use crate::{ApiError, AppState};

/// Monthly groups, month totals and both chart datasets (JSON API)
pub async fn api_summary(state: State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let ledger = state.ledger.read().await;
    let summary = ledger.monthly_summary().await?;

    Ok(Json(serde_json::json!({
        "groups": summary.groups,
        "months": summary.months,
        "undated": summary.undated,
        "total_pending_installments": summary.total_pending_installments(),
        "amount_chart": summary.amount_chart(&state.config.charts),
        "installments_chart": summary.installments_chart(&state.config.charts),
    })))
}

/// Chart data as JSON safe to place inside a `<script>` element
pub fn chart_json(chart: &ChartData) -> String {
    serde_json::to_string(chart)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}
