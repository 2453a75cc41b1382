//! Summary page - HTMX page rendering

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use cuotas_utils::escape_html;

use super::api::chart_json;
use crate::{info_box, money, page_response, AppState, HtmlError};

/// Table of month/card groups and the two monthly charts
pub async fn page_summary(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, HtmlError> {
    let ledger = state.ledger.read().await;
    let summary = ledger.monthly_summary().await?;
    let config = &state.config;

    let undated = if summary.undated > 0 {
        format!(
            "<p class='text-sm text-yellow-700 mb-4'>{} compras sin fecha válida no se incluyen en el resumen.</p>",
            summary.undated
        )
    } else {
        String::new()
    };

    let body = if summary.is_empty() {
        info_box("No hay compras con fecha válida para resumir.")
    } else {
        let amount = summary.amount_chart(&config.charts);
        let installments = summary.installments_chart(&config.charts);
        let rows: String = summary
            .groups
            .iter()
            .map(|g| {
                format!(
                    r#"<tr class='border-b'>
                        <td class='px-3 py-2'>{}</td>
                        <td class='px-3 py-2'>{}</td>
                        <td class='px-3 py-2 text-right'>{}</td>
                        <td class='px-3 py-2 text-right'>{}</td>
                        <td class='px-3 py-2 text-right'>{}</td>
                        <td class='px-3 py-2 text-right font-medium'>{}</td>
                    </tr>"#,
                    g.month,
                    escape_html(g.card.name()),
                    money(config, g.total_amount),
                    g.installment_count,
                    g.installments_paid,
                    g.pending_installments
                )
            })
            .collect();

        format!(
            r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6 overflow-x-auto'>
                <table class='min-w-full text-sm'>
                    <thead class='bg-gray-100 text-gray-600'>
                        <tr>
                            <th class='px-3 py-2 text-left'>Mes</th>
                            <th class='px-3 py-2 text-left'>Tarjeta</th>
                            <th class='px-3 py-2 text-right'>Monto Total</th>
                            <th class='px-3 py-2 text-right'>Cuotas Totales</th>
                            <th class='px-3 py-2 text-right'>Cuotas Pagadas</th>
                            <th class='px-3 py-2 text-right'>Cuotas Pendientes</th>
                        </tr>
                    </thead>
                    <tbody>{rows}</tbody>
                </table>
                <p class='mt-4 text-sm text-gray-600'>Cuotas pendientes en total: <span class='font-semibold'>{pending}</span></p>
            </div>
            <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
                <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>{amount_title}</h3><canvas id='amount-chart'></canvas></div>
                <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>{installments_title}</h3><canvas id='installments-chart'></canvas></div>
            </div>
            <script>
            (function() {{
                const render = (id, chart) => new Chart(document.getElementById(id), {{
                    type: chart.chart_type,
                    data: {{
                        labels: chart.labels,
                        datasets: chart.datasets.map(d => ({{ label: d.label, data: d.data, backgroundColor: d.background_color, borderColor: d.border_color }}))
                    }},
                    options: chart.options
                }});
                render('amount-chart', {amount});
                render('installments-chart', {installments});
            }})();
            </script>"#,
            rows = rows,
            pending = summary.total_pending_installments(),
            amount_title = escape_html(&amount.title),
            installments_title = escape_html(&installments.title),
            amount = chart_json(&amount),
            installments = chart_json(&installments)
        )
    };

    let inner_content = format!(
        "<div class='mb-6'><h2 class='text-2xl font-bold'>Resumen mensual</h2><p class='text-gray-500'>Compras agrupadas por mes de compra y tarjeta.</p></div>{}{}",
        undated, body
    );
    Ok(Html(page_response(&headers, "Resumen mensual", "/summary", &inner_content)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use cuotas_sheet::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_summary_page_renders_table_and_charts() {
        let (status, body) = get(app(seeded_store()), "/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("2024-04"));
        assert!(body.contains("$1,300.00"));
        assert!(body.contains("id='amount-chart'"));
        assert!(body.contains("\"chart_type\":\"line\""));
    }

    #[tokio::test]
    async fn test_summary_page_on_empty_ledger() {
        let (status, body) = get(app(Arc::new(MemoryStore::new())), "/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No hay compras con fecha válida"));
        assert!(!body.contains("<canvas"));
    }
}
