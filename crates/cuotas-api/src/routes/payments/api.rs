//! Payment endpoints - HTMX fragments and actions

use axum::extract::{Path, Query, State};
use axum::response::Html;
use cuotas_config::Config;
use cuotas_core::{Card, PaymentView, RecordId};
use cuotas_utils::escape_html;
use std::collections::HashMap;

use crate::routes::id_segment;
use crate::{info_box, money, success_banner, AppState, HtmlError};

/// Card named in the query, if any
pub(crate) fn card_param(params: &HashMap<String, String>) -> Option<Card> {
    params
        .get("card")
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(Card::from_name)
}

/// Purchases of the selected card with a pay button each
pub fn render_payment_list(config: &Config, view: &PaymentView) -> String {
    let card = match &view.card {
        Some(card) => card,
        None => return info_box("Todavía no hay compras registradas."),
    };
    if view.items.is_empty() {
        return info_box(&format!("No hay compras con la tarjeta {}.", card.name()));
    }

    let rows: String = view
        .items
        .iter()
        .map(|item| {
            let p = &item.purchase;
            let action = if item.fully_paid {
                "<span class='px-3 py-1 text-sm text-green-700 bg-green-50 rounded-lg'>Pagada</span>".to_string()
            } else {
                format!(
                    "<button class='px-3 py-1 text-sm bg-indigo-600 text-white rounded-lg hover:bg-indigo-700' hx-post='/payments/{}' hx-target='#payments-list'>Pagar cuota {}</button>",
                    id_segment(&p.id),
                    p.installments_paid + 1
                )
            };
            format!(
                r#"<tr class='border-b'>
                    <td class='px-3 py-2 whitespace-nowrap'>{}</td>
                    <td class='px-3 py-2 font-medium'>{}</td>
                    <td class='px-3 py-2 text-center'>{}/{}</td>
                    <td class='px-3 py-2 text-right'>{}</td>
                    <td class='px-3 py-2 text-right'>{}</td>
                    <td class='px-3 py-2 text-right'>{}</td>
                </tr>"#,
                escape_html(&p.display_date()),
                escape_html(&p.merchant),
                p.installments_paid,
                p.installment_count,
                money(config, item.installment_amount),
                money(config, item.remaining_balance),
                action
            )
        })
        .collect();

    format!(
        r#"<p class='text-sm text-gray-500 mb-3'>{} compras con cuotas pendientes en {}</p>
        <table class='min-w-full text-sm'>
            <thead class='bg-gray-100 text-gray-600'>
                <tr>
                    <th class='px-3 py-2 text-left'>Fecha</th>
                    <th class='px-3 py-2 text-left'>Comercio</th>
                    <th class='px-3 py-2 text-center'>Cuotas pagadas</th>
                    <th class='px-3 py-2 text-right'>Valor Cuota</th>
                    <th class='px-3 py-2 text-right'>Saldo Restante</th>
                    <th class='px-3 py-2'></th>
                </tr>
            </thead>
            <tbody>{}</tbody>
        </table>"#,
        view.payable_count(),
        escape_html(card.name()),
        rows
    )
}

/// Payment list for one card (HTML fragment)
pub async fn htmx_payments_list(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, HtmlError> {
    let ledger = state.ledger.read().await;
    let view = ledger.payments(card_param(&params)).await?;
    Ok(Html(render_payment_list(&state.config, &view)))
}

/// Mark the next installment of a purchase as paid (HTMX)
pub async fn htmx_payment_store(state: State<AppState>, Path(id): Path<String>) -> Result<Html<String>, HtmlError> {
    let id = RecordId::new(id);
    let ledger = state.ledger.write().await;
    let paid = ledger.pay_installment(&id).await?;
    let view = ledger.payments(Some(paid.card.clone())).await?;

    let notice = success_banner(
        "Cuota pagada",
        &format!(
            "{}: {}/{} cuotas pagadas. Saldo restante: {}.",
            escape_html(&paid.merchant),
            paid.installments_paid,
            paid.installment_count,
            money(&state.config, paid.remaining_balance())
        ),
    );
    Ok(Html(format!(
        "<div class='mb-4'>{}</div>{}",
        notice,
        render_payment_list(&state.config, &view)
    )))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use cuotas_sheet::{CellValue, MemoryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_defaults_to_first_card() {
        let (status, body) = get(app(seeded_store()), "/payments/list").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Store A"));
        assert!(body.contains("Store C"));
        assert!(!body.contains("Store B"));
        assert!(body.contains("hx-post='/payments/a'"));
        assert!(!body.contains("hx-post='/payments/c'"));
    }

    #[tokio::test]
    async fn test_list_on_empty_ledger() {
        let (status, body) = get(app(Arc::new(MemoryStore::new())), "/payments/list").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Todavía no hay compras"));
    }

    #[tokio::test]
    async fn test_payment_writes_single_cell() {
        let store = seeded_store();
        let before = store.snapshot();

        let (status, body) = post_form(app(store.clone()), "/payments/a", "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Cuota pagada"));
        assert!(body.contains("2/4"));

        let after = store.snapshot();
        assert_eq!(after[1][6], CellValue::Number(2.0));
        for (row, (a, b)) in before.iter().zip(after.iter()).enumerate() {
            for (column, (x, y)) in a.iter().zip(b.iter()).enumerate() {
                if (row, column) != (1, 6) {
                    assert_eq!(x, y);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_payment_on_paid_off_purchase_conflicts() {
        let store = seeded_store();
        let before = store.snapshot();
        let (status, body) = post_form(app(store.clone()), "/payments/c", "").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("ALREADY_PAID"));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_payment_on_unknown_record() {
        let (status, body) = post_form(app(seeded_store()), "/payments/zzz", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("RECORD_NOT_FOUND"));
    }
}
