//! Payment page - HTMX page rendering

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use cuotas_utils::escape_html;
use std::collections::HashMap;

use super::api::{card_param, render_payment_list};
use crate::{page_response, AppState, HtmlError};

/// Card selector and the payment list for the selected card
pub async fn page_payments(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, HtmlError> {
    let ledger = state.ledger.read().await;
    let view = ledger.payments(card_param(&params)).await?;

    let options: String = view
        .cards
        .iter()
        .map(|c| {
            format!(
                "<option value='{0}'{1}>{0}</option>",
                escape_html(c.name()),
                if view.card.as_ref() == Some(c) { " selected" } else { "" }
            )
        })
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Pagar cuotas</h2><p class='text-gray-500'>Elegí una tarjeta y marcá la próxima cuota de cada compra como pagada.</p></div>
        <div class='mb-6'>
            <label class='text-sm text-gray-600'>Tarjeta
                <select name='card' class='block mt-1 px-3 py-2 border rounded-lg bg-white' hx-get='/payments/list' hx-target='#payments-list' hx-trigger='change'>{}</select>
            </label>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6' id='payments-list'>{}</div>"#,
        options,
        render_payment_list(&state.config, &view)
    );

    Ok(Html(page_response(&headers, "Pagar cuotas", "/payments", &inner_content)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_page_selects_requested_card() {
        let (status, body) = get(app(seeded_store()), "/payments?card=macro").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<option value='Macro' selected>"));
        assert!(body.contains("Store B"));
        assert!(!body.contains("Store A"));
    }
}
