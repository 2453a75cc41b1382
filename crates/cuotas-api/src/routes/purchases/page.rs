//! Purchase pages - HTMX page rendering

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use chrono::Local;
use cuotas_core::{CardFilter, MonthFilter, RecordFilter};
use cuotas_utils::escape_html;
use std::collections::HashMap;

use super::api::render_purchases_table;
use crate::routes::card_options;
use crate::{page_response, AppState, HtmlError};

/// Browse page with card and month filters
pub async fn page_purchases(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, HtmlError> {
    let filter = RecordFilter::from_params(params.get("card").map(String::as_str), params.get("month").map(String::as_str));
    let ledger = state.ledger.read().await;
    let view = ledger.browse(filter).await?;

    let selected_card = match &view.filter.card {
        CardFilter::Only(card) => Some(card.name().to_string()),
        CardFilter::All => None,
    };
    let card_opts: String = view
        .cards
        .iter()
        .map(|c| {
            format!(
                "<option value='{0}'{1}>{0}</option>",
                escape_html(c.name()),
                if selected_card.as_deref() == Some(c.name()) { " selected" } else { "" }
            )
        })
        .collect();

    let selected_month = match view.filter.month {
        MonthFilter::Only(month) => Some(month),
        MonthFilter::All => None,
    };
    let month_opts: String = view
        .months
        .iter()
        .map(|m| format!("<option value='{0}'{1}>{0}</option>", m, if selected_month == Some(*m) { " selected" } else { "" }))
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Compras</h2><p class='text-gray-500'>Consultá las compras en cuotas y el saldo pendiente.</p></div>
        <form id='purchase-filters' class='flex flex-wrap gap-4 mb-6' hx-get='/purchases/list' hx-target='#purchases-list' hx-trigger='change' hx-include='this'>
            <label class='text-sm text-gray-600'>Tarjeta
                <select name='card' class='block mt-1 px-3 py-2 border rounded-lg bg-white'>
                    <option value='all'>Todas</option>{}
                </select>
            </label>
            <label class='text-sm text-gray-600'>Mes de compra
                <select name='month' class='block mt-1 px-3 py-2 border rounded-lg bg-white'>
                    <option value='all'>Todos</option>{}
                </select>
            </label>
        </form>
        <div class='bg-white rounded-xl shadow-sm p-6' id='purchases-list'>{}</div>"#,
        card_opts,
        month_opts,
        render_purchases_table(&state.config, &view)
    );

    Ok(Html(page_response(&headers, "Compras", "/purchases", &inner_content)))
}

/// Entry form for a new purchase with live installment preview
pub async fn page_purchase_new(state: State<AppState>, headers: HeaderMap) -> Html<String> {
    let config = &state.config;
    let today = Local::now().date_naive().format("%Y-%m-%d");
    let input = "mt-1 w-full px-3 py-2 border rounded-lg";

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Registrar compra</h2><p class='text-gray-500'>Cargá una compra en cuotas; el valor de cada cuota se calcula solo.</p></div>
        <div class='bg-white rounded-xl shadow-sm p-6 max-w-2xl'>
            <form id='entry-form' hx-post='/purchases' hx-target='#entry-result' hx-swap='innerHTML' class='grid grid-cols-1 md:grid-cols-2 gap-4'>
                <label class='text-sm text-gray-600'>Fecha de compra<input type='date' name='purchase_date' value='{today}' required class='{input}'></label>
                <label class='text-sm text-gray-600'>Comercio<input type='text' name='merchant' required class='{input}'></label>
                <label class='text-sm text-gray-600 md:col-span-2'>Descripción<input type='text' name='description' class='{input}'></label>
                <label class='text-sm text-gray-600'>Monto total<input type='number' name='total_amount' min='0' step='0.01' value='0' class='{input}'></label>
                <label class='text-sm text-gray-600'>Cantidad de cuotas<input type='number' name='installment_count' min='1' step='1' value='1' class='{input}'></label>
                <label class='text-sm text-gray-600'>Tarjeta<select name='card' class='{input} bg-white'>{cards}</select></label>
                <label class='text-sm text-gray-600'>Cuotas ya pagadas<input type='number' name='installments_paid' min='0' step='1' value='0' class='{input}'></label>
                <label class='text-sm text-gray-600 md:col-span-2'>Observaciones<textarea name='notes' rows='2' class='{input}'></textarea></label>
                <div class='md:col-span-2' id='entry-preview' hx-post='/purchases/preview' hx-trigger='load, input from:#entry-form' hx-include='#entry-form'></div>
                <div class='md:col-span-2'><button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Guardar compra</button></div>
            </form>
            <div id='entry-result' class='mt-4'></div>
        </div>"#,
        today = today,
        input = input,
        cards = card_options(&config.cards.known, None)
    );

    Html(page_response(&headers, "Registrar compra", "/purchases/new", &inner_content))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_browse_page_lists_filter_options() {
        let (status, body) = get(app(seeded_store()), "/purchases?card=Naranja").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<option value='Naranja' selected>"));
        assert!(body.contains("<option value='2024-03'>"));
        assert!(body.contains("<option value='2024-04'>"));
        assert!(body.contains("Store A"));
        assert!(!body.contains("Store B"));
    }

    #[tokio::test]
    async fn test_entry_form_offers_configured_cards() {
        let (status, body) = get(app(seeded_store()), "/purchases/new").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("name='purchase_date'"));
        assert!(body.contains("<option value='Naranja'>"));
        assert!(body.contains("<option value='Macro'>"));
        assert!(body.contains("hx-post='/purchases/preview'"));
    }
}
