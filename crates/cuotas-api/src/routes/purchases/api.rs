//! Purchase endpoints - JSON API and HTMX fragments
//!
//! Endpoints:
//! - api_purchases: Filtered purchases with totals (JSON)
//! - htmx_purchases_list: Filtered purchase table (HTML fragment)
//! - htmx_purchase_preview: Installment preview for the entry form (HTML fragment)
//! - htmx_purchase_store: Append a new purchase (HTMX)

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use cuotas_config::Config;
use cuotas_core::{BrowseView, Card, NewPurchase, RecordFilter};
use cuotas_utils::escape_html;
use std::collections::HashMap;

use crate::form::FormData;
use crate::routes::is_known_card;
use crate::{money, success_banner, warnings_notice, ApiError, AppState, HtmlError};

fn filter_from_query(params: &HashMap<String, String>) -> RecordFilter {
    RecordFilter::from_params(params.get("card").map(String::as_str), params.get("month").map(String::as_str))
}

/// Filtered purchases with totals (JSON API)
pub async fn api_purchases(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<BrowseView>, ApiError> {
    let ledger = state.ledger.read().await;
    Ok(Json(ledger.browse(filter_from_query(&params)).await?))
}

/// Filtered purchase table (HTML fragment)
pub async fn htmx_purchases_list(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, HtmlError> {
    let ledger = state.ledger.read().await;
    let view = ledger.browse(filter_from_query(&params)).await?;
    Ok(Html(render_purchases_table(&state.config, &view)))
}

/// Table of purchases with derived columns and pending totals
pub fn render_purchases_table(config: &Config, view: &BrowseView) -> String {
    if view.records.is_empty() {
        return "<p class='text-gray-500 text-center py-6'>No hay compras para los filtros seleccionados.</p>".to_string();
    }

    let rows: String = view
        .records
        .iter()
        .map(|r| {
            let p = &r.purchase;
            format!(
                r#"<tr class='border-b hover:bg-gray-50'>
                    <td class='px-3 py-2 whitespace-nowrap'>{}</td>
                    <td class='px-3 py-2 font-medium'>{}</td>
                    <td class='px-3 py-2 text-gray-500'>{}</td>
                    <td class='px-3 py-2'>{}</td>
                    <td class='px-3 py-2 text-right'>{}</td>
                    <td class='px-3 py-2 text-center'>{}/{}</td>
                    <td class='px-3 py-2 text-right'>{}</td>
                    <td class='px-3 py-2 text-right font-medium {}'>{}</td>
                    <td class='px-3 py-2 text-gray-500'>{}</td>
                </tr>"#,
                escape_html(&p.display_date()),
                escape_html(&p.merchant),
                escape_html(&p.description),
                escape_html(p.card.name()),
                money(config, p.total_amount),
                p.installments_paid,
                p.installment_count,
                money(config, r.installment_amount),
                if r.fully_paid { "text-green-600" } else { "text-indigo-700" },
                money(config, r.remaining_balance),
                escape_html(&p.notes)
            )
        })
        .collect();

    let per_card: String = view
        .pending_by_card
        .iter()
        .map(|t| {
            format!(
                "<div class='bg-gray-50 p-3 rounded-lg border'><p class='text-xs text-gray-500'>{}</p><p class='text-lg font-semibold'>{}</p></div>",
                escape_html(t.card.name()),
                money(config, t.pending)
            )
        })
        .collect();

    format!(
        r#"{}
        <div class='overflow-x-auto'>
            <table class='min-w-full text-sm'>
                <thead class='bg-gray-100 text-gray-600'>
                    <tr>
                        <th class='px-3 py-2 text-left'>Fecha</th>
                        <th class='px-3 py-2 text-left'>Comercio</th>
                        <th class='px-3 py-2 text-left'>Descripción</th>
                        <th class='px-3 py-2 text-left'>Tarjeta</th>
                        <th class='px-3 py-2 text-right'>Monto Total</th>
                        <th class='px-3 py-2 text-center'>Cuotas pagadas</th>
                        <th class='px-3 py-2 text-right'>Valor Cuota</th>
                        <th class='px-3 py-2 text-right'>Saldo Restante</th>
                        <th class='px-3 py-2 text-left'>Observaciones</th>
                    </tr>
                </thead>
                <tbody>{}</tbody>
            </table>
        </div>
        <div class='mt-6'>
            <p class='text-sm text-gray-500'>Total pendiente</p>
            <p class='text-2xl font-bold text-indigo-700' id='total-pending'>{}</p>
        </div>
        <div class='grid grid-cols-2 md:grid-cols-4 gap-3 mt-4'>{}</div>"#,
        warnings_notice(config, &view.warnings),
        rows,
        money(config, view.total_pending),
        per_card
    )
}

/// Build a draft from the entry form.
///
/// With `lenient`, missing or unreadable values become defaults so the
/// preview can render while the user is still typing.
pub fn draft_from_form(config: &Config, form: &FormData, lenient: bool) -> Result<NewPurchase, ApiError> {
    let purchase_date = match form.date("purchase_date") {
        Some(date) => date,
        None if lenient => chrono::Local::now().date_naive(),
        None => return Err(ApiError::bad_request("La fecha de compra no es válida.")),
    };
    let total_amount = match form.number("total_amount") {
        Some(amount) => amount,
        None if lenient => 0.0,
        None => return Err(ApiError::bad_request("El monto total debe ser un número.")),
    };
    let installment_count = match form.count("installment_count") {
        Some(count) => count,
        None if lenient => 0,
        None => return Err(ApiError::bad_request("La cantidad de cuotas debe ser un número entero.")),
    };
    let installments_paid = match form.get("installments_paid").map(str::trim) {
        None | Some("") => 0,
        Some(_) => match form.count("installments_paid") {
            Some(paid) => paid,
            None if lenient => 0,
            None => return Err(ApiError::bad_request("Las cuotas pagadas deben ser un número entero.")),
        },
    };
    let card_name = form.text("card");
    let card = if card_name.is_empty() {
        config
            .cards
            .known
            .first()
            .map(|name| Card::from_name(name))
            .unwrap_or(Card::Naranja)
    } else {
        let card = Card::from_name(&card_name);
        if !is_known_card(&config.cards.known, &card) {
            return Err(ApiError::bad_request("Elegí una de las tarjetas configuradas."));
        }
        card
    };

    Ok(NewPurchase {
        purchase_date,
        merchant: form.text("merchant"),
        description: form.text("description"),
        total_amount,
        installment_count,
        card,
        installments_paid,
        notes: form.text("notes"),
    })
}

/// Installment preview for the entry form (HTML fragment)
pub async fn htmx_purchase_preview(state: State<AppState>, body: String) -> Result<Html<String>, HtmlError> {
    let draft = draft_from_form(&state.config, &FormData::parse(&body), true)?;

    let html = match draft.preview() {
        Some(preview) => format!(
            r#"<div class='grid grid-cols-2 gap-4'>
                <div class='bg-indigo-50 p-3 rounded-lg border border-indigo-100'><p class='text-xs text-indigo-600'>Valor de cada cuota</p><p class='text-xl font-bold' id='preview-installment'>{}</p></div>
                <div class='bg-orange-50 p-3 rounded-lg border border-orange-100'><p class='text-xs text-orange-600'>Saldo restante</p><p class='text-xl font-bold' id='preview-remaining'>{}</p></div>
            </div>"#,
            money(&state.config, preview.installment_amount),
            money(&state.config, preview.remaining_balance)
        ),
        None => "<p class='text-sm text-gray-500'>Ingresá una cantidad de cuotas mayor a 0 para ver el cálculo.</p>".to_string(),
    };
    Ok(Html(html))
}

/// Append a new purchase (HTMX)
pub async fn htmx_purchase_store(state: State<AppState>, body: String) -> Result<Html<String>, HtmlError> {
    let draft = draft_from_form(&state.config, &FormData::parse(&body), false)?;

    let ledger = state.ledger.write().await;
    let purchase = ledger.create(draft).await?;

    Ok(Html(success_banner(
        "Compra registrada",
        &format!(
            "{} con {}: {} cuotas de {}. Saldo restante: {}.",
            escape_html(&purchase.merchant),
            escape_html(purchase.card.name()),
            purchase.installment_count,
            money(&state.config, purchase.installment_amount()),
            money(&state.config, purchase.remaining_balance())
        ),
    )))
}
