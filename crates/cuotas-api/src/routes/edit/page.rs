//! Edit pages - HTMX page rendering

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Html;
use cuotas_core::{CoreError, PurchaseEdit, RecordId};
use cuotas_utils::escape_html;

use crate::routes::{card_options, id_segment, record_selector};
use crate::{info_box, page_response, AppState, HtmlError};

/// Record selector; the chosen record's form loads below it
pub async fn page_edit_select(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, HtmlError> {
    let ledger = state.ledger.read().await;
    let body = match ledger.selection().await {
        Ok(options) => format!(
            r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6 max-w-2xl'>
                <label class='text-sm text-gray-600'>Compra a editar</label>
                <div class='mt-1'>{}</div>
            </div>
            <div id='edit-form' class='max-w-2xl'></div>"#,
            record_selector("edit-selector", &options, None, "edit", "#edit-form", false)
        ),
        Err(CoreError::EmptyLedger) => info_box("No hay compras para editar."),
        Err(e) => return Err(e.into()),
    };

    let inner_content = format!(
        "<div class='mb-6'><h2 class='text-2xl font-bold'>Editar compra</h2></div>{}",
        body
    );
    Ok(Html(page_response(&headers, "Editar compra", "/edit", &inner_content)))
}

/// Edit form pre-filled with the stored values
pub async fn page_purchase_edit(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Html<String>, HtmlError> {
    let id = RecordId::new(id);
    let ledger = state.ledger.read().await;
    let purchase = ledger.purchase(&id).await?;
    let edit = PurchaseEdit::from_purchase(&purchase);
    let input = "mt-1 w-full px-3 py-2 border rounded-lg";

    let inner_content = format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6'>
            <form hx-post='/purchases/{id}' hx-target='#edit-result' class='grid grid-cols-1 md:grid-cols-2 gap-4'>
                <label class='text-sm text-gray-600'>Fecha de compra (dd/mm/aaaa)<input type='text' name='date_text' value='{date}' class='{input}'></label>
                <label class='text-sm text-gray-600'>Comercio<input type='text' name='merchant' value='{merchant}' class='{input}'></label>
                <label class='text-sm text-gray-600 md:col-span-2'>Descripción<input type='text' name='description' value='{description}' class='{input}'></label>
                <label class='text-sm text-gray-600'>Monto total<input type='number' name='total_amount' min='0' step='0.01' value='{total:.2}' class='{input}'></label>
                <label class='text-sm text-gray-600'>Tarjeta<select name='card' class='{input} bg-white'>{cards}</select></label>
                <label class='text-sm text-gray-600'>Cantidad de cuotas<input type='number' name='installment_count' min='1' step='1' value='{count}' class='{input}'></label>
                <label class='text-sm text-gray-600'>Cuotas pagadas<input type='number' name='installments_paid' min='0' step='1' value='{paid}' class='{input}'></label>
                <label class='text-sm text-gray-600 md:col-span-2'>Observaciones<textarea name='notes' rows='2' class='{input}'>{notes}</textarea></label>
                <div class='md:col-span-2'><button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Guardar cambios</button></div>
            </form>
            <div id='edit-result' class='mt-4'></div>
        </div>"#,
        id = id_segment(&id),
        date = escape_html(&edit.date_text),
        merchant = escape_html(&edit.merchant),
        description = escape_html(&edit.description),
        total = edit.total_amount,
        cards = card_options(&state.config.cards.known, Some(&edit.card)),
        count = edit.installment_count,
        paid = edit.installments_paid,
        notes = escape_html(&edit.notes),
        input = input
    );

    Ok(Html(page_response(&headers, "Editar compra", "/edit", &inner_content)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use cuotas_sheet::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_selector_lists_numbered_labels() {
        let (status, body) = get(app(seeded_store()), "/edit").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("1. 01/03/2024 - Store A ($1000.00)"));
        assert!(body.contains("3. 20/03/2024 - Store C ($300.00)"));
    }

    #[tokio::test]
    async fn test_selector_on_empty_ledger() {
        let (status, body) = get(app(Arc::new(MemoryStore::new())), "/edit").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No hay compras para editar."));
        assert!(!body.contains("edit-selector"));
    }

    #[tokio::test]
    async fn test_form_is_prefilled() {
        let (status, body) = get(app(seeded_store()), "/purchases/b/edit").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("value='15/04/2024'"));
        assert!(body.contains("value='Store B'"));
        assert!(body.contains("value='600.00'"));
        assert!(body.contains("<option value='Macro' selected>"));
        assert!(body.contains("hx-post='/purchases/b'"));

        let (status, _) = get(app(seeded_store()), "/purchases/zzz/edit").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
