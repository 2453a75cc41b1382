//! Delete pages - HTMX page rendering

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Html;
use cuotas_core::{CoreError, RecordId};
use cuotas_utils::escape_html;

use crate::routes::{id_segment, record_selector};
use crate::{info_box, money, page_response, AppState, HtmlError};

/// Record selector; the confirmation panel loads below it
pub async fn page_delete_select(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, HtmlError> {
    let ledger = state.ledger.read().await;
    let body = match ledger.selection().await {
        Ok(options) => format!(
            r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6 max-w-2xl'>
                <label class='text-sm text-gray-600'>Compra a eliminar</label>
                <div class='mt-1'>{}</div>
            </div>
            <div id='delete-confirm' class='max-w-2xl'></div>"#,
            record_selector("delete-selector", &options, None, "delete", "#delete-confirm", false)
        ),
        Err(CoreError::EmptyLedger) => info_box("No hay compras para eliminar."),
        Err(e) => return Err(e.into()),
    };

    let inner_content = format!(
        "<div class='mb-6'><h2 class='text-2xl font-bold'>Eliminar compra</h2></div>{}",
        body
    );
    Ok(Html(page_response(&headers, "Eliminar compra", "/delete", &inner_content)))
}

/// Details of the selected purchase and the confirmation button
pub async fn page_purchase_delete(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Html<String>, HtmlError> {
    let id = RecordId::new(id);
    let ledger = state.ledger.read().await;
    let notice = ledger.deletion_notice(&id).await?;
    let view = &notice.purchase;
    let p = &view.purchase;
    let config = &state.config;

    let inner_content = format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6'>
            <dl class='grid grid-cols-2 gap-2 text-sm mb-4'>
                <dt class='text-gray-500'>Fecha</dt><dd>{}</dd>
                <dt class='text-gray-500'>Comercio</dt><dd>{}</dd>
                <dt class='text-gray-500'>Tarjeta</dt><dd>{}</dd>
                <dt class='text-gray-500'>Monto total</dt><dd>{}</dd>
                <dt class='text-gray-500'>Cuotas pagadas</dt><dd>{}/{}</dd>
                <dt class='text-gray-500'>Saldo restante</dt><dd>{}</dd>
            </dl>
            <div class='bg-yellow-50 border border-yellow-200 rounded-lg p-4 text-yellow-800 mb-4'>{}</div>
            <form hx-post='/purchases/{}/delete' hx-target='#delete-confirm' class='flex gap-2'>
                <input type='hidden' name='confirm' value='yes'>
                <button type='submit' class='px-4 py-2 bg-red-600 text-white rounded-lg hover:bg-red-700'>Sí, eliminar</button>
                <button type='button' class='px-4 py-2 bg-gray-100 rounded-lg hover:bg-gray-200' onclick="document.getElementById('delete-confirm').innerHTML = ''">Cancelar</button>
            </form>
        </div>"#,
        escape_html(&p.display_date()),
        escape_html(&p.merchant),
        escape_html(p.card.name()),
        money(config, p.total_amount),
        p.installments_paid,
        p.installment_count,
        money(config, view.remaining_balance),
        escape_html(&notice.warning),
        id_segment(&id)
    );

    Ok(Html(page_response(&headers, "Eliminar compra", "/delete", &inner_content)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use cuotas_sheet::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_confirmation_panel_warns_before_delete() {
        let store = seeded_store();
        let before = store.snapshot();
        let (status, body) = get(app(store.clone()), "/purchases/b/delete").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("15/04/2024"));
        assert!(body.contains("no se puede deshacer"));
        assert!(body.contains("name='confirm' value='yes'"));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_selector_on_empty_ledger() {
        let (status, body) = get(app(Arc::new(MemoryStore::new())), "/delete").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No hay compras para eliminar."));
    }
}
