//! Delete endpoints - HTMX actions

use axum::extract::{Path, State};
use axum::response::Html;
use cuotas_core::delete::is_confirmed;
use cuotas_core::{CoreError, RecordId};
use cuotas_utils::escape_html;

use crate::form::FormData;
use crate::routes::record_selector;
use crate::{success_banner, AppState, HtmlError};

/// Remove a purchase once the form carries an explicit confirmation (HTMX)
pub async fn htmx_purchase_destroy(
    state: State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> Result<Html<String>, HtmlError> {
    let id = RecordId::new(id);
    let confirmed = is_confirmed(FormData::parse(&body).get("confirm"));

    let ledger = state.ledger.write().await;
    let removed = ledger.delete(&id, confirmed).await?;
    let options = match ledger.selection().await {
        Ok(options) => options,
        Err(CoreError::EmptyLedger) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let banner = success_banner(
        "Compra eliminada",
        &format!(
            "Se eliminó la compra del {} en {}.",
            escape_html(&removed.display_date()),
            escape_html(&removed.merchant)
        ),
    );
    Ok(Html(format!(
        "{}{}",
        banner,
        record_selector("delete-selector", &options, None, "delete", "#delete-confirm", true)
    )))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use cuotas_sheet::CellValue;

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let store = seeded_store();
        let before = store.snapshot();
        let (status, body) = post_form(app(store.clone()), "/purchases/b/delete", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("CONFIRMATION_REQUIRED"));
        assert_eq!(store.snapshot(), before);

        let (status, _) = post_form(app(store.clone()), "/purchases/b/delete", "confirm=no").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_confirmed_delete_shifts_later_rows() {
        let store = seeded_store();
        let (status, body) = post_form(app(store.clone()), "/purchases/b/delete", "confirm=yes").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Compra eliminada"));
        assert!(body.contains("Store B"));
        assert!(body.contains("2. 20/03/2024 - Store C"));

        let rows = store.snapshot();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][8], CellValue::text("a"));
        assert_eq!(rows[2][8], CellValue::text("c"));
    }

    #[tokio::test]
    async fn test_delete_unknown_record() {
        let store = seeded_store();
        let (status, _) = post_form(app(store.clone()), "/purchases/zzz/delete", "confirm=yes").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(store.snapshot().len(), 4);
    }
}
