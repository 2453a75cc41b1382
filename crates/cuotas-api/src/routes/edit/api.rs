//! Edit endpoints - HTMX actions

use axum::extract::{Path, State};
use axum::response::Html;
use cuotas_core::{Card, PurchaseEdit, RecordId};
use cuotas_utils::escape_html;

use crate::form::FormData;
use crate::routes::{is_known_card, record_selector};
use crate::{money, success_banner, ApiError, AppState, HtmlError};

/// Build an edit from the submitted form.
///
/// Unreadable amounts and counts are kept as values the edit rules reject,
/// so the user sees every failed rule at once.
pub fn edit_from_form(form: &FormData) -> Result<PurchaseEdit, ApiError> {
    let card = form.text("card");
    if card.is_empty() {
        return Err(ApiError::bad_request("Elegí una tarjeta."));
    }
    let installments_paid = match form.get("installments_paid").map(str::trim) {
        None | Some("") => 0,
        Some(_) => form
            .count("installments_paid")
            .ok_or_else(|| ApiError::bad_request("Las cuotas pagadas deben ser un número entero."))?,
    };

    Ok(PurchaseEdit {
        date_text: form.text("date_text"),
        merchant: form.text("merchant"),
        description: form.text("description"),
        total_amount: form.number("total_amount").unwrap_or(f64::NAN),
        card: Card::from_name(&card),
        installment_count: form.count("installment_count").unwrap_or(0),
        installments_paid,
        notes: form.text("notes"),
    })
}

/// Overwrite a purchase with the submitted values (HTMX)
pub async fn htmx_purchase_update(
    state: State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> Result<Html<String>, HtmlError> {
    let id = RecordId::new(id);
    let edit = edit_from_form(&FormData::parse(&body))?;

    let ledger = state.ledger.write().await;
    // A record may keep a card that was later dropped from the settings
    if !is_known_card(&state.config.cards.known, &edit.card) && ledger.purchase(&id).await?.card != edit.card {
        return Err(ApiError::bad_request("Elegí una de las tarjetas configuradas.").into());
    }
    let updated = ledger.apply_edit(&id, edit).await?;
    let options = ledger.selection().await?;

    let banner = success_banner(
        "Compra actualizada",
        &format!(
            "{} del {}: {}/{} cuotas pagadas, saldo restante {}.",
            escape_html(&updated.merchant),
            escape_html(&updated.display_date()),
            updated.installments_paid,
            updated.installment_count,
            money(&state.config, updated.remaining_balance())
        ),
    );
    Ok(Html(format!(
        "{}{}",
        banner,
        record_selector("edit-selector", &options, Some(&id), "edit", "#edit-form", true)
    )))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use cuotas_sheet::{CellValue, MemoryStore};

    #[tokio::test]
    async fn test_update_rewrites_record_in_place() {
        let store = seeded_store();
        let before = store.snapshot();

        let (status, body) = post_form(
            app(store.clone()),
            "/purchases/b",
            "date_text=16%2F04%2F2024&merchant=Store+B2&description=tv&total_amount=900&card=Macro&installment_count=3&installments_paid=2&notes=ok",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Compra actualizada"));
        assert!(body.contains("$300.00"));
        assert!(body.contains("hx-swap-oob"));

        let after = store.snapshot();
        assert_eq!(after[2][0], CellValue::text("16/04/2024"));
        assert_eq!(after[2][1], CellValue::text("Store B2"));
        assert_eq!(after[2][3], CellValue::text("900.00"));
        assert_eq!(after[2][6], CellValue::Number(2.0));
        assert_eq!(after[2][8], before[2][8]);
        assert_eq!(after[1], before[1]);
        assert_eq!(after[3], before[3]);
    }

    #[tokio::test]
    async fn test_update_reports_every_failed_rule() {
        let store = seeded_store();
        let before = store.snapshot();

        let (status, body) = post_form(
            app(store.clone()),
            "/purchases/a",
            "date_text=&merchant=&total_amount=abc&card=Naranja&installment_count=4&installments_paid=5",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("VALIDATION_ERROR"));
        assert!(body.contains("superar"));
        assert!(body.contains("El comercio no puede estar vacío."));
        assert!(body.contains("La fecha de compra no puede estar vacía."));
        assert!(body.contains("mayor o igual a 0"));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_update_card_must_be_configured_or_current() {
        let store = MemoryStore::with_rows(vec![
            row("01/03/2024", "Store A", "1000.00", 4, "Naranja", 1, "a"),
            row("15/04/2024", "Store B", "600.00", 3, "Visa", 1, "b"),
        ]);
        let store = std::sync::Arc::new(store);
        let before = store.snapshot();

        let (status, body) = post_form(
            app(store.clone()),
            "/purchases/a",
            "date_text=01%2F03%2F2024&merchant=Store+A&total_amount=1000&card=Amex&installment_count=4&installments_paid=1",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("tarjetas configuradas"));
        assert_eq!(store.snapshot(), before);

        let (status, _) = post_form(
            app(store.clone()),
            "/purchases/b",
            "date_text=15%2F04%2F2024&merchant=Store+B&total_amount=600&card=Visa&installment_count=3&installments_paid=2",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.snapshot()[2][5], CellValue::text("Visa"));
        assert_eq!(store.snapshot()[2][6], CellValue::Number(2.0));
    }

    #[tokio::test]
    async fn test_update_unknown_record() {
        let (status, _) = post_form(
            app(seeded_store()),
            "/purchases/zzz",
            "date_text=01%2F01%2F2024&merchant=X&total_amount=1&card=Macro&installment_count=1&installments_paid=0",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
