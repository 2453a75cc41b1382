//! Core purchase ledger logic
//!
//! `Ledger` is the single entry point for every flow. Each call reads the
//! whole store, works on the decoded purchases and, for mutations, writes
//! back at the row the target purchase occupies in that fresh read.

pub mod browse;
pub mod calculator;
pub mod codec;
pub mod delete;
pub mod edit;
pub mod entry;
pub mod error;
pub mod model;
pub mod payment;
pub mod summary;

use cuotas_config::Config;
use cuotas_sheet::{CellValue, Column, SheetRow, StoreError, StoreRef, FIRST_DATA_ROW};
use log::{debug, info};

pub use browse::{BrowseView, CardFilter, CardTotal, MonthFilter, RecordFilter};
pub use delete::DeletionNotice;
pub use edit::{PurchaseEdit, SelectionOption};
pub use entry::{NewPurchase, Preview};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity, ValidationIssue};
pub use model::{Card, DataWarning, LedgerSnapshot, Purchase, PurchaseView, RecordId, YearMonth};
pub use payment::PaymentView;
pub use summary::{ChartData, ChartDataset, MonthTotals, MonthlySummary, SummaryGroup};

/// Rules that vary with configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerPolicy {
    /// Apply the edit rules to new purchases as well
    pub enforce_on_create: bool,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self { enforce_on_create: true }
    }
}

impl LedgerPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enforce_on_create: config.validation.enforce_on_create,
        }
    }
}

/// Purchase ledger service over an injected store
pub struct Ledger {
    store: StoreRef,
    policy: LedgerPolicy,
}

impl Ledger {
    pub fn new(store: StoreRef, config: &Config) -> Self {
        Self::with_policy(store, LedgerPolicy::from_config(config))
    }

    pub fn with_policy(store: StoreRef, policy: LedgerPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    pub fn store_description(&self) -> String {
        self.store.describe()
    }

    // ==================== Reading ====================

    /// Fresh read of every purchase in sheet order
    pub async fn snapshot(&self) -> CoreResult<LedgerSnapshot> {
        let rows = self.data_rows().await?;
        let (purchases, warnings) = codec::decode_rows(&rows);
        debug!("Loaded {} purchases ({} data warnings)", purchases.len(), warnings.len());
        Ok(LedgerSnapshot { purchases, warnings })
    }

    /// Rows that hold at least one value
    async fn data_rows(&self) -> CoreResult<Vec<SheetRow>> {
        let rows = self.store.read_all_rows().await.map_err(log_store_error)?;
        Ok(rows
            .into_iter()
            .filter(|row| row.cells.values().any(|c| !c.is_empty()))
            .collect())
    }

    /// Current state of one purchase, including its current row
    pub async fn purchase(&self, id: &RecordId) -> CoreResult<Purchase> {
        self.snapshot()
            .await?
            .find(id)
            .cloned()
            .ok_or_else(|| CoreError::RecordNotFound { id: id.clone() })
    }

    /// Snapshot in which every purchase carries a stored ID.
    ///
    /// Lists that hand IDs back to the client go through here, so rows added
    /// to the sheet by hand get an ID before anyone can act on them.
    async fn identified_snapshot(&self) -> CoreResult<LedgerSnapshot> {
        let snapshot = self.snapshot().await?;
        if snapshot.purchases.iter().all(|p| !p.id.is_positional()) {
            return Ok(snapshot);
        }
        self.backfill_ids().await?;
        self.snapshot().await
    }

    /// Purchase a mutation targets. Positional IDs move when rows are
    /// deleted, so they are refused rather than resolved.
    async fn target(&self, id: &RecordId) -> CoreResult<Purchase> {
        if id.is_positional() {
            return Err(CoreError::StaleRecord { id: id.clone() });
        }
        self.purchase(id).await
    }

    pub async fn browse(&self, filter: RecordFilter) -> CoreResult<BrowseView> {
        Ok(BrowseView::build(&self.snapshot().await?, filter))
    }

    pub async fn payments(&self, card: Option<Card>) -> CoreResult<PaymentView> {
        Ok(PaymentView::build(&self.identified_snapshot().await?, card))
    }

    pub async fn monthly_summary(&self) -> CoreResult<MonthlySummary> {
        Ok(MonthlySummary::build(&self.snapshot().await?))
    }

    /// Options for the edit and delete selectors
    pub async fn selection(&self) -> CoreResult<Vec<SelectionOption>> {
        let snapshot = self.identified_snapshot().await?;
        if snapshot.is_empty() {
            return Err(CoreError::EmptyLedger);
        }
        Ok(edit::selection_options(&snapshot.purchases))
    }

    pub async fn deletion_notice(&self, id: &RecordId) -> CoreResult<DeletionNotice> {
        Ok(DeletionNotice::for_purchase(&self.purchase(id).await?))
    }

    // ==================== Mutations ====================

    /// Validate and append a new purchase as the last row
    pub async fn create(&self, draft: NewPurchase) -> CoreResult<Purchase> {
        let issues = draft.validate(self.policy.enforce_on_create);
        if !issues.is_empty() {
            return Err(CoreError::Validation { issues });
        }

        let next_row = self.store.read_all_rows().await.map_err(log_store_error)?.len() + FIRST_DATA_ROW;
        let purchase = draft.into_purchase(RecordId::generate(), next_row);
        self.store
            .append_row(codec::encode_purchase(&purchase))
            .await
            .map_err(log_store_error)?;

        info!(
            "Added purchase {} ({} at {}, {} cuotas)",
            purchase.id, purchase.merchant, purchase.card, purchase.installment_count
        );
        Ok(purchase)
    }

    /// Mark one more installment as paid, writing only that cell
    pub async fn pay_installment(&self, id: &RecordId) -> CoreResult<Purchase> {
        let current = self.target(id).await?;
        let paid = payment::next_payment(&current).ok_or_else(|| CoreError::AlreadyPaid {
            id: id.clone(),
            count: current.installment_count,
        })?;

        self.store
            .update_cell(
                current.row_number,
                Column::InstallmentsPaid.index(),
                codec::encode_field(&paid, Column::InstallmentsPaid),
            )
            .await
            .map_err(log_store_error)?;

        info!(
            "Purchase {} now has {}/{} installments paid",
            id, paid.installments_paid, paid.installment_count
        );
        Ok(paid)
    }

    /// Validate an edit and overwrite every mutable field of the purchase.
    ///
    /// Fields are written one cell at a time; a store failure part way
    /// leaves the earlier cells written.
    pub async fn apply_edit(&self, id: &RecordId, edit: PurchaseEdit) -> CoreResult<Purchase> {
        let issues = edit.validate();
        if !issues.is_empty() {
            return Err(CoreError::Validation { issues });
        }

        let current = self.target(id).await?;
        let updated = edit.apply_to(&current);
        for column in Column::ALL.iter().filter(|c| **c != Column::Id) {
            self.store
                .update_cell(current.row_number, column.index(), codec::encode_field(&updated, *column))
                .await
                .map_err(log_store_error)?;
        }

        info!("Updated purchase {} at row {}", id, current.row_number);
        Ok(updated)
    }

    /// Remove a purchase row; later rows move up by one
    pub async fn delete(&self, id: &RecordId, confirmed: bool) -> CoreResult<Purchase> {
        if !confirmed {
            return Err(CoreError::ConfirmationRequired { id: id.clone() });
        }

        let current = self.target(id).await?;
        self.store.delete_row(current.row_number).await.map_err(log_store_error)?;

        info!("Deleted purchase {} ({}) from row {}", id, current.merchant, current.row_number);
        Ok(current)
    }

    // ==================== Schema maintenance ====================

    /// Make sure the header row matches the purchase columns.
    ///
    /// Writes the whole header on an empty sheet and adds the `ID` header on
    /// sheets created before IDs existed. Returns whether anything was written.
    pub async fn ensure_schema(&self) -> CoreResult<bool> {
        let header = self.store.read_header().await.map_err(log_store_error)?;

        if header.iter().all(|h| h.is_empty()) {
            let cells = Column::headers().into_iter().map(CellValue::Text).collect();
            self.store.append_row(cells).await.map_err(log_store_error)?;
            info!("Wrote header row to empty ledger");
            return Ok(true);
        }

        for column in Column::ALL.iter().filter(|c| **c != Column::Id) {
            let found = header.get(column.index() - 1).map(String::as_str).unwrap_or("");
            if found != column.header() {
                return Err(log_store_error(StoreError::HeaderMismatch {
                    column: column.index(),
                    expected: column.header().to_string(),
                    found: found.to_string(),
                })
                .into());
            }
        }

        match header.get(Column::Id.index() - 1).map(String::as_str) {
            Some(h) if h == Column::Id.header() => Ok(false),
            Some(h) if !h.is_empty() => Err(StoreError::HeaderMismatch {
                column: Column::Id.index(),
                expected: Column::Id.header().to_string(),
                found: h.to_string(),
            }
            .into()),
            _ => {
                self.store
                    .update_cell(1, Column::Id.index(), CellValue::text(Column::Id.header()))
                    .await
                    .map_err(log_store_error)?;
                info!("Added ID column header");
                Ok(true)
            }
        }
    }

    /// Give every purchase without an ID a fresh one; returns how many were written
    pub async fn backfill_ids(&self) -> CoreResult<usize> {
        let rows = self.data_rows().await?;
        let mut written = 0;
        for row in rows.iter().filter(|r| r.get(Column::Id).is_empty()) {
            let id = RecordId::generate();
            self.store
                .update_cell(row.row_number, Column::Id.index(), CellValue::text(id.as_str()))
                .await
                .map_err(log_store_error)?;
            written += 1;
        }
        if written > 0 {
            info!("Assigned IDs to {} purchases", written);
        }
        Ok(written)
    }
}

fn log_store_error(error: StoreError) -> StoreError {
    log::error!("Ledger store failure: {}", error);
    error
}
