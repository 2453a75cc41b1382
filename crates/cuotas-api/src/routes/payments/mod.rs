//! Payment routes - Installment payments per card

pub mod api;
pub mod page;

pub use api::{htmx_payment_store, htmx_payments_list};
pub use page::page_payments;
