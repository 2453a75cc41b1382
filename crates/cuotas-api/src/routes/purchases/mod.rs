//! Purchase routes - Entry form, live preview, browse and filter

pub mod api;
pub mod page;

pub use api::{api_purchases, htmx_purchase_preview, htmx_purchase_store, htmx_purchases_list};
pub use page::{page_purchase_new, page_purchases};
