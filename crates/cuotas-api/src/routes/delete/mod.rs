//! Delete routes - Record selector and confirmed deletion

pub mod api;
pub mod page;

pub use api::htmx_purchase_destroy;
pub use page::{page_delete_select, page_purchase_delete};
