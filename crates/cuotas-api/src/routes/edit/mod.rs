//! Edit routes - Record selector and edit form

pub mod api;
pub mod page;

pub use api::htmx_purchase_update;
pub use page::{page_edit_select, page_purchase_edit};
