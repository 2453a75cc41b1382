//! Summary routes - Monthly summary and charts

pub mod api;
pub mod page;

pub use api::api_summary;
pub use page::page_summary;
