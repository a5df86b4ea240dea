//! HTTP request handlers for the web server.

mod admin;
mod api;
mod helpers;
mod pages;

// Re-export handlers for use by the router
pub use admin::{create_segment, delete_segment, update_mapping};
pub use api::{api_alt_text, api_page, api_registry, health};
pub use pages::{home_page, page_html};
