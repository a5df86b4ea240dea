//! Shared utility functions.

mod html;

pub use html::{escape_script_json, html_escape, is_safe_url};
