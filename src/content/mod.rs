//! Content pipeline: segment identity, page assembly, asset mappings and editing.

mod assembler;
mod assets;
mod cleanup;
mod editor;
mod registry;

pub use assembler::{assemble_segments, localize, parse_segments, parse_tab_order, PageAssembler};
pub use assets::{extract_file_path, parse_public_url, AssetResolver};
pub use cleanup::{cleanup_orphans, CleanupReport};
pub use editor::PageEditor;
pub use registry::SegmentRegistry;

use thiserror::Error;

use crate::models::SegmentId;
use crate::repository::DieselError;
use crate::storage::StorageError;

/// Errors raised by the content pipeline.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Database error: {0}")]
    Database(#[from] DieselError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid JSON in {key}: {source}")]
    InvalidJson {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Segment not found: {0}")]
    SegmentNotFound(SegmentId),

    #[error("Unknown segment type: {0}")]
    UnknownSegmentType(String),

    #[error("Not a public storage URL: {0}")]
    UnsupportedUrl(String),
}

/// Normalize a page slug: no leading or trailing slashes, `home` for the root page.
pub fn normalize_slug(slug: &str) -> String {
    let trimmed = slug.trim().trim_matches('/');
    if trimmed.is_empty() {
        "home".to_string()
    } else {
        trimmed.to_string()
    }
}
