//! Segment registry entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::SegmentId;

/// Identity record for a segment.
///
/// Entries are never hard-deleted so file mappings that point at a segment id
/// keep resolving to a known (possibly soft-deleted) owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryEntry {
    pub segment_id: SegmentId,
    pub page_slug: String,
    pub segment_type: String,
    /// Human-readable key, `{type}-{ordinal}`.
    pub segment_key: String,
    pub is_static: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl RegistryEntry {
    /// Build the segment key for the `ordinal`-th segment of a type on a page.
    pub fn segment_key_for(segment_type: &str, ordinal: i64) -> String {
        format!("{segment_type}-{ordinal}")
    }
}
