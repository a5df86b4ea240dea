//! Segment identity: allocation, soft deletion and key lookup.

use std::collections::BTreeMap;

use tracing::info;

use super::ContentError;
use crate::models::{RegistryEntry, SegmentId};
use crate::repository::DieselSegmentRegistryRepository;

/// Segment registry over the database.
#[derive(Clone)]
pub struct SegmentRegistry {
    repo: DieselSegmentRegistryRepository,
}

impl SegmentRegistry {
    pub fn new(repo: DieselSegmentRegistryRepository) -> Self {
        Self { repo }
    }

    /// Allocate a globally unique id for a new segment on a page.
    pub async fn allocate(
        &self,
        page_slug: &str,
        segment_type: &str,
    ) -> Result<RegistryEntry, ContentError> {
        let entry = self.repo.allocate(page_slug, segment_type, false).await?;
        info!(
            "Allocated segment {} ({}) on {}",
            entry.segment_id, entry.segment_key, page_slug
        );
        Ok(entry)
    }

    /// Mark a segment deleted. File mappings that reference it are untouched.
    pub async fn soft_delete(&self, segment_id: SegmentId) -> Result<bool, ContentError> {
        let affected = self.repo.soft_delete(segment_id).await?;
        if affected {
            info!("Soft-deleted segment {}", segment_id);
        }
        Ok(affected)
    }

    /// Live segment keys of a page mapped to their ids.
    pub async fn lookup(&self, page_slug: &str) -> Result<BTreeMap<String, SegmentId>, ContentError> {
        Ok(self.repo.lookup(page_slug).await?)
    }

    /// Every entry of a page, deleted ones included.
    pub async fn entries(&self, page_slug: &str) -> Result<Vec<RegistryEntry>, ContentError> {
        Ok(self.repo.list_for_page(page_slug).await?)
    }

    pub async fn get(&self, segment_id: SegmentId) -> Result<Option<RegistryEntry>, ContentError> {
        Ok(self.repo.get(segment_id).await?)
    }
}
