//! Orphaned file reconciliation.
//!
//! A stored file is orphaned when no live segment references it (its mapping
//! is missing, empty, or points only at soft-deleted segments) and no stored
//! page content mentions its public URL. Content references cover legacy flat
//! rows, raw blobs and hidden segments, none of which carry mappings.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::assets::{collect_public_urls, parse_public_url};
use super::ContentError;
use crate::repository::DbContext;
use crate::storage::BlobStore;

/// Outcome of a cleanup pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CleanupReport {
    pub bucket: String,
    pub dry_run: bool,
    /// Files inspected.
    pub scanned: usize,
    /// Orphaned file paths, sorted.
    pub orphans: Vec<String>,
    /// Files actually removed (always 0 on dry runs).
    pub deleted: usize,
}

/// Find and optionally delete orphaned files in a bucket.
///
/// Non-dry runs delete both the blob and its mapping row. A failure on one
/// file is logged and the pass continues.
pub async fn cleanup_orphans(
    ctx: &DbContext,
    store: &dyn BlobStore,
    bucket: &str,
    dry_run: bool,
) -> Result<CleanupReport, ContentError> {
    let files = store.list(bucket).await?;
    let mappings: HashMap<String, _> = ctx
        .file_mappings()
        .list_for_bucket(bucket)
        .await?
        .into_iter()
        .map(|m| (m.file_path.clone(), m))
        .collect();
    let deleted_ids = ctx.registry().deleted_ids().await?;
    let referenced = referenced_files(ctx, bucket).await?;

    let mut report = CleanupReport {
        bucket: bucket.to_string(),
        dry_run,
        scanned: files.len(),
        ..Default::default()
    };

    for path in files {
        if referenced.contains(&path) {
            continue;
        }
        let orphaned = match mappings.get(&path) {
            Some(mapping) => !mapping.has_live_reference(&deleted_ids),
            None => true,
        };
        if !orphaned {
            continue;
        }

        if !dry_run {
            if let Err(e) = store.delete(bucket, &path).await {
                warn!("Failed to delete orphan {}/{}: {}", bucket, path, e);
                report.orphans.push(path);
                continue;
            }
            if mappings.contains_key(&path) {
                ctx.file_mappings().delete(&path, bucket).await?;
            }
            report.deleted += 1;
            info!("Deleted orphan {}/{}", bucket, path);
        }
        report.orphans.push(path);
    }

    Ok(report)
}

/// File paths in `bucket` whose public URL appears in any stored content row.
async fn referenced_files(ctx: &DbContext, bucket: &str) -> Result<HashSet<String>, ContentError> {
    let mut urls = Vec::new();
    for row in ctx.pages().list_all().await? {
        match row.parse_json() {
            Ok(value) => collect_public_urls(&value, &mut urls),
            Err(_) => {
                if let Some((b, _)) = parse_public_url(&row.content_value) {
                    urls.push((row.content_value.trim().to_string(), b));
                }
            }
        }
    }

    let referenced: HashSet<String> = urls
        .iter()
        .filter(|(_, b)| b == bucket)
        .filter_map(|(url, _)| parse_public_url(url).map(|(_, path)| path))
        .collect();
    debug!("{} files in {} referenced by page content", referenced.len(), bucket);
    Ok(referenced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PageEditor;
    use crate::models::{ContentType, FileSegmentMapping, Language};
    use serde_json::json;
    use crate::storage::LocalBlobStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_cleanup_finds_and_removes_orphans() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_sqlite_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        let store = LocalBlobStore::new(dir.path().join("blobs"), "http://localhost");

        let live = ctx.registry().allocate("home", "image-text", false).await.unwrap();
        let gone = ctx.registry().allocate("home", "image-text", false).await.unwrap();
        ctx.registry().soft_delete(gone.segment_id).await.unwrap();

        for (path, ids) in [
            ("live.jpg", vec![live.segment_id]),
            ("dead.jpg", vec![gone.segment_id]),
            ("mixed.jpg", vec![gone.segment_id, live.segment_id]),
            ("empty.jpg", vec![]),
        ] {
            store.put("page-images", path, b"img").await.unwrap();
            let mut mapping = FileSegmentMapping::new(path, "page-images");
            for id in ids {
                mapping.add_segment(id);
            }
            ctx.file_mappings().save(&mapping).await.unwrap();
        }
        store.put("page-images", "unmapped.jpg", b"img").await.unwrap();

        let report = cleanup_orphans(&ctx, &store, "page-images", true).await.unwrap();
        assert_eq!(report.scanned, 5);
        assert_eq!(report.orphans, vec!["dead.jpg", "empty.jpg", "unmapped.jpg"]);
        assert_eq!(report.deleted, 0);
        assert_eq!(store.list("page-images").await.unwrap().len(), 5);

        let report = cleanup_orphans(&ctx, &store, "page-images", false).await.unwrap();
        assert_eq!(report.deleted, 3);
        assert_eq!(
            store.list("page-images").await.unwrap(),
            vec!["live.jpg".to_string(), "mixed.jpg".to_string()]
        );
        assert!(ctx
            .file_mappings()
            .get("dead.jpg", "page-images")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_cleanup_spares_files_referenced_by_content() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_sqlite_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        let store = LocalBlobStore::new(dir.path().join("blobs"), "http://localhost");
        let editor = PageEditor::new(&ctx);

        for path in ["hero.jpg", "raw.jpg", "hidden.jpg", "other.jpg", "stray.jpg"] {
            store.put("page-images", path, b"img").await.unwrap();
        }
        store.put("news-images", "other.jpg", b"img").await.unwrap();

        editor
            .set_content(
                "home",
                "hero_image_url",
                Language::En,
                ContentType::Text,
                &store.public_url("page-images", "hero.jpg"),
            )
            .await
            .unwrap();
        editor
            .set_content(
                "home",
                "gallery",
                Language::Ko,
                ContentType::Json,
                &json!({"items": [{"src": store.public_url("page-images", "raw.jpg")}]})
                    .to_string(),
            )
            .await
            .unwrap();

        // Soft-deleted in the registry but still present in the page blobs.
        let hidden = editor
            .add_segment(
                "home",
                Language::En,
                "banner",
                json!({"imageUrl": store.public_url("page-images", "hidden.jpg")}),
            )
            .await
            .unwrap();
        editor.hide_segment("home", Language::En, hidden.id).await.unwrap();
        ctx.registry().soft_delete(hidden.id).await.unwrap();

        // Same path in another bucket does not keep this one alive.
        editor
            .set_content(
                "home",
                "banner_image_url",
                Language::En,
                ContentType::Text,
                &store.public_url("news-images", "other.jpg"),
            )
            .await
            .unwrap();

        let report = cleanup_orphans(&ctx, &store, "page-images", false).await.unwrap();
        assert_eq!(report.orphans, vec!["other.jpg", "stray.jpg"]);
        assert_eq!(report.deleted, 2);
        assert_eq!(
            store.list("page-images").await.unwrap(),
            vec!["hero.jpg", "hidden.jpg", "raw.jpg"]
        );
    }
}
