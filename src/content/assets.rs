//! Asset mappings: public storage URLs to file paths, alt text and
//! segment backreferences.

use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::ContentError;
use crate::models::{FileSegmentMapping, Language, SegmentId};
use crate::repository::DieselFileMappingRepository;

/// Split a public storage URL into `(bucket, file_path)`.
///
/// Matches `.../public/{bucket}/{path...}` and percent-decodes the path.
/// Relative URLs, other shapes and empty paths yield `None`.
pub fn parse_public_url(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url.trim()).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    let public = segments.iter().position(|s| *s == "public")?;

    let bucket = segments.get(public + 1).filter(|b| !b.is_empty())?;
    let rest = segments.get(public + 2..)?;
    let mut path = Vec::with_capacity(rest.len());
    for part in rest {
        path.push(urlencoding::decode(part).ok()?.into_owned());
    }
    let path = path.join("/");
    if path.trim_matches('/').is_empty() {
        return None;
    }

    let bucket = urlencoding::decode(bucket).ok()?.into_owned();
    Some((bucket, path))
}

/// The file path of a public storage URL.
pub fn extract_file_path(url: &str) -> Option<String> {
    parse_public_url(url).map(|(_, path)| path)
}

/// Resolves and maintains file mappings.
#[derive(Clone)]
pub struct AssetResolver {
    mappings: DieselFileMappingRepository,
}

impl AssetResolver {
    pub fn new(mappings: DieselFileMappingRepository) -> Self {
        Self { mappings }
    }

    /// Alt text for an image URL, or `""` when nothing is known.
    ///
    /// Never fails: lookup errors are logged and read as empty.
    pub async fn load_alt_text(&self, url: &str, bucket: &str, language: Language) -> String {
        let Some(path) = extract_file_path(url) else {
            debug!("No file path in {}", url);
            return String::new();
        };

        match self.mappings.get(&path, bucket).await {
            Ok(Some(mapping)) => mapping.resolve_alt_text(language),
            Ok(None) => String::new(),
            Err(e) => {
                warn!("Alt text lookup failed for {}/{}: {}", bucket, path, e);
                String::new()
            }
        }
    }

    /// Fetch the mapping for an image URL.
    pub async fn mapping_for(
        &self,
        url: &str,
        bucket: &str,
    ) -> Result<Option<FileSegmentMapping>, ContentError> {
        let path = file_path_or_err(url)?;
        Ok(self.mappings.get(&path, bucket).await?)
    }

    /// Record that a segment references an image. Adding twice is a no-op.
    ///
    /// This is a read-then-write; concurrent updates to the same file can
    /// lose one side's id.
    pub async fn update_segment_mapping(
        &self,
        url: &str,
        segment_id: SegmentId,
        bucket: &str,
    ) -> Result<FileSegmentMapping, ContentError> {
        let path = file_path_or_err(url)?;
        let mut mapping = self
            .mappings
            .get(&path, bucket)
            .await?
            .unwrap_or_else(|| FileSegmentMapping::new(&path, bucket));

        if mapping.add_segment(segment_id) {
            self.mappings.save(&mapping).await?;
            info!("Linked {}/{} to segment {}", bucket, path, segment_id);
        } else {
            debug!("{}/{} already linked to segment {}", bucket, path, segment_id);
        }
        Ok(mapping)
    }

    /// Drop a segment reference. The mapping row is kept even when empty.
    pub async fn remove_segment_reference(
        &self,
        url: &str,
        segment_id: SegmentId,
        bucket: &str,
    ) -> Result<bool, ContentError> {
        let path = file_path_or_err(url)?;
        let Some(mut mapping) = self.mappings.get(&path, bucket).await? else {
            return Ok(false);
        };

        let removed = mapping.remove_segment(segment_id);
        if removed {
            self.mappings.save(&mapping).await?;
            info!("Unlinked {}/{} from segment {}", bucket, path, segment_id);
        }
        Ok(removed)
    }

    /// Set alt text for one language, creating the mapping when absent.
    pub async fn set_alt_text(
        &self,
        url: &str,
        bucket: &str,
        language: Language,
        text: &str,
    ) -> Result<FileSegmentMapping, ContentError> {
        let path = file_path_or_err(url)?;
        let mut mapping = self
            .mappings
            .get(&path, bucket)
            .await?
            .unwrap_or_else(|| FileSegmentMapping::new(&path, bucket));

        mapping.set_alt_text(language, text);
        self.mappings.save(&mapping).await?;
        info!("Set {} alt text for {}/{}", language, bucket, path);
        Ok(mapping)
    }
}

/// Every string in `value` that is a public storage URL, with its bucket.
pub(crate) fn collect_public_urls(value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::String(s) => {
            if let Some((bucket, _)) = parse_public_url(s) {
                if !out.iter().any(|(u, _)| u == s) {
                    out.push((s.clone(), bucket));
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_public_urls(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_public_urls(v, out)),
        _ => {}
    }
}

fn file_path_or_err(url: &str) -> Result<String, ContentError> {
    extract_file_path(url).ok_or_else(|| ContentError::UnsupportedUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DbContext;
    use serde_json::json;
    use tempfile::tempdir;

    const URL: &str = "https://x.supabase.co/storage/v1/object/public/page-images/News/a.jpg";

    #[test]
    fn test_extract_file_path() {
        assert_eq!(extract_file_path(URL), Some("News/a.jpg".to_string()));
        assert_eq!(
            extract_file_path("http://localhost:8080/storage/v1/object/public/page-images/My%20File.png"),
            Some("My File.png".to_string())
        );
        assert_eq!(
            parse_public_url(URL),
            Some(("page-images".to_string(), "News/a.jpg".to_string()))
        );
    }

    #[test]
    fn test_extract_file_path_rejects_other_shapes() {
        assert_eq!(extract_file_path("https://example.com/images/a.jpg"), None);
        assert_eq!(extract_file_path("/storage/v1/object/public/page-images/a.jpg"), None);
        assert_eq!(extract_file_path("https://x.co/storage/v1/object/public/page-images/"), None);
        assert_eq!(extract_file_path("https://x.co/storage/v1/object/public/"), None);
        assert_eq!(extract_file_path("not a url"), None);
    }

    #[test]
    fn test_collect_public_urls_walks_nested_data() {
        let data = json!({
            "imageUrl": URL,
            "items": [{"src": URL}, {"src": "https://example.com/x.png"}],
            "title": "x"
        });
        let mut urls = Vec::new();
        collect_public_urls(&data, &mut urls);
        assert_eq!(urls, vec![(URL.to_string(), "page-images".to_string())]);
    }

    async fn setup() -> (AssetResolver, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_sqlite_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (AssetResolver::new(ctx.file_mappings()), dir)
    }

    #[tokio::test]
    async fn test_update_segment_mapping_is_idempotent() {
        let (assets, _dir) = setup().await;
        assets.update_segment_mapping(URL, 5, "page-images").await.unwrap();
        let mapping = assets.update_segment_mapping(URL, 5, "page-images").await.unwrap();
        assert_eq!(mapping.segment_ids, vec!["5".to_string()]);

        let stored = assets.mapping_for(URL, "page-images").await.unwrap().unwrap();
        assert_eq!(stored.segment_ids, vec!["5".to_string()]);
    }

    #[tokio::test]
    async fn test_fan_in_and_removal_keeps_row() {
        let (assets, _dir) = setup().await;
        assets.update_segment_mapping(URL, 1, "page-images").await.unwrap();
        assets.update_segment_mapping(URL, 2, "page-images").await.unwrap();

        assert!(assets.remove_segment_reference(URL, 1, "page-images").await.unwrap());
        assert!(assets.remove_segment_reference(URL, 2, "page-images").await.unwrap());
        assert!(!assets.remove_segment_reference(URL, 2, "page-images").await.unwrap());

        let stored = assets.mapping_for(URL, "page-images").await.unwrap().unwrap();
        assert!(stored.segment_ids.is_empty());
    }

    #[tokio::test]
    async fn test_load_alt_text_fallbacks() {
        let (assets, _dir) = setup().await;
        assert_eq!(assets.load_alt_text(URL, "page-images", Language::De).await, "");
        assert_eq!(assets.load_alt_text("garbage", "page-images", Language::De).await, "");

        assets
            .set_alt_text(URL, "page-images", Language::En, "Camera")
            .await
            .unwrap();
        assert_eq!(assets.load_alt_text(URL, "page-images", Language::De).await, "Camera");

        assets
            .set_alt_text(URL, "page-images", Language::De, "Kamera")
            .await
            .unwrap();
        assert_eq!(assets.load_alt_text(URL, "page-images", Language::De).await, "Kamera");
        assert_eq!(assets.load_alt_text(URL, "other-bucket", Language::De).await, "");
    }

    #[tokio::test]
    async fn test_unsupported_url_is_an_error() {
        let (assets, _dir) = setup().await;
        let err = assets
            .update_segment_mapping("https://example.com/a.jpg", 1, "page-images")
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::UnsupportedUrl(_)));
    }
}
