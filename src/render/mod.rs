//! Segment rendering.
//!
//! Each segment's type tag is parsed into a [`SegmentKind`] and its data into
//! the matching [`SegmentBody`]. Unknown tags and data that breaks its
//! contract render nothing.

mod head;
mod html;
mod segments;

pub use head::{DocumentHead, HeadScriptGuard, FAQ_SCRIPT_ID, PRODUCT_SCRIPT_ID};
pub use html::{fallback_body, render_document, render_segment, AltTexts, PageDocument};
pub use segments::{
    BannerData, FaqData, FaqItem, HeroData, ImageTextData, NewsItem, NewsListData, SegmentBody,
    SegmentKind, SpecItem, SpecificationData, TableData, TextData, VideoData,
};

use futures::future::join_all;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::content::{parse_public_url, AssetResolver};
use crate::models::{Language, Segment, SegmentId};

/// Rendered page fragments.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// JSON-LD scripts for the document head.
    pub head_html: String,
    /// Segment sections in render order.
    pub body_html: String,
    /// Number of segments that produced output.
    pub rendered: usize,
}

/// Parse a segment into its typed body, or `None` when it cannot render.
pub fn parse_body(segment: &Segment) -> Option<SegmentBody> {
    let Some(kind) = SegmentKind::parse(&segment.segment_type) else {
        warn!(
            "Segment {} has unknown type '{}', skipping",
            segment.id, segment.segment_type
        );
        return None;
    };

    match SegmentBody::parse(kind, &segment.data) {
        Ok(body) => Some(body),
        Err(e) => {
            warn!("Segment {} ({}) has invalid data: {}", segment.id, kind, e);
            None
        }
    }
}

/// JSON-LD for bodies that publish structured data.
fn structured_data(body: &SegmentBody) -> Option<(&'static str, Value)> {
    match body {
        SegmentBody::Faq(faq) if !faq.items.is_empty() => Some((
            FAQ_SCRIPT_ID,
            json!({
                "@context": "https://schema.org",
                "@type": "FAQPage",
                "mainEntity": faq.items.iter().map(|item| json!({
                    "@type": "Question",
                    "name": item.question,
                    "acceptedAnswer": {"@type": "Answer", "text": item.answer},
                })).collect::<Vec<_>>(),
            }),
        )),
        SegmentBody::Specification(spec) => {
            let name = spec.product_name.as_ref().or(spec.title.as_ref())?;
            let mut product = json!({
                "@context": "https://schema.org",
                "@type": "Product",
                "name": name,
                "additionalProperty": spec.items.iter().map(|i| json!({
                    "@type": "PropertyValue",
                    "name": i.label,
                    "value": i.value,
                })).collect::<Vec<_>>(),
            });
            if let Some(image) = &spec.image_url {
                product["image"] = Value::String(image.clone());
            }
            Some((PRODUCT_SCRIPT_ID, product))
        }
        _ => None,
    }
}

/// Renders assembled segments, resolving image alt text first.
#[derive(Clone)]
pub struct Renderer {
    assets: AssetResolver,
    bucket: String,
}

impl Renderer {
    pub fn new(assets: AssetResolver, bucket: &str) -> Self {
        Self {
            assets,
            bucket: bucket.to_string(),
        }
    }

    /// Look up alt text for every image concurrently. Each image is looked
    /// up in the bucket named by its URL, or the default bucket when the URL
    /// names none.
    pub async fn resolve_alt_texts(
        &self,
        bodies: &[(SegmentId, SegmentBody)],
        language: Language,
    ) -> AltTexts {
        let mut urls: Vec<&str> = bodies
            .iter()
            .flat_map(|(_, body)| body.image_urls())
            .collect();
        urls.sort_unstable();
        urls.dedup();

        let lookups = urls.iter().map(|url| async move {
            let bucket = parse_public_url(url).map(|(bucket, _)| bucket);
            let bucket = bucket.as_deref().unwrap_or(&self.bucket);
            let alt = self.assets.load_alt_text(url, bucket, language).await;
            (url.to_string(), alt)
        });
        let alts: AltTexts = join_all(lookups).await.into_iter().collect();
        debug!("Resolved {} alt texts", alts.len());
        alts
    }

    /// Render segments in order into head and body fragments.
    ///
    /// Structured data scripts live only while the page is being rendered;
    /// the head is captured before their guards are released.
    pub async fn render_page(&self, segments: &[Segment], language: Language) -> RenderedPage {
        let bodies: Vec<(SegmentId, SegmentBody)> = segments
            .iter()
            .filter_map(|s| parse_body(s).map(|body| (s.id, body)))
            .collect();
        let alts = self.resolve_alt_texts(&bodies, language).await;

        let head = DocumentHead::new();
        let mut guards = Vec::new();
        let mut body_html = String::new();
        for (id, body) in &bodies {
            if let Some((script_id, data)) = structured_data(body) {
                guards.push(head.inject(script_id, &data));
            }
            body_html.push_str(&render_segment(*id, body, &alts, language));
            body_html.push('\n');
        }

        let page = RenderedPage {
            head_html: head.render(),
            body_html,
            rendered: bodies.len(),
        };
        drop(guards);
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DbContext;
    use tempfile::tempdir;

    const IMAGE: &str = "http://localhost/storage/v1/object/public/page-images/a.jpg";

    async fn setup() -> (Renderer, AssetResolver, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_sqlite_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        let assets = AssetResolver::new(ctx.file_mappings());
        (Renderer::new(assets.clone(), "page-images"), assets, dir)
    }

    #[test]
    fn test_unknown_type_renders_nothing() {
        let segment = Segment::new(1, "carousel", json!({"slides": []}));
        assert!(parse_body(&segment).is_none());
    }

    #[test]
    fn test_contract_violation_renders_nothing() {
        let segment = Segment::new(1, "video", json!({"title": "no url"}));
        assert!(parse_body(&segment).is_none());
    }

    #[tokio::test]
    async fn test_render_page_skips_bad_segments() {
        let (renderer, _assets, _dir) = setup().await;
        let segments = vec![
            Segment::new(1, "text", json!({"body": "first"})),
            Segment::new(2, "mystery", json!({})),
            Segment::new(3, "faq", json!({"items": "wrong"})),
            Segment::new(4, "text", json!({"body": "last"})),
        ];

        let page = renderer.render_page(&segments, Language::En).await;
        assert_eq!(page.rendered, 2);
        assert!(page.body_html.contains(r#"id="segment-1""#));
        assert!(page.body_html.contains(r#"id="segment-4""#));
        assert!(!page.body_html.contains("segment-2"));
        assert!(page.head_html.is_empty());
    }

    #[tokio::test]
    async fn test_structured_data_one_per_feature() {
        let (renderer, _assets, _dir) = setup().await;
        let segments = vec![
            Segment::new(1, "faq", json!({"items": [{"question": "Q1", "answer": "A1"}]})),
            Segment::new(2, "faq", json!({"items": [{"question": "Q2", "answer": "A2"}]})),
            Segment::new(
                3,
                "specification",
                json!({"productName": "X100", "items": [{"label": "Weight", "value": "1kg"}]}),
            ),
        ];

        let page = renderer.render_page(&segments, Language::En).await;
        assert_eq!(page.head_html.matches(FAQ_SCRIPT_ID).count(), 1);
        assert_eq!(page.head_html.matches(PRODUCT_SCRIPT_ID).count(), 1);
        assert!(page.head_html.contains("Q2"));
        assert!(page.head_html.contains("X100"));
    }

    #[tokio::test]
    async fn test_alt_text_is_resolved_for_images() {
        let (renderer, assets, _dir) = setup().await;
        assets
            .set_alt_text(IMAGE, "page-images", Language::En, "A lens")
            .await
            .unwrap();

        let segments = vec![
            Segment::new(1, "image-text", json!({"imageUrl": IMAGE})),
            Segment::new(2, "banner", json!({"imageUrl": IMAGE})),
        ];
        let page = renderer.render_page(&segments, Language::Ja).await;
        assert_eq!(page.body_html.matches(r#"alt="A lens""#).count(), 2);
    }

    #[tokio::test]
    async fn test_alt_text_uses_bucket_from_url() {
        let (renderer, assets, _dir) = setup().await;
        let news = "http://localhost/storage/v1/object/public/news-images/launch.jpg";
        assets
            .set_alt_text(news, "news-images", Language::En, "Launch event")
            .await
            .unwrap();

        let segments = vec![Segment::new(1, "banner", json!({"imageUrl": news}))];
        let page = renderer.render_page(&segments, Language::En).await;
        assert!(page.body_html.contains(r#"alt="Launch event""#));
    }
}
