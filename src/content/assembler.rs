//! Page assembly: `page_segments` + `tab_order` + localized overlays.
//!
//! `tab_order` is the only source of render order. A segment missing from
//! it is hidden, and an order entry without a matching segment is skipped.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::ContentError;
use crate::models::{
    ContentType, Language, PageContent, Segment, PAGE_SEGMENTS_KEY, TAB_ORDER_KEY,
};
use crate::repository::DieselPageContentRepository;

/// Flat section-key prefixes that overlay the first segment of a type.
const LEGACY_PREFIXES: &[(&str, &str)] = &[("full-hero", "hero_"), ("banner", "banner_")];

/// Parse a `page_segments` blob.
///
/// Returns `None` when the blob is not a JSON array. Elements that do not
/// parse as segments are logged and dropped individually.
pub fn parse_segments(raw: &str) -> Option<Vec<Segment>> {
    let values = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => values,
        Ok(other) => {
            warn!("page_segments is not an array (got {})", json_kind(&other));
            return None;
        }
        Err(e) => {
            warn!("Malformed page_segments JSON: {}", e);
            return None;
        }
    };

    Some(
        values
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match serde_json::from_value::<Segment>(value) {
                Ok(segment) => Some(segment),
                Err(e) => {
                    warn!("Skipping malformed segment at index {}: {}", i, e);
                    None
                }
            })
            .collect(),
    )
}

/// Parse a `tab_order` blob into id strings. Numeric entries are accepted.
pub fn parse_tab_order(raw: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => Some(
            values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
        ),
        Ok(other) => {
            warn!("tab_order is not an array (got {})", json_kind(&other));
            None
        }
        Err(e) => {
            warn!("Malformed tab_order JSON: {}", e);
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Build the ordered, localized segment list for one language.
///
/// `flat` holds the language's plain text rows by section key; legacy
/// prefixed rows are merged into the first segment of the matching type.
pub fn assemble_segments(
    segments: &[Segment],
    tab_order: &[String],
    flat: &BTreeMap<String, String>,
    language: Language,
) -> Vec<Segment> {
    let mut seen = HashSet::new();
    let mut overlaid = HashSet::new();
    let mut out = Vec::with_capacity(tab_order.len());

    for entry in tab_order {
        if !seen.insert(entry.as_str()) {
            continue;
        }
        let Some(segment) = segments.iter().find(|s| s.matches_order_entry(entry)) else {
            debug!("tab_order entry {} has no segment", entry);
            continue;
        };

        let mut data = localize(&segment.data, language);
        if let Some(prefix) = legacy_prefix(&segment.segment_type) {
            if overlaid.insert(segment.segment_type.as_str()) {
                apply_flat_overlay(&mut data, flat, prefix);
            }
        }

        out.push(Segment::new(segment.id, segment.segment_type.clone(), data));
    }

    out
}

fn legacy_prefix(segment_type: &str) -> Option<&'static str> {
    LEGACY_PREFIXES
        .iter()
        .find(|(t, _)| *t == segment_type)
        .map(|(_, prefix)| *prefix)
}

fn is_language_key(key: &str) -> bool {
    Language::ALL.iter().any(|l| l.as_str() == key)
}

/// Resolve per-language overlays stored inside `data`.
///
/// When `data` carries language-code keys holding objects, the result is the
/// non-language fields with the best overlay (`language`, then `en`)
/// shallow-merged on top. Data without such keys is returned unchanged.
pub fn localize(data: &Value, language: Language) -> Value {
    let Value::Object(map) = data else {
        return data.clone();
    };

    let has_overlays = map
        .iter()
        .any(|(k, v)| is_language_key(k) && v.is_object());
    if !has_overlays {
        return data.clone();
    }

    let mut base: Map<String, Value> = map
        .iter()
        .filter(|(k, _)| !is_language_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let overlay = language
        .fallback_chain()
        .into_iter()
        .find_map(|lang| map.get(lang.as_str()).and_then(Value::as_object));

    if let Some(overlay) = overlay {
        for (k, v) in overlay {
            base.insert(k.clone(), v.clone());
        }
    }

    Value::Object(base)
}

/// Merge non-empty `{prefix}{field}` rows into `data` as camelCase fields.
fn apply_flat_overlay(data: &mut Value, flat: &BTreeMap<String, String>, prefix: &str) {
    let fields: Vec<(String, &String)> = flat
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .filter_map(|(key, value)| {
            key.strip_prefix(prefix)
                .filter(|rest| !rest.is_empty())
                .map(|rest| (snake_to_camel(rest), value))
        })
        .collect();
    if fields.is_empty() {
        return;
    }

    if !data.is_object() {
        *data = Value::Object(Map::new());
    }
    if let Value::Object(map) = data {
        for (field, value) in fields {
            map.insert(field, Value::String(value.clone()));
        }
    }
}

/// `image_url` -> `imageUrl`.
pub(crate) fn snake_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for c in s.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Reads page rows and assembles them.
#[derive(Clone)]
pub struct PageAssembler {
    pages: DieselPageContentRepository,
}

impl PageAssembler {
    pub fn new(pages: DieselPageContentRepository) -> Self {
        Self { pages }
    }

    /// Assemble a page for a language.
    ///
    /// A missing or unreadable `page_segments`/`tab_order` pair falls back to
    /// the English pair; a page with neither renders empty.
    pub async fn assemble(
        &self,
        page_slug: &str,
        language: Language,
    ) -> Result<Vec<Segment>, ContentError> {
        let mut pair = self.load_pair(page_slug, language).await?;
        if pair.is_none() && !language.is_canonical() {
            debug!("No {} segments for {}, using en", language, page_slug);
            pair = self.load_pair(page_slug, Language::En).await?;
        }

        let Some((segments, tab_order)) = pair else {
            debug!("Page {} has no segments", page_slug);
            return Ok(Vec::new());
        };

        let flat = self.flat_fields(page_slug, language).await?;
        Ok(assemble_segments(&segments, &tab_order, &flat, language))
    }

    /// Plain text rows of a page, excluding the reserved blob keys.
    pub async fn flat_fields(
        &self,
        page_slug: &str,
        language: Language,
    ) -> Result<BTreeMap<String, String>, ContentError> {
        let rows = self.pages.list_for_page(page_slug, language).await?;
        Ok(rows
            .into_iter()
            .filter(|row| row.content_type == ContentType::Text)
            .filter(|row| row.section_key != PAGE_SEGMENTS_KEY && row.section_key != TAB_ORDER_KEY)
            .map(|row| (row.section_key, row.content_value))
            .collect())
    }

    async fn load_pair(
        &self,
        page_slug: &str,
        language: Language,
    ) -> Result<Option<(Vec<Segment>, Vec<String>)>, ContentError> {
        let segments = self
            .load_blob(page_slug, PAGE_SEGMENTS_KEY, language)
            .await?
            .and_then(|row| parse_segments(&row.content_value));
        let tab_order = self
            .load_blob(page_slug, TAB_ORDER_KEY, language)
            .await?
            .and_then(|row| parse_tab_order(&row.content_value));

        Ok(segments.zip(tab_order))
    }

    /// Blob rows are written as JSON, but older rows may be typed as text.
    async fn load_blob(
        &self,
        page_slug: &str,
        key: &str,
        language: Language,
    ) -> Result<Option<PageContent>, ContentError> {
        if let Some(row) = self
            .pages
            .get(page_slug, key, language, ContentType::Json)
            .await?
        {
            return Ok(Some(row));
        }
        Ok(self
            .pages
            .get(page_slug, key, language, ContentType::Text)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DbContext;
    use serde_json::json;
    use tempfile::tempdir;

    fn seg(id: i32, t: &str, data: Value) -> Segment {
        Segment::new(id, t, data)
    }

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn ids(segments: &[Segment]) -> Vec<i32> {
        segments.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_tab_order_decides_order() {
        let segments = vec![seg(1, "text", json!({})), seg(3, "faq", json!({}))];
        let out = assemble_segments(&segments, &order(&["3", "1"]), &BTreeMap::new(), Language::En);
        assert_eq!(ids(&out), vec![3, 1]);
    }

    #[test]
    fn test_segment_missing_from_order_is_hidden() {
        let segments = vec![
            seg(1, "text", json!({})),
            seg(2, "text", json!({})),
            seg(3, "text", json!({})),
        ];
        let out = assemble_segments(&segments, &order(&["1", "3"]), &BTreeMap::new(), Language::En);
        assert_eq!(ids(&out), vec![1, 3]);
    }

    #[test]
    fn test_unknown_order_entries_and_duplicates_skipped() {
        let segments = vec![seg(1, "text", json!({}))];
        let out = assemble_segments(
            &segments,
            &order(&["9", "1", "1"]),
            &BTreeMap::new(),
            Language::En,
        );
        assert_eq!(ids(&out), vec![1]);
    }

    #[test]
    fn test_flat_value_overrides_blob() {
        let segments = vec![seg(1, "full-hero", json!({"title": "B"}))];
        let flat: BTreeMap<String, String> =
            [("hero_title".to_string(), "A".to_string())].into_iter().collect();
        let out = assemble_segments(&segments, &order(&["1"]), &flat, Language::En);
        assert_eq!(out[0].data["title"], "A");
    }

    #[test]
    fn test_empty_flat_value_keeps_blob() {
        let segments = vec![seg(1, "full-hero", json!({"title": "B"}))];
        let flat: BTreeMap<String, String> =
            [("hero_title".to_string(), "".to_string())].into_iter().collect();
        let out = assemble_segments(&segments, &order(&["1"]), &flat, Language::En);
        assert_eq!(out[0].data["title"], "B");
    }

    #[test]
    fn test_flat_overlay_preserves_nested_fields() {
        let segments = vec![seg(
            1,
            "banner",
            json!({"title": "Old", "cta": {"label": "Go", "href": "/x"}}),
        )];
        let flat: BTreeMap<String, String> = [
            ("banner_title".to_string(), "New".to_string()),
            ("banner_image_url".to_string(), "https://cdn/x.png".to_string()),
        ]
        .into_iter()
        .collect();
        let out = assemble_segments(&segments, &order(&["1"]), &flat, Language::En);
        assert_eq!(out[0].data["title"], "New");
        assert_eq!(out[0].data["imageUrl"], "https://cdn/x.png");
        assert_eq!(out[0].data["cta"]["href"], "/x");
    }

    #[test]
    fn test_flat_overlay_only_first_of_type() {
        let segments = vec![
            seg(1, "full-hero", json!({"title": "one"})),
            seg(2, "full-hero", json!({"title": "two"})),
        ];
        let flat: BTreeMap<String, String> =
            [("hero_title".to_string(), "flat".to_string())].into_iter().collect();
        let out = assemble_segments(&segments, &order(&["2", "1"]), &flat, Language::En);
        assert_eq!(out[0].data["title"], "flat");
        assert_eq!(out[1].data["title"], "one");
    }

    #[test]
    fn test_localize_overlay() {
        let data = json!({
            "videoUrl": "https://v/1",
            "title": "Hello",
            "de": {"title": "Hallo"},
            "en": {"title": "Hello!"}
        });
        let de = localize(&data, Language::De);
        assert_eq!(de["title"], "Hallo");
        assert_eq!(de["videoUrl"], "https://v/1");
        assert!(de.get("de").is_none());

        let ko = localize(&data, Language::Ko);
        assert_eq!(ko["title"], "Hello!");
    }

    #[test]
    fn test_localize_leaves_plain_data() {
        let data = json!({"title": "x", "en": "not an overlay"});
        assert_eq!(localize(&data, Language::Zh), data);
    }

    #[test]
    fn test_parse_blobs_tolerate_bad_input() {
        assert!(parse_segments("{not json").is_none());
        assert!(parse_segments(r#"{"id": 1}"#).is_none());

        let parsed =
            parse_segments(r#"[{"id": 1, "type": "text"}, {"type": "faq"}, {"id": "2", "type": "faq"}]"#)
                .unwrap();
        assert_eq!(ids(&parsed), vec![1, 2]);

        assert_eq!(parse_tab_order(r#"["1", 2, null]"#).unwrap(), order(&["1", "2"]));
        assert!(parse_tab_order("nope").is_none());
    }

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("image_url"), "imageUrl");
        assert_eq!(snake_to_camel("cta_button_text"), "ctaButtonText");
        assert_eq!(snake_to_camel("title"), "title");
    }

    async fn setup() -> (DbContext, PageAssembler, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_sqlite_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        let assembler = PageAssembler::new(ctx.pages());
        (ctx, assembler, dir)
    }

    #[tokio::test]
    async fn test_assemble_from_store() {
        let (ctx, assembler, _dir) = setup().await;
        let pages = ctx.pages();
        pages
            .set(&PageContent::json(
                "home",
                PAGE_SEGMENTS_KEY,
                Language::En,
                &json!([
                    {"id": 1, "type": "full-hero", "data": {"title": "B"}},
                    {"id": 3, "type": "text", "data": {"body": "x"}}
                ]),
            ))
            .await
            .unwrap();
        pages
            .set(&PageContent::json("home", TAB_ORDER_KEY, Language::En, &json!(["3", "1"])))
            .await
            .unwrap();
        pages
            .set(&PageContent::text("home", "hero_title", Language::En, "A"))
            .await
            .unwrap();

        let out = assembler.assemble("home", Language::En).await.unwrap();
        assert_eq!(ids(&out), vec![3, 1]);
        assert_eq!(out[1].data["title"], "A");
    }

    #[tokio::test]
    async fn test_missing_language_pair_falls_back_to_en() {
        let (ctx, assembler, _dir) = setup().await;
        let pages = ctx.pages();
        pages
            .set(&PageContent::json(
                "about",
                PAGE_SEGMENTS_KEY,
                Language::En,
                &json!([{"id": 5, "type": "text", "data": {}}]),
            ))
            .await
            .unwrap();
        pages
            .set(&PageContent::json("about", TAB_ORDER_KEY, Language::En, &json!(["5"])))
            .await
            .unwrap();
        // Only half of the ja pair exists.
        pages
            .set(&PageContent::json("about", TAB_ORDER_KEY, Language::Ja, &json!([])))
            .await
            .unwrap();

        let out = assembler.assemble("about", Language::Ja).await.unwrap();
        assert_eq!(ids(&out), vec![5]);
    }

    #[tokio::test]
    async fn test_empty_page_and_malformed_blob() {
        let (ctx, assembler, _dir) = setup().await;
        assert!(assembler.assemble("nothing", Language::En).await.unwrap().is_empty());

        let pages = ctx.pages();
        pages
            .set(&PageContent::text("broken", PAGE_SEGMENTS_KEY, Language::En, "[{oops"))
            .await
            .unwrap();
        pages
            .set(&PageContent::json("broken", TAB_ORDER_KEY, Language::En, &json!(["1"])))
            .await
            .unwrap();
        assert!(assembler.assemble("broken", Language::En).await.unwrap().is_empty());
    }
}
