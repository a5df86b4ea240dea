//! Page editing: adding, hiding and removing segments, raw row writes and
//! migration of legacy flat hero rows.
//!
//! Edits work on the raw JSON blobs so fields the pipeline does not know
//! about survive a round trip.

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::assembler::snake_to_camel;
use super::assets::collect_public_urls;
use super::{AssetResolver, ContentError, PageAssembler, SegmentRegistry};
use crate::models::{
    ContentType, Language, PageContent, Segment, SegmentId, PAGE_SEGMENTS_KEY, TAB_ORDER_KEY,
};
use crate::render::SegmentKind;
use crate::repository::{DbContext, DieselPageContentRepository};

/// Editor over a page's stored blobs.
#[derive(Clone)]
pub struct PageEditor {
    pages: DieselPageContentRepository,
    registry: SegmentRegistry,
    assets: AssetResolver,
    assembler: PageAssembler,
}

impl PageEditor {
    pub fn new(ctx: &DbContext) -> Self {
        Self {
            pages: ctx.pages(),
            registry: SegmentRegistry::new(ctx.registry()),
            assets: AssetResolver::new(ctx.file_mappings()),
            assembler: PageAssembler::new(ctx.pages()),
        }
    }

    pub fn registry(&self) -> &SegmentRegistry {
        &self.registry
    }

    /// Append a new segment to a page and make it visible.
    ///
    /// Image URLs found in `data` are linked to the new segment; linking
    /// failures are logged and do not fail the edit.
    pub async fn add_segment(
        &self,
        page_slug: &str,
        language: Language,
        segment_type: &str,
        data: Value,
    ) -> Result<Segment, ContentError> {
        if SegmentKind::parse(segment_type).is_none() {
            return Err(ContentError::UnknownSegmentType(segment_type.to_string()));
        }

        let (mut segments, mut order) = self.load_editable(page_slug, language).await?;
        let entry = self.registry.allocate(page_slug, segment_type).await?;
        let segment = Segment::new(entry.segment_id, segment_type, data);

        segments.push(json!({
            "id": segment.id,
            "type": segment.segment_type,
            "data": segment.data,
        }));
        order.push(Value::String(segment.order_key()));
        self.save_blobs(page_slug, language, segments, order).await?;

        self.link_images(&segment).await;
        info!(
            "Added {} segment {} to {} ({})",
            segment_type, segment.id, page_slug, language
        );
        Ok(segment)
    }

    /// Remove a segment from the render order only. Returns whether it was visible.
    pub async fn hide_segment(
        &self,
        page_slug: &str,
        language: Language,
        segment_id: SegmentId,
    ) -> Result<bool, ContentError> {
        let (segments, mut order) = self.load_editable(page_slug, language).await?;
        let before = order.len();
        order.retain(|entry| !order_entry_is(entry, segment_id));
        if order.len() == before {
            return Ok(false);
        }

        self.save_blobs(page_slug, language, segments, order).await?;
        info!("Hid segment {} on {} ({})", segment_id, page_slug, language);
        Ok(true)
    }

    /// Append a hidden segment back to the render order.
    pub async fn show_segment(
        &self,
        page_slug: &str,
        language: Language,
        segment_id: SegmentId,
    ) -> Result<bool, ContentError> {
        let (segments, mut order) = self.load_editable(page_slug, language).await?;
        if !segments.iter().any(|s| element_id(s) == Some(segment_id)) {
            return Err(ContentError::SegmentNotFound(segment_id));
        }
        if order.iter().any(|entry| order_entry_is(entry, segment_id)) {
            return Ok(false);
        }

        order.push(Value::String(segment_id.to_string()));
        self.save_blobs(page_slug, language, segments, order).await?;
        info!("Showed segment {} on {} ({})", segment_id, page_slug, language);
        Ok(true)
    }

    /// Remove a segment from every language of a page and soft-delete it.
    ///
    /// A segment registered to another page is left alone and reported as
    /// not found. Segments with no registry entry are still removed from
    /// the page's blobs.
    pub async fn remove_segment(
        &self,
        page_slug: &str,
        segment_id: SegmentId,
    ) -> Result<bool, ContentError> {
        let entry = self.registry.get(segment_id).await?;
        if entry.as_ref().is_some_and(|e| e.page_slug != page_slug) {
            return Err(ContentError::SegmentNotFound(segment_id));
        }

        let mut removed = false;
        for language in Language::ALL {
            let Some((mut segments, mut order)) = self.load_stored(page_slug, language).await?
            else {
                continue;
            };

            let before = (segments.len(), order.len());
            segments.retain(|s| element_id(s) != Some(segment_id));
            order.retain(|entry| !order_entry_is(entry, segment_id));
            if before != (segments.len(), order.len()) {
                self.save_blobs(page_slug, language, segments, order).await?;
                removed = true;
            }
        }

        let deleted = match entry {
            Some(_) => self.registry.soft_delete(segment_id).await?,
            None => false,
        };
        Ok(removed || deleted)
    }

    /// Convert legacy `hero_*` rows into a `full-hero` segment shown first.
    ///
    /// Does nothing when the page already has a `full-hero` segment in this
    /// language or has no non-empty hero rows.
    pub async fn migrate_flat_hero(
        &self,
        page_slug: &str,
        language: Language,
    ) -> Result<Option<Segment>, ContentError> {
        let flat = self.assembler.flat_fields(page_slug, language).await?;
        let data: Map<String, Value> = flat
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .filter_map(|(key, value)| {
                key.strip_prefix("hero_")
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (snake_to_camel(rest), Value::String(value.clone())))
            })
            .collect();
        if data.is_empty() {
            return Ok(None);
        }

        let (mut segments, mut order) = self.load_editable(page_slug, language).await?;
        if segments
            .iter()
            .any(|s| s.get("type").and_then(Value::as_str) == Some("full-hero"))
        {
            return Ok(None);
        }

        let entry = self.registry.allocate(page_slug, "full-hero").await?;
        let segment = Segment::new(entry.segment_id, "full-hero", Value::Object(data));
        segments.insert(
            0,
            json!({"id": segment.id, "type": "full-hero", "data": segment.data}),
        );
        order.insert(0, Value::String(segment.order_key()));
        self.save_blobs(page_slug, language, segments, order).await?;

        self.link_images(&segment).await;
        info!(
            "Migrated flat hero of {} ({}) into segment {}",
            page_slug, language, segment.id
        );
        Ok(Some(segment))
    }

    /// Write a raw content row. JSON rows must parse.
    pub async fn set_content(
        &self,
        page_slug: &str,
        section_key: &str,
        language: Language,
        content_type: ContentType,
        value: &str,
    ) -> Result<PageContent, ContentError> {
        let row = match content_type {
            ContentType::Json => {
                let parsed: Value =
                    serde_json::from_str(value).map_err(|source| ContentError::InvalidJson {
                        key: section_key.to_string(),
                        source,
                    })?;
                PageContent::json(page_slug, section_key, language, &parsed)
            }
            ContentType::Text => PageContent::text(page_slug, section_key, language, value),
        };

        self.pages.set(&row).await?;
        info!("Set {}/{} ({})", page_slug, section_key, language);
        Ok(row)
    }

    /// Stored blobs for a language, seeded from English when the language
    /// has no pair of its own.
    async fn load_editable(
        &self,
        page_slug: &str,
        language: Language,
    ) -> Result<(Vec<Value>, Vec<Value>), ContentError> {
        if let Some(pair) = self.load_stored(page_slug, language).await? {
            return Ok(pair);
        }
        if !language.is_canonical() {
            if let Some(pair) = self.load_stored(page_slug, Language::En).await? {
                return Ok(pair);
            }
        }
        Ok((Vec::new(), Vec::new()))
    }

    /// Raw blob arrays of one language. Either blob may be missing; both
    /// missing is `None`. A stored blob that is not a JSON array is an error
    /// so an edit never overwrites content it could not read.
    async fn load_stored(
        &self,
        page_slug: &str,
        language: Language,
    ) -> Result<Option<(Vec<Value>, Vec<Value>)>, ContentError> {
        let segments = self.load_array(page_slug, PAGE_SEGMENTS_KEY, language).await?;
        let order = self.load_array(page_slug, TAB_ORDER_KEY, language).await?;
        if segments.is_none() && order.is_none() {
            return Ok(None);
        }
        Ok(Some((segments.unwrap_or_default(), order.unwrap_or_default())))
    }

    async fn load_array(
        &self,
        page_slug: &str,
        key: &str,
        language: Language,
    ) -> Result<Option<Vec<Value>>, ContentError> {
        let mut row = self
            .pages
            .get(page_slug, key, language, ContentType::Json)
            .await?;
        if row.is_none() {
            row = self
                .pages
                .get(page_slug, key, language, ContentType::Text)
                .await?;
        }
        let Some(row) = row else {
            return Ok(None);
        };

        match row.parse_json() {
            Ok(Value::Array(values)) => Ok(Some(values)),
            Ok(_) => Err(ContentError::InvalidJson {
                key: key.to_string(),
                source: serde::de::Error::custom("expected a JSON array"),
            }),
            Err(source) => Err(ContentError::InvalidJson {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn save_blobs(
        &self,
        page_slug: &str,
        language: Language,
        segments: Vec<Value>,
        order: Vec<Value>,
    ) -> Result<(), ContentError> {
        self.pages
            .set(&PageContent::json(
                page_slug,
                PAGE_SEGMENTS_KEY,
                language,
                &Value::Array(segments),
            ))
            .await?;
        self.pages
            .set(&PageContent::json(
                page_slug,
                TAB_ORDER_KEY,
                language,
                &Value::Array(order),
            ))
            .await?;
        Ok(())
    }

    async fn link_images(&self, segment: &Segment) {
        let mut urls = Vec::new();
        collect_public_urls(&segment.data, &mut urls);
        for (url, bucket) in urls {
            if let Err(e) = self
                .assets
                .update_segment_mapping(&url, segment.id, &bucket)
                .await
            {
                warn!("Could not link {} to segment {}: {}", url, segment.id, e);
            }
        }
    }
}

fn element_id(element: &Value) -> Option<SegmentId> {
    match element.get("id")? {
        Value::Number(n) => n.as_i64().and_then(|n| SegmentId::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn order_entry_is(entry: &Value, segment_id: SegmentId) -> bool {
    match entry {
        Value::String(s) => s.trim() == segment_id.to_string(),
        Value::Number(n) => n.as_i64() == Some(i64::from(segment_id)),
        _ => false,
    }
}
