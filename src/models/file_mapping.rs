//! File to segment mappings: alt text and segment backreferences for stored files.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Language, SegmentId};

/// Metadata attached to a stored file, keyed by `(file_path, bucket_id)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSegmentMapping {
    pub file_path: String,
    pub bucket_id: String,
    /// Ids (as strings) of segments referencing this file, in insertion order.
    pub segment_ids: Vec<String>,
    /// Legacy single-language alt text.
    pub alt_text: Option<String>,
    /// Alt text per language code.
    pub alt_text_translations: BTreeMap<String, String>,
    pub updated_at: DateTime<Utc>,
}

impl FileSegmentMapping {
    /// Create an empty mapping for a file.
    pub fn new(file_path: &str, bucket_id: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            bucket_id: bucket_id.to_string(),
            segment_ids: Vec::new(),
            alt_text: None,
            alt_text_translations: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Record a segment reference. Returns false if it was already present.
    pub fn add_segment(&mut self, segment_id: SegmentId) -> bool {
        if self.references(segment_id) {
            return false;
        }
        self.segment_ids.push(segment_id.to_string());
        self.updated_at = Utc::now();
        true
    }

    /// Drop a segment reference. The mapping itself is kept even when empty.
    pub fn remove_segment(&mut self, segment_id: SegmentId) -> bool {
        let key = segment_id.to_string();
        let before = self.segment_ids.len();
        self.segment_ids.retain(|id| *id != key);
        let removed = self.segment_ids.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Whether the given segment references this file.
    pub fn references(&self, segment_id: SegmentId) -> bool {
        let key = segment_id.to_string();
        self.segment_ids.iter().any(|id| *id == key)
    }

    /// Whether any referencing segment is still live.
    ///
    /// Ids that fail to parse count as live; they cannot be checked against
    /// the registry and are never treated as orphaned.
    pub fn has_live_reference(&self, deleted: &HashSet<SegmentId>) -> bool {
        self.segment_ids
            .iter()
            .any(|id| id.parse::<SegmentId>().map_or(true, |id| !deleted.contains(&id)))
    }

    /// Set the alt text for one language.
    pub fn set_alt_text(&mut self, language: Language, text: &str) {
        self.alt_text_translations
            .insert(language.as_str().to_string(), text.to_string());
        self.updated_at = Utc::now();
    }

    /// Resolve alt text for a language.
    ///
    /// Order: the requested language, English, the legacy field, then empty.
    /// Blank values are skipped.
    pub fn resolve_alt_text(&self, language: Language) -> String {
        language
            .fallback_chain()
            .iter()
            .filter_map(|lang| self.alt_text_translations.get(lang.as_str()))
            .chain(self.alt_text.as_ref())
            .find(|text| !text.trim().is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> FileSegmentMapping {
        FileSegmentMapping::new("News/a.jpg", "page-images")
    }

    #[test]
    fn test_add_segment_is_idempotent() {
        let mut m = mapping();
        assert!(m.add_segment(5));
        assert!(!m.add_segment(5));
        assert_eq!(m.segment_ids, vec!["5".to_string()]);
    }

    #[test]
    fn test_fan_in_keeps_order() {
        let mut m = mapping();
        m.add_segment(9);
        m.add_segment(2);
        assert_eq!(m.segment_ids, vec!["9".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_remove_segment_keeps_mapping() {
        let mut m = mapping();
        m.add_segment(1);
        assert!(m.remove_segment(1));
        assert!(!m.remove_segment(1));
        assert!(m.segment_ids.is_empty());
    }

    #[test]
    fn test_alt_text_requested_language_wins() {
        let mut m = mapping();
        m.set_alt_text(Language::De, "Kamera");
        m.set_alt_text(Language::En, "Camera");
        assert_eq!(m.resolve_alt_text(Language::De), "Kamera");
    }

    #[test]
    fn test_alt_text_falls_back_to_english() {
        let mut m = mapping();
        m.set_alt_text(Language::En, "Camera");
        assert_eq!(m.resolve_alt_text(Language::De), "Camera");
    }

    #[test]
    fn test_alt_text_falls_back_to_legacy() {
        let mut m = mapping();
        m.alt_text = Some("X".to_string());
        assert_eq!(m.resolve_alt_text(Language::De), "X");
    }

    #[test]
    fn test_alt_text_empty_when_nothing_present() {
        assert_eq!(mapping().resolve_alt_text(Language::Ko), "");
    }

    #[test]
    fn test_blank_translation_is_skipped() {
        let mut m = mapping();
        m.set_alt_text(Language::Ja, "  ");
        m.set_alt_text(Language::En, "Sensor");
        assert_eq!(m.resolve_alt_text(Language::Ja), "Sensor");
    }

    #[test]
    fn test_live_reference_detection() {
        let mut m = mapping();
        m.add_segment(3);
        m.add_segment(4);
        let deleted: HashSet<SegmentId> = [3].into_iter().collect();
        assert!(m.has_live_reference(&deleted));
        let deleted: HashSet<SegmentId> = [3, 4].into_iter().collect();
        assert!(!m.has_live_reference(&deleted));
    }
}
