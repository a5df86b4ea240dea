//! Segment descriptors as stored in a page's `page_segments` blob.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Stable numeric identity of a segment, assigned by the segment registry.
pub type SegmentId = i32;

/// A renderable unit of page content.
///
/// `data` is untyped here; its shape depends on `segment_type` and is checked
/// by the renderer when the segment is parsed into a typed body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Registry-assigned id. Stored blobs use either numbers or numeric strings.
    #[serde(deserialize_with = "deserialize_segment_id")]
    pub id: SegmentId,
    /// Type tag (`full-hero`, `faq`, ...).
    #[serde(rename = "type")]
    pub segment_type: String,
    /// Type-specific payload.
    #[serde(default)]
    pub data: Value,
}

impl Segment {
    /// Create a new segment descriptor.
    pub fn new(id: SegmentId, segment_type: impl Into<String>, data: Value) -> Self {
        Self {
            id,
            segment_type: segment_type.into(),
            data,
        }
    }

    /// The id as it appears in a `tab_order` blob.
    pub fn order_key(&self) -> String {
        self.id.to_string()
    }

    /// Whether a `tab_order` entry refers to this segment.
    pub fn matches_order_entry(&self, entry: &str) -> bool {
        self.order_key() == entry.trim()
    }
}

fn deserialize_segment_id<'de, D>(deserializer: D) -> Result<SegmentId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => SegmentId::try_from(n).map_err(D::Error::custom),
        RawId::Text(s) => s.trim().parse::<SegmentId>().map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_numeric_and_string_ids() {
        let seg: Segment =
            serde_json::from_value(json!({"id": 7, "type": "faq", "data": {}})).unwrap();
        assert_eq!(seg.id, 7);

        let seg: Segment =
            serde_json::from_value(json!({"id": "12", "type": "banner"})).unwrap();
        assert_eq!(seg.id, 12);
        assert_eq!(seg.data, Value::Null);
    }

    #[test]
    fn test_rejects_non_numeric_id() {
        let result: Result<Segment, _> =
            serde_json::from_value(json!({"id": "hero", "type": "banner"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_type_field() {
        let seg = Segment::new(3, "table", json!({"headers": []}));
        let value = serde_json::to_value(&seg).unwrap();
        assert_eq!(value["type"], "table");
        assert_eq!(value["id"], 3);
    }

    #[test]
    fn test_matches_order_entry() {
        let seg = Segment::new(42, "text", Value::Null);
        assert!(seg.matches_order_entry("42"));
        assert!(seg.matches_order_entry(" 42 "));
        assert!(!seg.matches_order_entry("4"));
    }
}
