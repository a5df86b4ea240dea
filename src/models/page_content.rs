//! Page content rows: flat scalar values and JSON blobs keyed by page and language.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Language;

/// Reserved section key holding the page's segment array.
pub const PAGE_SEGMENTS_KEY: &str = "page_segments";

/// Reserved section key holding the page's render order (array of id strings).
pub const TAB_ORDER_KEY: &str = "tab_order";

/// How `content_value` should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Json,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// A single content row for a page section in one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageContent {
    /// Hierarchical page path (`products/cameras`).
    pub page_slug: String,
    /// Section key (`hero_title`, `page_segments`, ...).
    pub section_key: String,
    pub language: Language,
    pub content_type: ContentType,
    /// Raw value; JSON-encoded when `content_type` is `Json`.
    pub content_value: String,
    pub updated_at: DateTime<Utc>,
}

impl PageContent {
    /// Create a plain text row.
    pub fn text(page_slug: &str, section_key: &str, language: Language, value: &str) -> Self {
        Self {
            page_slug: page_slug.to_string(),
            section_key: section_key.to_string(),
            language,
            content_type: ContentType::Text,
            content_value: value.to_string(),
            updated_at: Utc::now(),
        }
    }

    /// Create a JSON row from a value.
    pub fn json(page_slug: &str, section_key: &str, language: Language, value: &Value) -> Self {
        Self {
            page_slug: page_slug.to_string(),
            section_key: section_key.to_string(),
            language,
            content_type: ContentType::Json,
            content_value: value.to_string(),
            updated_at: Utc::now(),
        }
    }

    /// Decode the value as JSON.
    pub fn parse_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.content_value)
    }

    /// Whether the value is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.content_value.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_row_round_trips_value() {
        let row = PageContent::json("home", TAB_ORDER_KEY, Language::En, &json!(["1", "2"]));
        assert_eq!(row.content_type, ContentType::Json);
        assert_eq!(row.parse_json().unwrap(), json!(["1", "2"]));
    }

    #[test]
    fn test_blank_detection() {
        assert!(PageContent::text("home", "hero_title", Language::En, "  ").is_blank());
        assert!(!PageContent::text("home", "hero_title", Language::En, "Hi").is_blank());
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!(ContentType::from_str("json"), Some(ContentType::Json));
        assert_eq!(ContentType::from_str("text"), Some(ContentType::Text));
        assert_eq!(ContentType::from_str("html"), None);
    }
}
