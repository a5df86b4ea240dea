//! Segment kinds and their typed data contracts.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of renderable segment types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    FullHero,
    Banner,
    Text,
    ImageText,
    Faq,
    Table,
    Video,
    Specification,
    NewsList,
    Debug,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 10] = [
        Self::FullHero,
        Self::Banner,
        Self::Text,
        Self::ImageText,
        Self::Faq,
        Self::Table,
        Self::Video,
        Self::Specification,
        Self::NewsList,
        Self::Debug,
    ];

    /// Parse a stored type tag.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag.trim())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullHero => "full-hero",
            Self::Banner => "banner",
            Self::Text => "text",
            Self::ImageText => "image-text",
            Self::Faq => "faq",
            Self::Table => "table",
            Self::Video => "video",
            Self::Specification => "specification",
            Self::NewsList => "news-list",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroData {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BannerData {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextData {
    pub title: Option<String>,
    /// Plain text; blank lines separate paragraphs.
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageTextData {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    /// `left` or `right` (default).
    pub image_position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqData {
    #[serde(default)]
    pub title: Option<String>,
    pub items: Vec<FaqItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    #[serde(default)]
    pub title: Option<String>,
    pub headers: Vec<String>,
    /// Rows are rendered as given; lengths are not checked against `headers`.
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoData {
    #[serde(default)]
    pub title: Option<String>,
    pub video_url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecItem {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecificationData {
    pub title: Option<String>,
    pub product_name: Option<String>,
    pub image_url: Option<String>,
    pub items: Vec<SpecItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsItem {
    pub title: String,
    pub date: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsListData {
    pub title: Option<String>,
    pub items: Vec<NewsItem>,
}

/// A segment's data checked against its kind's contract.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentBody {
    FullHero(HeroData),
    Banner(BannerData),
    Text(TextData),
    ImageText(ImageTextData),
    Faq(FaqData),
    Table(TableData),
    Video(VideoData),
    Specification(SpecificationData),
    NewsList(NewsListData),
    Debug(Value),
}

impl SegmentBody {
    /// Check `data` against the contract for `kind`.
    ///
    /// Missing data is read as an empty object, so kinds without required
    /// fields accept it.
    pub fn parse(kind: SegmentKind, data: &Value) -> Result<Self, serde_json::Error> {
        let data = match data {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };

        Ok(match kind {
            SegmentKind::FullHero => Self::FullHero(serde_json::from_value(data)?),
            SegmentKind::Banner => Self::Banner(serde_json::from_value(data)?),
            SegmentKind::Text => Self::Text(serde_json::from_value(data)?),
            SegmentKind::ImageText => Self::ImageText(serde_json::from_value(data)?),
            SegmentKind::Faq => Self::Faq(serde_json::from_value(data)?),
            SegmentKind::Table => Self::Table(serde_json::from_value(data)?),
            SegmentKind::Video => Self::Video(serde_json::from_value(data)?),
            SegmentKind::Specification => Self::Specification(serde_json::from_value(data)?),
            SegmentKind::NewsList => Self::NewsList(serde_json::from_value(data)?),
            SegmentKind::Debug => Self::Debug(data),
        })
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::FullHero(_) => SegmentKind::FullHero,
            Self::Banner(_) => SegmentKind::Banner,
            Self::Text(_) => SegmentKind::Text,
            Self::ImageText(_) => SegmentKind::ImageText,
            Self::Faq(_) => SegmentKind::Faq,
            Self::Table(_) => SegmentKind::Table,
            Self::Video(_) => SegmentKind::Video,
            Self::Specification(_) => SegmentKind::Specification,
            Self::NewsList(_) => SegmentKind::NewsList,
            Self::Debug(_) => SegmentKind::Debug,
        }
    }

    /// Image URLs that need alt text.
    pub fn image_urls(&self) -> Vec<&str> {
        let urls: Vec<Option<&String>> = match self {
            Self::FullHero(d) => vec![d.image_url.as_ref()],
            Self::Banner(d) => vec![d.image_url.as_ref()],
            Self::ImageText(d) => vec![d.image_url.as_ref()],
            Self::Specification(d) => vec![d.image_url.as_ref()],
            Self::NewsList(d) => d.items.iter().map(|i| i.image_url.as_ref()).collect(),
            Self::Text(_) | Self::Faq(_) | Self::Table(_) | Self::Video(_) | Self::Debug(_) => {
                Vec::new()
            }
        };
        urls.into_iter()
            .flatten()
            .map(String::as_str)
            .filter(|u| !u.trim().is_empty())
            .collect()
    }
}
