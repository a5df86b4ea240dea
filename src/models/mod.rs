//! Data models for sitecms.

mod file_mapping;
mod language;
mod page_content;
mod registry;
mod segment;

pub use file_mapping::FileSegmentMapping;
pub use language::Language;
pub use page_content::{ContentType, PageContent, PAGE_SEGMENTS_KEY, TAB_ORDER_KEY};
pub use registry::RegistryEntry;
pub use segment::{Segment, SegmentId};
