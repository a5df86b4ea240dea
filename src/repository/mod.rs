//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking.
//! Supports both SQLite and PostgreSQL backends.

pub mod context;
pub mod models;
pub mod pool;

mod file_mapping;
mod page_content;
mod segment_registry;

pub mod util;

pub use context::DbContext;
pub use file_mapping::DieselFileMappingRepository;
pub use page_content::DieselPageContentRepository;
pub use pool::{DbPool, DieselError};
pub use segment_registry::DieselSegmentRegistryRepository;

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}
