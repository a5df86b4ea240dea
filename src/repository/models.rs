//! Diesel ORM models for database tables.
//!
//! Records mirror table rows exactly; conversion to domain models lives in
//! the repository modules.

use diesel::prelude::*;

use crate::schema;

/// Page content record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::page_content)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PageContentRecord {
    pub id: i32,
    pub page_slug: String,
    pub section_key: String,
    pub language: String,
    pub content_type: String,
    pub content_value: String,
    pub updated_at: String,
}

/// New page content row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::page_content)]
pub struct NewPageContent<'a> {
    pub page_slug: &'a str,
    pub section_key: &'a str,
    pub language: &'a str,
    pub content_type: &'a str,
    pub content_value: &'a str,
    pub updated_at: &'a str,
}

/// Segment registry record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::segment_registry)]
#[diesel(primary_key(segment_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SegmentRegistryRecord {
    pub segment_id: i32,
    pub page_slug: String,
    pub segment_type: String,
    pub segment_key: String,
    pub is_static: bool,
    pub deleted: bool,
    pub created_at: String,
}

/// New registry entry for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::segment_registry)]
pub struct NewSegmentRegistryEntry<'a> {
    pub segment_id: i32,
    pub page_slug: &'a str,
    pub segment_type: &'a str,
    pub segment_key: &'a str,
    pub is_static: bool,
    pub deleted: bool,
    pub created_at: &'a str,
}

/// File-segment mapping record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::file_segment_mappings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FileSegmentMappingRecord {
    pub id: i32,
    pub file_path: String,
    pub bucket_id: String,
    /// JSON array of segment id strings.
    pub segment_ids: String,
    pub alt_text: Option<String>,
    /// JSON object of language code to alt text.
    pub alt_text_translations: String,
    pub updated_at: String,
}

/// New file-segment mapping for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::file_segment_mappings)]
pub struct NewFileSegmentMapping<'a> {
    pub file_path: &'a str,
    pub bucket_id: &'a str,
    pub segment_ids: &'a str,
    pub alt_text: Option<&'a str>,
    pub alt_text_translations: &'a str,
    pub updated_at: &'a str,
}
