//! File-segment mapping repository.

use std::collections::BTreeMap;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{FileSegmentMappingRecord, NewFileSegmentMapping};
use super::parse_datetime;
use super::pool::{DbPool, DieselError};
use crate::models::FileSegmentMapping;
use crate::schema::file_segment_mappings;
use crate::with_conn;

/// Convert a database record to a domain model.
///
/// The JSON columns are read leniently: a malformed value is logged and
/// read as empty so one bad row never hides the rest of the mapping.
impl From<FileSegmentMappingRecord> for FileSegmentMapping {
    fn from(record: FileSegmentMappingRecord) -> Self {
        let segment_ids = parse_segment_ids(&record.segment_ids).unwrap_or_else(|e| {
            tracing::warn!(
                "Malformed segment_ids for {}/{}: {}",
                record.bucket_id,
                record.file_path,
                e
            );
            Vec::new()
        });
        let alt_text_translations =
            serde_json::from_str::<BTreeMap<String, String>>(&record.alt_text_translations)
                .unwrap_or_else(|e| {
                    tracing::warn!(
                        "Malformed alt_text_translations for {}/{}: {}",
                        record.bucket_id,
                        record.file_path,
                        e
                    );
                    BTreeMap::new()
                });

        FileSegmentMapping {
            file_path: record.file_path,
            bucket_id: record.bucket_id,
            segment_ids,
            alt_text: record.alt_text,
            alt_text_translations,
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

/// Parse the stored id array. Older rows may hold numbers instead of strings.
fn parse_segment_ids(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

/// Repository for file-segment mappings.
#[derive(Clone)]
pub struct DieselFileMappingRepository {
    pool: DbPool,
}

impl DieselFileMappingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the mapping for a file.
    pub async fn get(
        &self,
        file_path: &str,
        bucket_id: &str,
    ) -> Result<Option<FileSegmentMapping>, DieselError> {
        with_conn!(self.pool, conn, {
            file_segment_mappings::table
                .filter(file_segment_mappings::file_path.eq(file_path))
                .filter(file_segment_mappings::bucket_id.eq(bucket_id))
                .first::<FileSegmentMappingRecord>(&mut conn)
                .await
                .optional()
                .map(|opt| opt.map(FileSegmentMapping::from))
        })
    }

    /// Insert or update a mapping.
    pub async fn save(&self, mapping: &FileSegmentMapping) -> Result<(), DieselError> {
        let segment_ids =
            serde_json::to_string(&mapping.segment_ids).unwrap_or_else(|_| "[]".to_string());
        let translations = serde_json::to_string(&mapping.alt_text_translations)
            .unwrap_or_else(|_| "{}".to_string());
        let updated_at = mapping.updated_at.to_rfc3339();
        let new = NewFileSegmentMapping {
            file_path: &mapping.file_path,
            bucket_id: &mapping.bucket_id,
            segment_ids: &segment_ids,
            alt_text: mapping.alt_text.as_deref(),
            alt_text_translations: &translations,
            updated_at: &updated_at,
        };

        with_conn!(self.pool, conn, {
            diesel::insert_into(file_segment_mappings::table)
                .values(&new)
                .on_conflict((
                    file_segment_mappings::file_path,
                    file_segment_mappings::bucket_id,
                ))
                .do_update()
                .set((
                    file_segment_mappings::segment_ids.eq(new.segment_ids),
                    file_segment_mappings::alt_text.eq(new.alt_text),
                    file_segment_mappings::alt_text_translations.eq(new.alt_text_translations),
                    file_segment_mappings::updated_at.eq(new.updated_at),
                ))
                .execute(&mut conn)
                .await?;
            Ok(())
        })
    }

    /// All mappings in a bucket, by path.
    pub async fn list_for_bucket(
        &self,
        bucket_id: &str,
    ) -> Result<Vec<FileSegmentMapping>, DieselError> {
        with_conn!(self.pool, conn, {
            file_segment_mappings::table
                .filter(file_segment_mappings::bucket_id.eq(bucket_id))
                .order(file_segment_mappings::file_path.asc())
                .load::<FileSegmentMappingRecord>(&mut conn)
                .await
                .map(|records| records.into_iter().map(FileSegmentMapping::from).collect())
        })
    }

    /// Delete a mapping row.
    pub async fn delete(&self, file_path: &str, bucket_id: &str) -> Result<bool, DieselError> {
        with_conn!(self.pool, conn, {
            let rows = diesel::delete(
                file_segment_mappings::table
                    .filter(file_segment_mappings::file_path.eq(file_path))
                    .filter(file_segment_mappings::bucket_id.eq(bucket_id)),
            )
            .execute(&mut conn)
            .await?;
            Ok(rows > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::repository::DbContext;
    use tempfile::tempdir;

    async fn setup() -> (DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_sqlite_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (ctx, dir)
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let (ctx, _dir) = setup().await;
        let repo = ctx.file_mappings();

        let mut mapping = FileSegmentMapping::new("News/a.jpg", "page-images");
        mapping.add_segment(3);
        mapping.set_alt_text(Language::En, "A camera");
        repo.save(&mapping).await.unwrap();

        let fetched = repo.get("News/a.jpg", "page-images").await.unwrap().unwrap();
        assert_eq!(fetched.segment_ids, vec!["3".to_string()]);
        assert_eq!(fetched.resolve_alt_text(Language::Ko), "A camera");
        assert!(repo.get("News/a.jpg", "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_upserts_on_path_and_bucket() {
        let (ctx, _dir) = setup().await;
        let repo = ctx.file_mappings();

        let mut mapping = FileSegmentMapping::new("a.png", "page-images");
        repo.save(&mapping).await.unwrap();
        mapping.add_segment(8);
        repo.save(&mapping).await.unwrap();

        let all = repo.list_for_bucket("page-images").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].segment_ids, vec!["8".to_string()]);

        assert!(repo.delete("a.png", "page-images").await.unwrap());
        assert!(repo.list_for_bucket("page-images").await.unwrap().is_empty());
    }

    #[test]
    fn test_parse_segment_ids_accepts_numbers() {
        assert_eq!(
            parse_segment_ids(r#"["1", 2]"#).unwrap(),
            vec!["1".to_string(), "2".to_string()]
        );
        assert!(parse_segment_ids("not json").is_err());
    }
}
