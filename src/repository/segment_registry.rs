//! Segment registry repository.
//!
//! Ids come from the `segment_sequence` counter. Allocation increments the
//! counter in place as the first statement of its transaction, so concurrent
//! allocators queue on the counter row instead of reading the same value.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::{NewSegmentRegistryEntry, SegmentRegistryRecord};
use super::parse_datetime;
use super::pool::{DbPool, DieselError};
use crate::models::{RegistryEntry, SegmentId};
use crate::schema::{segment_registry, segment_sequence};
use crate::with_conn;

/// Name of the sequence row that feeds segment ids.
const SEGMENT_SEQUENCE: &str = "segment_id";

impl From<SegmentRegistryRecord> for RegistryEntry {
    fn from(record: SegmentRegistryRecord) -> Self {
        RegistryEntry {
            segment_id: record.segment_id,
            page_slug: record.page_slug,
            segment_type: record.segment_type,
            segment_key: record.segment_key,
            is_static: record.is_static,
            deleted: record.deleted,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Repository for segment identity.
#[derive(Clone)]
pub struct DieselSegmentRegistryRepository {
    pool: DbPool,
}

impl DieselSegmentRegistryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Allocate a new segment id and record its registry entry.
    ///
    /// The counter is advanced past both its own last value and the largest
    /// registered id, so registries imported without a counter stay unique.
    pub async fn allocate(
        &self,
        page_slug: &str,
        segment_type: &str,
        is_static: bool,
    ) -> Result<RegistryEntry, DieselError> {
        let page_slug = page_slug.to_string();
        let segment_type = segment_type.to_string();

        with_conn!(self.pool, conn, {
            conn.transaction(|conn| {
                let page_slug = page_slug.clone();
                let segment_type = segment_type.clone();
                Box::pin(async move {
                    // The increment comes first so the sequence row is locked
                    // (Postgres) or the write lock taken (SQLite) before any read.
                    diesel::insert_into(segment_sequence::table)
                        .values((
                            segment_sequence::name.eq(SEGMENT_SEQUENCE),
                            segment_sequence::last_value.eq(1),
                        ))
                        .on_conflict(segment_sequence::name)
                        .do_update()
                        .set(segment_sequence::last_value.eq(segment_sequence::last_value + 1))
                        .execute(conn)
                        .await?;
                    let mut segment_id: i32 = segment_sequence::table
                        .find(SEGMENT_SEQUENCE)
                        .select(segment_sequence::last_value)
                        .first(conn)
                        .await?;

                    let max_id: Option<i32> = segment_registry::table
                        .select(max(segment_registry::segment_id))
                        .first(conn)
                        .await?;
                    if let Some(max_id) = max_id.filter(|m| *m >= segment_id) {
                        segment_id = max_id + 1;
                        diesel::update(segment_sequence::table.find(SEGMENT_SEQUENCE))
                            .set(segment_sequence::last_value.eq(segment_id))
                            .execute(conn)
                            .await?;
                    }

                    let prior: i64 = segment_registry::table
                        .filter(segment_registry::page_slug.eq(&page_slug))
                        .filter(segment_registry::segment_type.eq(&segment_type))
                        .count()
                        .get_result(conn)
                        .await?;

                    let segment_key = RegistryEntry::segment_key_for(&segment_type, prior + 1);
                    let created_at = Utc::now();
                    let created_at_str = created_at.to_rfc3339();

                    diesel::insert_into(segment_registry::table)
                        .values(&NewSegmentRegistryEntry {
                            segment_id,
                            page_slug: &page_slug,
                            segment_type: &segment_type,
                            segment_key: &segment_key,
                            is_static,
                            deleted: false,
                            created_at: &created_at_str,
                        })
                        .execute(conn)
                        .await?;

                    Ok::<_, DieselError>(RegistryEntry {
                        segment_id,
                        page_slug,
                        segment_type,
                        segment_key,
                        is_static,
                        deleted: false,
                        created_at,
                    })
                })
            })
            .await
        })
    }

    /// Get an entry by id, deleted or not.
    pub async fn get(&self, segment_id: SegmentId) -> Result<Option<RegistryEntry>, DieselError> {
        with_conn!(self.pool, conn, {
            segment_registry::table
                .find(segment_id)
                .first::<SegmentRegistryRecord>(&mut conn)
                .await
                .optional()
                .map(|opt| opt.map(RegistryEntry::from))
        })
    }

    /// Mark an entry deleted. Returns whether a live entry was affected.
    pub async fn soft_delete(&self, segment_id: SegmentId) -> Result<bool, DieselError> {
        with_conn!(self.pool, conn, {
            let rows = diesel::update(
                segment_registry::table
                    .find(segment_id)
                    .filter(segment_registry::deleted.eq(false)),
            )
            .set(segment_registry::deleted.eq(true))
            .execute(&mut conn)
            .await?;
            Ok(rows > 0)
        })
    }

    /// All entries of a page, including deleted ones, by id.
    pub async fn list_for_page(&self, page_slug: &str) -> Result<Vec<RegistryEntry>, DieselError> {
        with_conn!(self.pool, conn, {
            segment_registry::table
                .filter(segment_registry::page_slug.eq(page_slug))
                .order(segment_registry::segment_id.asc())
                .load::<SegmentRegistryRecord>(&mut conn)
                .await
                .map(|records| records.into_iter().map(RegistryEntry::from).collect())
        })
    }

    /// Map of segment key to id over live entries of a page.
    pub async fn lookup(&self, page_slug: &str) -> Result<BTreeMap<String, SegmentId>, DieselError> {
        with_conn!(self.pool, conn, {
            segment_registry::table
                .filter(segment_registry::page_slug.eq(page_slug))
                .filter(segment_registry::deleted.eq(false))
                .select((segment_registry::segment_key, segment_registry::segment_id))
                .load::<(String, i32)>(&mut conn)
                .await
                .map(|rows| rows.into_iter().collect())
        })
    }

    /// Ids of every soft-deleted segment.
    pub async fn deleted_ids(&self) -> Result<HashSet<SegmentId>, DieselError> {
        with_conn!(self.pool, conn, {
            segment_registry::table
                .filter(segment_registry::deleted.eq(true))
                .select(segment_registry::segment_id)
                .load::<i32>(&mut conn)
                .await
                .map(|ids| ids.into_iter().collect())
        })
    }
}
