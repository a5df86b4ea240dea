//! Page content repository.
//!
//! Rows are keyed by `(page_slug, section_key, language, content_type)`.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewPageContent, PageContentRecord};
use super::parse_datetime;
use super::pool::{DbPool, DieselError};
use crate::models::{ContentType, Language, PageContent};
use crate::schema::page_content;
use crate::with_conn;

impl TryFrom<PageContentRecord> for PageContent {
    type Error = DieselError;

    fn try_from(record: PageContentRecord) -> Result<Self, Self::Error> {
        let language = Language::from_str(&record.language).ok_or_else(|| {
            DieselError::DeserializationError(
                format!("unknown language '{}'", record.language).into(),
            )
        })?;

        Ok(PageContent {
            page_slug: record.page_slug,
            section_key: record.section_key,
            language,
            content_type: ContentType::from_str(&record.content_type).unwrap_or_default(),
            content_value: record.content_value,
            updated_at: parse_datetime(&record.updated_at),
        })
    }
}

/// Repository for page content rows.
#[derive(Clone)]
pub struct DieselPageContentRepository {
    pool: DbPool,
}

impl DieselPageContentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a single row.
    pub async fn get(
        &self,
        page_slug: &str,
        section_key: &str,
        language: Language,
        content_type: ContentType,
    ) -> Result<Option<PageContent>, DieselError> {
        with_conn!(self.pool, conn, {
            page_content::table
                .filter(page_content::page_slug.eq(page_slug))
                .filter(page_content::section_key.eq(section_key))
                .filter(page_content::language.eq(language.as_str()))
                .filter(page_content::content_type.eq(content_type.as_str()))
                .first::<PageContentRecord>(&mut conn)
                .await
                .optional()
                .and_then(|opt| opt.map(PageContent::try_from).transpose())
        })
    }

    /// All rows of a page in one language, ordered by section key.
    pub async fn list_for_page(
        &self,
        page_slug: &str,
        language: Language,
    ) -> Result<Vec<PageContent>, DieselError> {
        with_conn!(self.pool, conn, {
            page_content::table
                .filter(page_content::page_slug.eq(page_slug))
                .filter(page_content::language.eq(language.as_str()))
                .order(page_content::section_key.asc())
                .load::<PageContentRecord>(&mut conn)
                .await
                .and_then(|records| records.into_iter().map(PageContent::try_from).collect())
        })
    }

    /// Distinct page slugs with any stored content.
    pub async fn list_page_slugs(&self) -> Result<Vec<String>, DieselError> {
        with_conn!(self.pool, conn, {
            page_content::table
                .select(page_content::page_slug)
                .distinct()
                .order(page_content::page_slug.asc())
                .load::<String>(&mut conn)
                .await
        })
    }

    /// Every stored row, across pages and languages.
    pub async fn list_all(&self) -> Result<Vec<PageContent>, DieselError> {
        with_conn!(self.pool, conn, {
            page_content::table
                .order((page_content::page_slug.asc(), page_content::section_key.asc()))
                .load::<PageContentRecord>(&mut conn)
                .await
                .and_then(|records| records.into_iter().map(PageContent::try_from).collect())
        })
    }

    /// Insert or update a row.
    pub async fn set(&self, content: &PageContent) -> Result<(), DieselError> {
        let updated_at = content.updated_at.to_rfc3339();
        let new = NewPageContent {
            page_slug: &content.page_slug,
            section_key: &content.section_key,
            language: content.language.as_str(),
            content_type: content.content_type.as_str(),
            content_value: &content.content_value,
            updated_at: &updated_at,
        };

        with_conn!(self.pool, conn, {
            diesel::insert_into(page_content::table)
                .values(&new)
                .on_conflict((
                    page_content::page_slug,
                    page_content::section_key,
                    page_content::language,
                    page_content::content_type,
                ))
                .do_update()
                .set((
                    page_content::content_value.eq(new.content_value),
                    page_content::updated_at.eq(new.updated_at),
                ))
                .execute(&mut conn)
                .await?;
            Ok(())
        })
    }

    /// Delete a row. Returns whether anything was removed.
    pub async fn delete(
        &self,
        page_slug: &str,
        section_key: &str,
        language: Language,
        content_type: ContentType,
    ) -> Result<bool, DieselError> {
        with_conn!(self.pool, conn, {
            let rows = diesel::delete(
                page_content::table
                    .filter(page_content::page_slug.eq(page_slug))
                    .filter(page_content::section_key.eq(section_key))
                    .filter(page_content::language.eq(language.as_str()))
                    .filter(page_content::content_type.eq(content_type.as_str())),
            )
            .execute(&mut conn)
            .await?;
            Ok(rows > 0)
        })
    }
}
