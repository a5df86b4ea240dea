//! Database context for managing connections and repository access.
//!
//! The DbContext is the primary entry point for all database operations.
//! It holds the connection pool and hands out repositories that share it.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::file_mapping::DieselFileMappingRepository;
use super::page_content::DieselPageContentRepository;
use super::pool::{DbPool, DieselError};
use super::segment_registry::DieselSegmentRegistryRepository;

/// Database context that manages the connection pool and provides repository access.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("sqlite:/srv/site/sitecms.db")?;
/// let rows = ctx.pages().list_for_page("home", Language::En).await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: DbPool,
}

impl DbContext {
    /// Create a context from a database URL.
    ///
    /// Supports:
    /// - SQLite: file paths or `sqlite:` URLs
    /// - PostgreSQL: `postgres://` or `postgresql://` URLs
    pub fn from_url(url: &str) -> Result<Self, DieselError> {
        Ok(Self {
            pool: DbPool::from_url(url)?,
        })
    }

    /// Create a context from a SQLite file path.
    pub fn from_sqlite_path(path: &Path) -> Self {
        Self {
            pool: DbPool::sqlite_from_path(path),
        }
    }

    /// Wrap an existing pool.
    pub fn with_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Page content rows.
    pub fn pages(&self) -> DieselPageContentRepository {
        DieselPageContentRepository::new(self.pool.clone())
    }

    /// Segment identity registry.
    pub fn registry(&self) -> DieselSegmentRegistryRepository {
        DieselSegmentRegistryRepository::new(self.pool.clone())
    }

    /// File-segment mappings.
    pub fn file_mappings(&self) -> DieselFileMappingRepository {
        DieselFileMappingRepository::new(self.pool.clone())
    }

    /// Open a connection to verify the database is reachable.
    pub async fn test_connection(&self) -> Result<(), DieselError> {
        crate::with_conn!(self.pool, conn, { conn.batch_execute("SELECT 1").await })
    }

    /// Create tables if they do not exist.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        tracing::debug!("Initializing {} schema", self.pool.backend_name());
        crate::with_conn_split!(self.pool,
            sqlite: conn => {
                conn.batch_execute(include_str!("schema_sqlite.sql")).await
            },
            postgres: conn => {
                init_postgres_schema(&mut conn).await
            }
        )
    }
}

/// PostgreSQL needs statements executed separately.
#[cfg(feature = "postgres")]
async fn init_postgres_schema(conn: &mut super::pool::PgConn) -> Result<(), DieselError> {
    use diesel_async::RunQueryDsl;

    for stmt in include_str!("schema_postgres.sql").split(';') {
        let stmt: String = stmt
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        if !stmt.trim().is_empty() {
            diesel::sql_query(stmt).execute(&mut **conn).await?;
        }
    }
    Ok(())
}
