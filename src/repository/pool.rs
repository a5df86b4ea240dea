//! Connection pool for the content database.
//!
//! SQLite is the default backend; a `postgres://` URL selects PostgreSQL when
//! the `postgres` feature is compiled in. Repositories reach a connection
//! through [`with_conn!`](crate::with_conn).

use std::path::Path;

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};

#[cfg(feature = "postgres")]
use diesel_async::pooled_connection::deadpool::Pool as DeadPool;
#[cfg(feature = "postgres")]
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
#[cfg(feature = "postgres")]
use diesel_async::AsyncPgConnection;

use super::util::{is_postgres_url, to_diesel_error};

/// Diesel error type alias.
pub type DieselError = diesel::result::Error;

/// Async SQLite connection type.
pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

/// Async PostgreSQL connection type.
#[cfg(feature = "postgres")]
pub type PgConn = deadpool::managed::Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Milliseconds a SQLite writer waits on a locked database before failing.
const SQLITE_BUSY_TIMEOUT_MS: u32 = 5_000;

/// SQLite "pool": one connection per operation, opened on demand.
#[derive(Clone, Debug)]
pub struct SqlitePool {
    path: String,
}

impl SqlitePool {
    /// Accepts a file path or a `sqlite:`-prefixed URL.
    pub fn new(database_url: &str) -> Self {
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        Self {
            path: path.to_string(),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(&path.display().to_string())
    }

    /// Open a connection. Concurrent editors share the file, so writers
    /// wait on each other instead of failing with "database is locked".
    pub async fn get(&self) -> Result<SqliteConn, DieselError> {
        let mut conn = SqliteConn::establish(&self.path)
            .await
            .map_err(to_diesel_error)?;
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", SQLITE_BUSY_TIMEOUT_MS))
            .await?;
        Ok(conn)
    }
}

/// PostgreSQL connection pool.
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct PgPool {
    pool: DeadPool<AsyncPgConnection>,
}

#[cfg(feature = "postgres")]
impl PgPool {
    pub fn new(database_url: &str, max_size: usize) -> Result<Self, DieselError> {
        let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = DeadPool::builder(config)
            .max_size(max_size)
            .build()
            .map_err(to_diesel_error)?;
        Ok(Self { pool })
    }

    pub async fn get(&self) -> Result<PgConn, DieselError> {
        self.pool.get().await.map_err(to_diesel_error)
    }
}

/// Pool over whichever backend holds the site content.
#[derive(Clone)]
pub enum DbPool {
    Sqlite(SqlitePool),
    #[cfg(feature = "postgres")]
    Postgres(PgPool),
}

impl DbPool {
    /// `postgres://` and `postgresql://` URLs select PostgreSQL; anything
    /// else is a SQLite path.
    pub fn from_url(url: &str) -> Result<Self, DieselError> {
        if is_postgres_url(url) {
            #[cfg(feature = "postgres")]
            {
                return Ok(DbPool::Postgres(PgPool::new(url, 10)?));
            }
            #[cfg(not(feature = "postgres"))]
            {
                return Err(DieselError::QueryBuilderError(
                    "PostgreSQL support not compiled. Use --features postgres".into(),
                ));
            }
        }

        Ok(DbPool::Sqlite(SqlitePool::new(url)))
    }

    pub fn sqlite_from_path(path: &Path) -> Self {
        DbPool::Sqlite(SqlitePool::from_path(path))
    }

    pub fn is_sqlite(&self) -> bool {
        matches!(self, DbPool::Sqlite(_))
    }

    /// Backend name for logging.
    pub fn backend_name(&self) -> &'static str {
        match self {
            DbPool::Sqlite(_) => "sqlite",
            #[cfg(feature = "postgres")]
            DbPool::Postgres(_) => "postgres",
        }
    }
}

/// Run a block against a connection from either backend.
///
/// ```ignore
/// with_conn!(self.pool, conn, {
///     page_content::table.load::<PageContentRecord>(&mut conn).await
/// })
/// ```
#[macro_export]
macro_rules! with_conn {
    ($pool:expr, $conn:ident, $body:expr) => {{
        match &$pool {
            $crate::repository::pool::DbPool::Sqlite(pool) => {
                #[allow(unused_mut)]
                let mut $conn = pool.get().await?;
                $body
            }
            #[cfg(feature = "postgres")]
            $crate::repository::pool::DbPool::Postgres(pool) => {
                #[allow(unused_mut)]
                let mut $conn = pool.get().await?;
                $body
            }
        }
    }};
}

/// Like [`with_conn!`] with a separate body per backend, for schema SQL.
#[macro_export]
macro_rules! with_conn_split {
    ($pool:expr, sqlite: $sqlite_conn:ident => $sqlite_body:expr, postgres: $pg_conn:ident => $pg_body:expr) => {{
        match &$pool {
            $crate::repository::pool::DbPool::Sqlite(pool) => {
                #[allow(unused_mut)]
                let mut $sqlite_conn = pool.get().await?;
                $sqlite_body
            }
            #[cfg(feature = "postgres")]
            $crate::repository::pool::DbPool::Postgres(pool) => {
                #[allow(unused_mut)]
                let mut $pg_conn = pool.get().await?;
                $pg_body
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_detection() {
        assert!(DbPool::from_url("/srv/site/sitecms.db").unwrap().is_sqlite());
        assert!(DbPool::from_url("sqlite:/srv/site/sitecms.db").unwrap().is_sqlite());

        #[cfg(feature = "postgres")]
        assert_eq!(
            DbPool::from_url("postgres://localhost/site").unwrap().backend_name(),
            "postgres"
        );
        #[cfg(not(feature = "postgres"))]
        assert!(DbPool::from_url("postgres://localhost/site").is_err());
    }

    #[test]
    fn test_sqlite_prefix_stripped() {
        let pool = SqlitePool::new("sqlite:/tmp/site.db");
        assert_eq!(pool.path, "/tmp/site.db");
    }
}
