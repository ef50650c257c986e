//! SQLite implementation of the URL store.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Executor, FromRow, Sqlite};
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::entities::{UrlMetadata, UrlRecord};
use crate::domain::error::StoreError;
use crate::domain::repositories::UrlStore;

const SELECT_BY_CODE: &str = "SELECT id, target_url, meta, meta_signature, count, created_at \
     FROM urls WHERE id = ?";

const SELECT_BY_TARGET: &str = "SELECT id, target_url, meta, meta_signature, count, created_at \
     FROM urls WHERE target_url = ? AND meta_signature = ? \
     ORDER BY created_at, rowid LIMIT 1";

/// Row shape of the `urls` table.
#[derive(Debug, FromRow)]
struct UrlRow {
    id: String,
    target_url: String,
    meta: Option<String>,
    meta_signature: String,
    count: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<UrlRow> for UrlRecord {
    type Error = StoreError;

    fn try_from(row: UrlRow) -> Result<Self, Self::Error> {
        let meta = row
            .meta
            .as_deref()
            .map(serde_json::from_str::<UrlMetadata>)
            .transpose()?;

        Ok(UrlRecord {
            code: row.id,
            target_url: row.target_url,
            meta,
            meta_signature: row.meta_signature,
            hit_count: u64::try_from(row.count).unwrap_or(0),
            created_at: row.created_at,
        })
    }
}

/// SQLite repository for link storage and retrieval.
///
/// Creations run inside a transaction and are serialised in-process, so the
/// dedupe check and the insert cannot interleave with another creation.
/// Hit counting is a single `UPDATE ... RETURNING` statement.
pub struct SqliteStore {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl SqliteStore {
    /// Wraps an existing pool. Migrations are not run.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Opens (creating if needed) the database file at `path` and applies migrations.
    ///
    /// Parent directories are created as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the database
    /// cannot be opened, or a migration fails.
    pub async fn connect(path: &Path, max_connections: u32) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        info!(path = %path.display(), "Connected to database");

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Opens a private in-memory database with migrations applied.
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// every SQLite in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Applies embedded migrations from `./migrations`.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn fetch_by_code<'e, E>(executor: E, code: &str) -> Result<Option<UrlRecord>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, UrlRow>(SELECT_BY_CODE)
        .bind(code)
        .fetch_optional(executor)
        .await?
        .map(UrlRecord::try_from)
        .transpose()
}

async fn fetch_by_target<'e, E>(
    executor: E,
    target_url: &str,
    meta_signature: &str,
) -> Result<Option<UrlRecord>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, UrlRow>(SELECT_BY_TARGET)
        .bind(target_url)
        .bind(meta_signature)
        .fetch_optional(executor)
        .await?
        .map(UrlRecord::try_from)
        .transpose()
}

fn encode_meta(meta: Option<&UrlMetadata>) -> Result<Option<String>, StoreError> {
    Ok(meta.map(serde_json::to_string).transpose()?)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

#[async_trait]
impl UrlStore for SqliteStore {
    async fn get(&self, code: &str) -> Result<Option<UrlRecord>, StoreError> {
        fetch_by_code(&self.pool, code).await
    }

    async fn exists(&self, code: &str) -> Result<bool, StoreError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM urls WHERE id = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn find_by_target(
        &self,
        target_url: &str,
        meta_signature: &str,
    ) -> Result<Option<UrlRecord>, StoreError> {
        fetch_by_target(&self.pool, target_url, meta_signature).await
    }

    async fn insert(&self, record: UrlRecord, dedupe: bool) -> Result<UrlRecord, StoreError> {
        let meta = encode_meta(record.meta.as_ref())?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        if dedupe
            && let Some(existing) =
                fetch_by_target(&mut *tx, &record.target_url, &record.meta_signature).await?
        {
            tx.commit().await?;
            return Ok(existing);
        }

        let inserted = sqlx::query(
            "INSERT INTO urls (id, target_url, meta, meta_signature, count, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.code)
        .bind(&record.target_url)
        .bind(meta)
        .bind(&record.meta_signature)
        .bind(i64::try_from(record.hit_count).unwrap_or(i64::MAX))
        .bind(record.created_at)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::AlreadyExists(record.code));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;
        Ok(record)
    }

    async fn put(&self, record: UrlRecord) -> Result<(), StoreError> {
        let meta = encode_meta(record.meta.as_ref())?;

        let _guard = self.write_lock.lock().await;
        sqlx::query(
            "INSERT INTO urls (id, target_url, meta, meta_signature, count, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                 target_url = excluded.target_url, \
                 meta = excluded.meta, \
                 meta_signature = excluded.meta_signature, \
                 count = excluded.count, \
                 created_at = excluded.created_at",
        )
        .bind(&record.code)
        .bind(&record.target_url)
        .bind(meta)
        .bind(&record.meta_signature)
        .bind(i64::try_from(record.hit_count).unwrap_or(i64::MAX))
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn increment_hits(&self, code: &str) -> Result<u64, StoreError> {
        let count: Option<i64> =
            sqlx::query_scalar("UPDATE urls SET count = count + 1 WHERE id = ? RETURNING count")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;

        count
            .map(|c| u64::try_from(c).unwrap_or(0))
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
