//! Durable key-value store backed by SQLite
//!
//! One table, one row per key, values kept as JSON text. Blocking rusqlite
//! calls run on the blocking thread pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dulynoted_core::KeyValueStore;
use dulynoted_domain::{DulyNotedError, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tokio::task;
use tracing::info;

use crate::errors::conversions::to_domain;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS kv_store (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);";

const DEFAULT_POOL_SIZE: u32 = 4;

/// [`KeyValueStore`] persisted in a SQLite file
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: Arc<Pool<SqliteConnectionManager>>,
    path: PathBuf,
}

impl SqliteKeyValueStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    /// `Storage` when the file cannot be opened or the schema created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_pool_size(path, DEFAULT_POOL_SIZE)
    }

    pub fn open_with_pool_size<P: AsRef<Path>>(path: P, pool_size: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                DulyNotedError::Storage(format!(
                    "cannot create storage directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let manager = SqliteConnectionManager::file(&path).with_init(|conn| {
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
        });
        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager).map_err(to_domain)?;

        pool.get().map_err(to_domain)?.execute_batch(SCHEMA_SQL).map_err(to_domain)?;

        info!(path = %path.display(), max_connections = pool_size.max(1), "Key-value store opened");
        Ok(Self { pool: Arc::new(pool), path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        task::spawn_blocking(move || -> Result<T> {
            let mut conn = pool.get().map_err(to_domain)?;
            op(&mut *conn)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let key = key.to_string();
        self.blocking(move |conn| {
            let raw: Option<String> = conn
                .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(to_domain)?;

            raw.map(|text| {
                serde_json::from_str(&text).map_err(|err| {
                    DulyNotedError::Storage(format!("stored value for {key} is not JSON: {err}"))
                })
            })
            .transpose()
        })
        .await
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.blocking(move |conn| {
            let now = Utc::now().timestamp_millis();
            let tx = conn.transaction().map_err(to_domain)?;
            {
                let mut stmt = tx
                    .prepare_cached(
                        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                        updated_at = excluded.updated_at",
                    )
                    .map_err(to_domain)?;
                for (key, value) in &entries {
                    stmt.execute(params![key, value.to_string(), now]).map_err(to_domain)?;
                }
            }
            tx.commit().map_err(to_domain)
        })
        .await
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let keys = keys.to_vec();
        self.blocking(move |conn| {
            let tx = conn.transaction().map_err(to_domain)?;
            {
                let mut stmt =
                    tx.prepare_cached("DELETE FROM kv_store WHERE key = ?1").map_err(to_domain)?;
                for key in &keys {
                    stmt.execute(params![key]).map_err(to_domain)?;
                }
            }
            tx.commit().map_err(to_domain)
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.blocking(|conn| {
            let mut stmt =
                conn.prepare("SELECT key FROM kv_store ORDER BY key").map_err(to_domain)?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0)).map_err(to_domain)?;
            rows.collect::<std::result::Result<Vec<_>, _>>().map_err(to_domain)
        })
        .await
    }
}

fn map_join_error(err: task::JoinError) -> DulyNotedError {
    if err.is_cancelled() {
        DulyNotedError::Internal("blocking key-value store task cancelled".into())
    } else {
        DulyNotedError::Internal(format!("blocking key-value store task failed: {err}"))
    }
}
