//! SQLite-backed queue storage.
//!
//! One key-value table holds the whole queue snapshot as a JSON blob:
//!
//! ```text
//! offline_state (key TEXT PRIMARY KEY, value TEXT NOT NULL)
//! ```
//!
//! The pool is initialized lazily on first use so constructing the storage
//! never touches the filesystem.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::queue::QueueSnapshot;
use crate::storage::{QueueStorage, StorageError};

const STATE_KEY: &str = "offline_queue";

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// SQLite-backed [`QueueStorage`].
///
/// Cheap to clone; clones share the same pool.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: Arc<tokio::sync::Mutex<Option<SqlitePool>>>,
    location: Location,
}

impl SqliteStorage {
    /// Storage at the per-user default location,
    /// `{app_data_dir}/scanventory/offline.db`.
    pub fn at_default_path() -> anyhow::Result<Self> {
        Ok(Self::at_path(offline_db_path()?))
    }

    /// Storage at an explicit database file path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            pool: Arc::new(tokio::sync::Mutex::new(None)),
            location: Location::File(path.into()),
        }
    }

    /// Ephemeral in-memory storage. Data lives as long as this instance.
    pub fn in_memory() -> Self {
        Self {
            pool: Arc::new(tokio::sync::Mutex::new(None)),
            location: Location::Memory,
        }
    }

    /// Get the pool, initializing it on first use.
    async fn pool(&self) -> anyhow::Result<SqlitePool> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        let options = match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create offline storage directory at {parent:?}")
                    })?;
                }
                SqliteConnectOptions::new().filename(path).create_if_missing(true)
            }
            Location::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .context("failed to build in-memory sqlite options")?,
        };

        // `sqlite::memory:` gives every connection its own database, so the
        // pool is capped at a single connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open offline storage ({:?})", self.location))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS offline_state (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        )
        .execute(&pool)
        .await
        .context("failed to create offline_state table")?;

        *guard = Some(pool.clone());
        Ok(pool)
    }
}

#[async_trait]
impl QueueStorage for SqliteStorage {
    async fn load(&self) -> Result<Option<QueueSnapshot>, StorageError> {
        let pool = self
            .pool()
            .await
            .map_err(|err| StorageError::persistence(format!("{err:#}")))?;

        let row = sqlx::query("SELECT value FROM offline_state WHERE key = ?1")
            .bind(STATE_KEY)
            .fetch_optional(&pool)
            .await
            .map_err(StorageError::persistence)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row.try_get("value").map_err(StorageError::persistence)?;
        let snapshot = serde_json::from_str(&value).map_err(StorageError::serialization)?;
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &QueueSnapshot) -> Result<(), StorageError> {
        let value = serde_json::to_string(snapshot).map_err(StorageError::serialization)?;
        let pool = self
            .pool()
            .await
            .map_err(|err| StorageError::persistence(format!("{err:#}")))?;

        sqlx::query(
            "INSERT INTO offline_state (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(STATE_KEY)
        .bind(value)
        .execute(&pool)
        .await
        .map_err(StorageError::persistence)?;
        Ok(())
    }
}

/// Resolve the default database path, creating the app data directory if
/// needed.
fn offline_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory")?;

    let mut dir = base;
    dir.push("scanventory");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create app data directory at {dir:?}"))?;

    dir.push("offline.db");
    Ok(dir)
}
