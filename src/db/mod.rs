//! This module is responsible for reading, writing and managing the SQLite database that stands
//! in for the browser's local storage: a flat table of string keys and string values.

mod migrations;

use crate::Result;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Creates the SQLite file at `path` if it does not exist yet
    /// - Brings the schema up to date
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(path.as_ref(), true).await
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Brings the schema up to date if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!(
                "The SQLite database is missing '{}', run 'finn init' first",
                path.display()
            );
        }
        Self::connect(path, false).await
    }

    /// An in-memory database, gone when the last handle is dropped.
    #[cfg(test)]
    pub(crate) async fn memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        Self::from_options(options).await
    }

    async fn connect(path: &Path, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create);
        debug!("Opening SQLite database at {}", path.display());
        Self::from_options(options)
            .await
            .with_context(|| format!("Unable to open {}", path.display()))
    }

    async fn from_options(options: SqliteConnectOptions) -> Result<Self> {
        // One connection keeps an in-memory database alive and serializes writers.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite")?;
        let version = migrations::schema_version(&pool).await?;
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    /// Returns the value stored under `key`.
    pub(crate) async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read '{key}'"))?;
        match row {
            Some(row) => Ok(Some(
                row.try_get::<String, _>("value")
                    .with_context(|| format!("The value stored under '{key}' is not text"))?,
            )),
            None => Ok(None),
        }
    }

    /// Writes all `entries` in a single transaction.
    pub(crate) async fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin write")?;
        for (key, value) in entries {
            sqlx::query(
                "INSERT INTO kv_store (key, value) VALUES (?, ?) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')",
            )
            .bind(*key)
            .bind(*value)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to write '{key}'"))?;
        }
        tx.commit().await.context("Failed to commit write")
    }

    /// Deletes all `keys` in a single transaction. Missing keys are not an error.
    pub(crate) async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin delete")?;
        for key in keys {
            sqlx::query("DELETE FROM kv_store WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to delete '{key}'"))?;
        }
        tx.commit().await.context("Failed to commit delete")
    }
}
