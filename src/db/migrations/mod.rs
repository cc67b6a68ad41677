//! Database schema migrations.
//!
//! Migration files are stored in this directory with the naming convention:
//! - `migration_NN_up.sql` - Upgrades schema from version `NN-1` to version `NN`
//! - `migration_NN_down.sql` - Downgrades schema from version `NN` to version `NN-1`

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::Result;

/// The schema version this build of the program expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

struct Migration {
    version: i32,
    up_sql: &'static str,
    down_sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

/// Creates the `schema_version` table if needed and returns the version recorded in it. A fresh
/// database is at version 0.
pub(crate) async fn schema_version(pool: &SqlitePool) -> Result<i32> {
    pool.execute("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .await
        .context("Failed to create schema_version table")?;
    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    Ok(row.0.unwrap_or(0))
}

/// Moves the schema from `from` to `to`, one version at a time, in either direction. Every step
/// runs in its own transaction together with the `schema_version` update, so a failed step leaves
/// the database at the previous version.
pub(crate) async fn run(pool: &SqlitePool, from: i32, to: i32) -> Result<()> {
    if from == to {
        debug!("Database already at version {to}");
        return Ok(());
    }
    let steps: Vec<(&'static str, i32)> = if from < to {
        ((from + 1)..=to)
            .map(|v| find(v).map(|m| (m.up_sql, v)))
            .collect::<Result<_>>()?
    } else {
        ((to + 1)..=from)
            .rev()
            .map(|v| find(v).map(|m| (m.down_sql, v - 1)))
            .collect::<Result<_>>()?
    };

    for (sql, new_version) in steps {
        debug!("Migrating database schema to version {new_version:02}");
        let mut tx = pool
            .begin()
            .await
            .context("Failed to begin migration transaction")?;
        (&mut *tx)
            .execute(sql)
            .await
            .with_context(|| format!("Migration to version {new_version} failed"))?;
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut *tx)
            .await
            .context("Failed to clear schema_version")?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(new_version)
            .execute(&mut *tx)
            .await
            .context("Failed to update schema_version")?;
        tx.commit()
            .await
            .context("Failed to commit migration transaction")?;
    }
    Ok(())
}

fn find(version: i32) -> Result<&'static Migration> {
    match MIGRATIONS.iter().find(|m| m.version == version) {
        Some(m) => Ok(m),
        None => bail!("Migration {version} is missing"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use tempfile::TempDir;

    async fn pool() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("test.sqlite"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        (dir, pool)
    }

    async fn table_exists(pool: &SqlitePool, name: &str) -> bool {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?")
                .bind(name)
                .fetch_one(pool)
                .await
                .unwrap();
        row.0 > 0
    }

    #[tokio::test]
    async fn test_fresh_database_is_version_zero() {
        let (_dir, pool) = pool().await;
        assert_eq!(schema_version(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_up_then_down() {
        let (_dir, pool) = pool().await;
        schema_version(&pool).await.unwrap();

        run(&pool, 0, CURRENT_VERSION).await.unwrap();
        assert_eq!(schema_version(&pool).await.unwrap(), CURRENT_VERSION);
        assert!(table_exists(&pool, "kv_store").await);

        run(&pool, CURRENT_VERSION, 0).await.unwrap();
        assert_eq!(schema_version(&pool).await.unwrap(), 0);
        assert!(!table_exists(&pool, "kv_store").await);
    }

    #[tokio::test]
    async fn test_missing_migration_runs_nothing() {
        let (_dir, pool) = pool().await;
        schema_version(&pool).await.unwrap();

        assert!(run(&pool, 0, CURRENT_VERSION + 1).await.is_err());
        assert_eq!(schema_version(&pool).await.unwrap(), 0);
        assert!(!table_exists(&pool, "kv_store").await);
    }
}
