//! Database initialization
//!
//! Opens the recipes database, applies connection pragmas and creates the
//! schema. Safe to run against an existing database.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// SQLite busy timeout applied to every pool
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Open the database at `database_url` and create tables if needed
///
/// In-memory URLs get a single, never-recycled connection so every query
/// sees the same database.
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    let in_memory = is_in_memory(database_url);

    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect(database_url)
            .await?
    } else {
        let newly_created = match database_file_path(database_url) {
            Some(path) => {
                // Create parent directory if it doesn't exist
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                !path.exists()
            }
            None => false,
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        if newly_created {
            info!("Initialized new database: {}", database_url);
        } else {
            info!("Opened existing database: {}", database_url);
        }

        // WAL allows concurrent readers with one writer
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await?;

        pool
    };

    let pragma_sql = format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS);
    sqlx::query(&pragma_sql).execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create the recipes table (idempotent)
///
/// Array fields are stored as JSON text. `tag_keys` holds the case-folded
/// tags so tag search runs inside the database.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recipes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',
            tag_keys TEXT NOT NULL DEFAULT '[]',
            ingredients TEXT NOT NULL DEFAULT '[]',
            instructions TEXT NOT NULL DEFAULT '[]',
            published_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_published_at ON recipes(published_at)")
        .execute(pool)
        .await?;

    debug!("Recipes schema ready");
    Ok(())
}

/// Connectivity check: one round trip to the database
pub async fn ping(pool: &SqlitePool) -> Result<()> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Whether the URL names a private in-memory database
pub fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// File path portion of a `sqlite:` URL, if it names a file
pub fn database_file_path(database_url: &str) -> Option<PathBuf> {
    if is_in_memory(database_url) {
        return None;
    }

    let without_scheme = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = without_scheme.split('?').next().unwrap_or_default();

    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_in_memory_creates_schema() {
        let pool = init_database("sqlite::memory:").await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'recipes'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_create_schema_idempotent() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_ping() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        ping(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_ping_fails_on_closed_pool() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        pool.close().await;
        assert!(ping(&pool).await.is_err());
    }

    #[tokio::test]
    async fn test_init_file_database_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("recipes.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());

        let pool = init_database(&url).await.unwrap();
        ping(&pool).await.unwrap();
        pool.close().await;

        assert!(db_path.exists());
    }

    #[test]
    fn test_database_file_path() {
        assert_eq!(
            database_file_path("sqlite:///var/lib/recipes/recipes.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/recipes/recipes.db"))
        );
        assert_eq!(
            database_file_path("sqlite:data/recipes.db"),
            Some(PathBuf::from("data/recipes.db"))
        );
        assert_eq!(database_file_path("sqlite::memory:"), None);
        assert_eq!(database_file_path("postgres://localhost/recipes"), None);
    }
}
