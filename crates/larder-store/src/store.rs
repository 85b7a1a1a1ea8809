//! SQLite-backed persistent key-value store.

use async_trait::async_trait;
use larder_core::{
    config::StoreConfig, error::LarderError, shellexpand, traits::KeyValueStore,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};

/// Persistent key-value store backed by SQLite.
///
/// The pool is shared with the local notification scheduler, so this type
/// also owns the schema for `scheduled_notifications`.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database file, running migrations on first use.
    pub async fn new(config: &StoreConfig) -> Result<Self, LarderError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LarderError::Persistence(format!("failed to create data dir: {e}"))
            })?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| LarderError::Persistence(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| LarderError::Persistence(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Key-value store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// Open a private in-memory database. Data is lost when the store is dropped.
    pub async fn in_memory() -> Result<Self, LarderError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| LarderError::Persistence(format!("invalid db path: {e}")))?;
        // A single connection: every `:memory:` connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .map_err(|e| LarderError::Persistence(format!("failed to connect to sqlite: {e}")))?;
        Self::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), LarderError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| {
            LarderError::Persistence(format!("failed to create migrations table: {e}"))
        })?;

        let migrations: &[(&str, &str)] = &[
            ("001_kv_store", include_str!("../migrations/001_kv_store.sql")),
            (
                "002_scheduled_notifications",
                include_str!("../migrations/002_scheduled_notifications.sql"),
            ),
        ];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        LarderError::Persistence(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| LarderError::Persistence(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    LarderError::Persistence(format!("failed to record migration {name}: {e}"))
                })?;
            debug!("applied migration {name}");
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for Store {
    async fn get(&self, key: &str) -> Result<Option<String>, LarderError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LarderError::Persistence(format!("read {key} failed: {e}")))?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LarderError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| LarderError::Persistence(format!("write {key} failed: {e}")))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), LarderError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| LarderError::Persistence(format!("remove {key} failed: {e}")))?;
        Ok(())
    }
}
