use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tracing::{debug, info};

use super::{Image, ImageStore, NewImage, Result, StoreError};

/// SQLite-backed image store
///
/// Opening a store does not touch the schema; call [`SqliteImageStore::migrate`]
/// once at startup.
#[derive(Clone)]
pub struct SqliteImageStore {
    pool: SqlitePool,
}

impl SqliteImageStore {
    /// Open or create the database file at `path`
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening SQLite database at: {}", path.display());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::Unavailable(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Private in-memory database; a single connection keeps it alive
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Create the `images` table if it does not exist. Safe to run repeatedly.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_name TEXT NOT NULL,
                file_path TEXT NOT NULL,
                source_url TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Migration(format!("Failed to create images table: {e}")))?;

        info!("Database schema ready");
        Ok(())
    }

    /// Close every pooled connection; later calls fail
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ImageStore for SqliteImageStore {
    async fn insert(&self, image: NewImage) -> Result<Image> {
        let result = sqlx::query(
            "INSERT INTO images (file_name, file_path, source_url) VALUES (?1, ?2, ?3)",
        )
        .bind(&image.file_name)
        .bind(&image.file_path)
        .bind(&image.source_url)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, file_name = %image.file_name, "Inserted image record");

        Ok(Image {
            id,
            file_name: image.file_name,
            file_path: image.file_path,
            source_url: image.source_url,
        })
    }

    async fn list(&self) -> Result<Vec<Image>> {
        let images = sqlx::query_as::<_, Image>(
            "SELECT id, file_name, file_path, source_url FROM images ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn get(&self, id: i64) -> Result<Image> {
        sqlx::query_as::<_, Image>(
            "SELECT id, file_name, file_path, source_url FROM images WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn health(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
