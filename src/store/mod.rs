//! Image record persistence
//!
//! [`ImageStore`] is the seam between request handlers and the relational
//! table holding image metadata. [`SqliteImageStore`] backs the running
//! service; [`InMemoryImageStore`] stands in for it in tests.

mod memory;
mod sqlite;

pub use memory::InMemoryImageStore;
pub use sqlite::SqliteImageStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Image {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),
}

/// Store result type
pub type Result<T> = std::result::Result<T, StoreError>;

/// A persisted image record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Image {
    pub id: i64,
    pub file_name: String,
    pub file_path: String,
    pub source_url: String,
}

/// Fields supplied by the download flow; the id is assigned on insert
#[derive(Debug, Clone)]
pub struct NewImage {
    pub file_name: String,
    pub file_path: String,
    pub source_url: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist a record and return it with its assigned id
    async fn insert(&self, image: NewImage) -> Result<Image>;

    /// All records in ascending id order. Empty table is `Ok(vec![])`.
    async fn list(&self) -> Result<Vec<Image>>;

    /// Fetch one record; `StoreError::NotFound` when no row matches
    async fn get(&self, id: i64) -> Result<Image>;

    /// Health check
    async fn health(&self) -> bool;
}
