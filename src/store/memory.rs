use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Image, ImageStore, NewImage, Result, StoreError};

/// In-memory store for tests and local development
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    images: RwLock<Vec<Image>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn insert(&self, image: NewImage) -> Result<Image> {
        let mut images = self.images.write().await;

        // ids are never reused because nothing is ever removed
        let id = images.last().map_or(1, |last| last.id + 1);
        let image = Image {
            id,
            file_name: image.file_name,
            file_path: image.file_path,
            source_url: image.source_url,
        };

        images.push(image.clone());
        tracing::debug!(id, "Inserted in-memory image record");
        Ok(image)
    }

    async fn list(&self) -> Result<Vec<Image>> {
        Ok(self.images.read().await.clone())
    }

    async fn get(&self, id: i64) -> Result<Image> {
        self.images
            .read()
            .await
            .iter()
            .find(|image| image.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn health(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_list_get() {
        let store = InMemoryImageStore::new();

        let image = store
            .insert(NewImage {
                file_name: "pic.png".to_string(),
                file_path: "images/pic.png".to_string(),
                source_url: "https://example.com/a/pic.png".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(image.id, 1);
        assert_eq!(store.list().await.unwrap(), vec![image.clone()]);
        assert_eq!(store.get(1).await.unwrap(), image);
        assert!(matches!(store.get(2).await, Err(StoreError::NotFound(2))));
    }
}
