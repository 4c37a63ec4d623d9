//! HTTP client for fetching remote images to disk

use std::path::{Path, PathBuf};

use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::FetcherConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    NonSuccessStatus(u16),

    #[error("Failed to write {}: {source}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),

    #[error("Request deadline exceeded")]
    DeadlineExceeded,
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// A file written by [`Fetcher::fetch`]
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Downloads a URL into a local file
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build().map_err(FetchError::ClientInit)?;

        Ok(Self { client })
    }

    /// GET `url` and stream the body into `path`, replacing any existing file.
    ///
    /// Only a 200 response is accepted. Nothing is left at `path` unless the
    /// whole body was written.
    pub async fn fetch(&self, url: &str, path: &Path) -> Result<FetchedFile> {
        debug!(url, path = %path.display(), "Starting download");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(url, status = status.as_u16(), "Upstream returned non-200 status");
            return Err(FetchError::NonSuccessStatus(status.as_u16()));
        }

        let mut partial = PartialFile::create(path).await?;
        while let Some(chunk) = response.chunk().await.map_err(FetchError::Network)? {
            partial.write(&chunk).await?;
        }
        let size = partial.commit().await?;

        debug!(url, size, "Download completed");

        Ok(FetchedFile {
            path: path.to_path_buf(),
            size,
        })
    }
}

/// Derive the local file name from the last non-empty path segment of `url`.
///
/// The segment is used as-is: no percent-decoding, no extension check.
pub fn file_name_from_url(url: &str) -> Result<String> {
    let invalid = |reason: &str| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }

    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .filter(|name| *name != "." && *name != "..")
        .map(str::to_owned)
        .ok_or_else(|| invalid("path has no file name"))
}

/// Body being written to a hidden sibling of the target path.
///
/// Renamed into place by `commit`; removed on drop otherwise, which also
/// covers the future being cancelled mid-download.
struct PartialFile {
    file: Option<File>,
    temp_path: PathBuf,
    target: PathBuf,
    written: u64,
    committed: bool,
}

impl PartialFile {
    async fn create(target: &Path) -> Result<Self> {
        // length does not depend on the target name
        let temp_path = target.with_file_name(format!(".{}.part", Uuid::new_v4()));

        let file = File::create(&temp_path)
            .await
            .map_err(|source| FetchError::StorageWrite {
                path: target.to_path_buf(),
                source,
            })?;

        Ok(Self {
            file: Some(file),
            temp_path,
            target: target.to_path_buf(),
            written: 0,
            committed: false,
        })
    }

    async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(chunk)
                .await
                .map_err(|source| FetchError::StorageWrite {
                    path: self.target.clone(),
                    source,
                })?;
            self.written += chunk.len() as u64;
        }
        Ok(())
    }

    async fn commit(mut self) -> Result<u64> {
        let storage_err = |target: &Path, source| FetchError::StorageWrite {
            path: target.to_path_buf(),
            source,
        };

        if let Some(mut file) = self.file.take() {
            file.flush().await.map_err(|e| storage_err(&self.target, e))?;
            file.sync_all().await.map_err(|e| storage_err(&self.target, e))?;
        }

        tokio::fs::rename(&self.temp_path, &self.target)
            .await
            .map_err(|e| storage_err(&self.target, e))?;

        self.committed = true;
        Ok(self.written)
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            // close before unlinking
            self.file.take();
            // blocking: Drop cannot await
            if let Err(e) = std::fs::remove_file(&self.temp_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %self.temp_path.display(), error = %e, "Failed to remove partial download");
                }
            }
        }
    }
}
