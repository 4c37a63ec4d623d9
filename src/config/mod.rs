//! Configuration management for image-downloader
//!
//! Settings are layered from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use image_downloader::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `IMAGE_DOWNLOADER__<section>__<key>`:
//! - `IMAGE_DOWNLOADER__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `IMAGE_DOWNLOADER__STORAGE__DOWNLOAD_DIR=/srv/images`
//! - `IMAGE_DOWNLOADER__FETCHER__REQUEST_TIMEOUT_SECS=30`
//!
//! # Configuration File
//!
//! By default the file is `config/image-downloader.toml`. Point
//! `IMAGE_DOWNLOADER_CONFIG` elsewhere to override it.

mod models;
mod sources;
mod validation;

pub use models::{Config, FetcherConfig, ServerConfig, StorageConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[storage]
download_dir = "downloads"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.storage.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.storage.database_path, PathBuf::from("data/images.db"));
    }

    #[test]
    fn test_validation_catches_zero_deadline() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
request_deadline_secs = 0
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::ZeroValue { .. })
        ));
    }

    #[test]
    fn test_full_config_example() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:3000"
max_body_bytes = 65536
request_deadline_secs = 90

[storage]
download_dir = "./images"
database_path = "./data/images.db"

[fetcher]
connect_timeout_secs = 5
request_timeout_secs = 45
user_agent = "image-downloader-test"
max_redirects = 3
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();

        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.server.max_body_bytes, 65536);
        assert_eq!(config.server.request_deadline_secs, 90);
        assert_eq!(config.storage.download_dir, PathBuf::from("./images"));
        assert_eq!(config.fetcher.max_redirects, 3);
        assert_eq!(config.fetcher.user_agent, "image-downloader-test");
    }
}
