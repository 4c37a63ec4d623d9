use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "IMAGE_DOWNLOADER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/image-downloader.toml";
const ENV_PREFIX: &str = "IMAGE_DOWNLOADER";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // IMAGE_DOWNLOADER__STORAGE__DOWNLOAD_DIR -> storage.download_dir
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.fetcher.max_redirects, 10);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "0.0.0.0:9000"
max_body_bytes = 4096
request_deadline_secs = 30

[storage]
download_dir = "/var/lib/images"
database_path = "/var/lib/images.db"

[fetcher]
connect_timeout_secs = 3
request_timeout_secs = 20
user_agent = "test-agent/1.0"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:9000");
        assert_eq!(config.server.max_body_bytes, 4096);
        assert_eq!(config.server.request_deadline_secs, 30);
        assert_eq!(config.storage.download_dir, PathBuf::from("/var/lib/images"));
        assert_eq!(config.storage.database_path, PathBuf::from("/var/lib/images.db"));
        assert_eq!(config.fetcher.connect_timeout_secs, 3);
        assert_eq!(config.fetcher.request_timeout_secs, 20);
        assert_eq!(config.fetcher.user_agent, "test-agent/1.0");
        // untouched keys fall back to defaults
        assert_eq!(config.fetcher.max_redirects, 10);
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");

        fs::write(&config_path, "[server\nbind_addr = ").unwrap();

        assert!(load_from_sources(config_path).is_err());
    }
}
