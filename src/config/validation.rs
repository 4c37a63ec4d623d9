use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("storage.download_dir must not be empty")]
    EmptyDownloadDir,

    #[error("storage.database_path must not be empty")]
    EmptyDatabasePath,

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },
}

/// Validate a loaded configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    if config.storage.download_dir.as_os_str().is_empty() {
        return Err(ValidationError::EmptyDownloadDir);
    }

    if config.storage.database_path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyDatabasePath);
    }

    let non_zero = [
        ("server.max_body_bytes", config.server.max_body_bytes as u64),
        ("server.request_deadline_secs", config.server.request_deadline_secs),
        ("fetcher.connect_timeout_secs", config.fetcher.connect_timeout_secs),
        ("fetcher.request_timeout_secs", config.fetcher.request_timeout_secs),
    ];

    for (field, value) in non_zero {
        if value == 0 {
            return Err(ValidationError::ZeroValue { field });
        }
    }

    if config.server.request_deadline_secs < config.fetcher.request_timeout_secs {
        tracing::warn!(
            deadline_secs = config.server.request_deadline_secs,
            fetch_timeout_secs = config.fetcher.request_timeout_secs,
            "Request deadline is shorter than the fetch timeout; slow downloads will hit the deadline first"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_download_dir() {
        let mut config = Config::default();
        config.storage.download_dir = PathBuf::new();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyDownloadDir)
        ));
    }

    #[test]
    fn test_empty_database_path() {
        let mut config = Config::default();
        config.storage.database_path = PathBuf::new();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyDatabasePath)
        ));
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = Config::default();
        config.fetcher.request_timeout_secs = 0;

        match validate(&config) {
            Err(ValidationError::ZeroValue { field }) => {
                assert_eq!(field, "fetcher.request_timeout_secs")
            }
            other => panic!("Expected ZeroValue error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_body_limit() {
        let mut config = Config::default();
        config.server.max_body_bytes = 0;

        assert!(matches!(
            validate(&config),
            Err(ValidationError::ZeroValue { field: "server.max_body_bytes" })
        ));
    }
}
