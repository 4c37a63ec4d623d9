//! Tracing setup and in-process download counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    downloads_succeeded: AtomicU64,
    downloads_failed: AtomicU64,
    bytes_fetched: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn download_succeeded(&self, bytes: u64) {
        self.downloads_succeeded.fetch_add(1, Ordering::Relaxed);
        self.bytes_fetched.fetch_add(bytes, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_succeeded", bytes, "Metric incremented");
    }

    pub fn download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            downloads_succeeded: self.downloads_succeeded.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
            bytes_fetched: self.bytes_fetched.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub downloads_succeeded: u64,
    pub downloads_failed: u64,
    pub bytes_fetched: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();
        metrics.download_succeeded(10);
        metrics.download_succeeded(5);
        metrics.download_failed();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                downloads_succeeded: 2,
                downloads_failed: 1,
                bytes_fetched: 15,
            }
        );
    }
}
