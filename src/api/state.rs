use std::sync::Arc;

use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::observability::Metrics;
use crate::store::ImageStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ImageStore>,
    pub fetcher: Arc<Fetcher>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ImageStore>, fetcher: Fetcher) -> Self {
        Self {
            config: Arc::new(config),
            store,
            fetcher: Arc::new(fetcher),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
