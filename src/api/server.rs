use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::{
    services::{download_image, get_image, health, list_images},
    state::AppState,
};
use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::store::SqliteImageStore;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Route table for the service
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/download-image/", get(list_images).post(download_image))
        .route("/download-image/{id}", get(get_image))
        .route("/health", get(health))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Open the configured database and bring its schema up to date
pub async fn migrate(config: &Config) -> Result<SqliteImageStore, AnyError> {
    let path = &config.storage.database_path;
    let store = SqliteImageStore::open(path)
        .await
        .map_err(|e| format!("Failed to open database {}: {}", path.display(), e))?;

    store
        .migrate()
        .await
        .map_err(|e| format!("Failed to migrate database: {}", e))?;

    Ok(store)
}

/// Create the download directory, including missing parents
pub async fn prepare_storage(config: &Config) -> Result<(), AnyError> {
    let download_dir = &config.storage.download_dir;
    info!(path = %download_dir.display(), "Preparing download directory");
    tokio::fs::create_dir_all(download_dir).await.map_err(|e| {
        format!(
            "Failed to create download directory {}: {}",
            download_dir.display(),
            e
        )
    })?;

    Ok(())
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    prepare_storage(&config).await?;
    let store = migrate(&config).await?;

    let fetcher = Fetcher::new(&config.fetcher)
        .map_err(|e| format!("Failed to initialize fetcher: {}", e))?;

    let address = config.server.bind_addr;
    let state = AppState::new(config, Arc::new(store), fetcher);
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "image-downloader listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
