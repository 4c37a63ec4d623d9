mod cli;

use std::path::PathBuf;

use clap::Parser;
use cli::{Cli, Commands};
use image_downloader::config::{Config, ConfigError};
use image_downloader::{api, observability};

fn load_config(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server(args) => {
            let mut config = load_config(args.config)?;
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }
            api::run(config).await?
        }
        Commands::Migrate(args) => {
            let config = load_config(args.config)?;
            api::migrate(&config).await?;
            tracing::info!("Migration complete");
        }
    }

    Ok(())
}
