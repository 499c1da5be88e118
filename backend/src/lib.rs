// Modules for better organization

pub mod accessor;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod refresh;
pub mod server;
pub mod service;
pub mod store;

use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::service::PortfolioService;
use crate::store::PortfolioStore;

/// Load config from the environment, open the store, warm the cache and serve
/// HTTP until Ctrl-C.
pub async fn run() -> anyhow::Result<()> {
    logging::init();

    let config = AppConfig::from_env()?;
    log::info!(
        "Starting portfolio backend (db: {}, cache enabled: {}, refresh every {}s)",
        config.database_path.display(),
        config.cache.enabled,
        config.cache.refresh_interval.as_secs()
    );

    let store = PortfolioStore::open(&config.database_path)
        .with_context(|| format!("Failed to open store at {}", config.database_path.display()))?;

    let service = Arc::new(PortfolioService::new(config.cache.clone(), store));
    service.initialize().await;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {}", e);
        }
        log::info!("Shutdown signal received");
    };

    let served = server::start_server(service.clone(), &config.bind_addr, shutdown).await;
    service.shutdown().await;
    served
}
