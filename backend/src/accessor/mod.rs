pub mod shape;


pub use shape::shape_portfolio;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{cache_key, namespace_prefix, CacheProvider};
use crate::config::CacheConfig;
use crate::data::{Change, PortfolioData, PortfolioItem, PortfolioSnapshot};
use crate::error::Result;

/// Where the durable copy of the portfolio comes from
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    async fn health_check(&self) -> bool;

    /// Every active record as `(store key, item)`
    async fn fetch_all_items(&self) -> Result<Vec<(String, PortfolioItem)>>;
}

#[async_trait]
impl PortfolioSource for PortfolioData {
    async fn health_check(&self) -> bool {
        self.store().health_check().await
    }

    async fn fetch_all_items(&self) -> Result<Vec<(String, PortfolioItem)>> {
        PortfolioData::fetch_all_items(self).await
    }
}

pub type PortfolioCache = dyn CacheProvider<PortfolioItem>;

/// A shaped portfolio and whether it was served from the cache
#[derive(Debug, Clone)]
pub struct PortfolioRead {
    pub snapshot: PortfolioSnapshot,
    pub from_cache: bool,
}

/// Chooses cache or store for every full-portfolio read and mirrors point
/// writes into the cache
pub struct DataAccessor {
    config: CacheConfig,
    source: Arc<dyn PortfolioSource>,
    cache: Arc<PortfolioCache>,
}

impl DataAccessor {
    pub fn new(config: CacheConfig, source: Arc<dyn PortfolioSource>, cache: Arc<PortfolioCache>) -> Self {
        Self {
            config,
            source,
            cache,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub async fn get_portfolio_data(&self) -> Result<PortfolioSnapshot> {
        Ok(self.read_portfolio().await?.snapshot)
    }

    /// Serve from the cache when it holds anything, otherwise from the store.
    ///
    /// Any entry under the namespace counts as a fully populated cache.
    /// Cache failures fall back to the store; only a store failure on that
    /// path reaches the caller.
    pub async fn read_portfolio(&self) -> Result<PortfolioRead> {
        if !self.config.enabled {
            return self.read_from_store().await;
        }

        match self.cache.list_by_prefix(&namespace_prefix()).await {
            Ok(entries) if !entries.is_empty() => {
                log::debug!("Serving portfolio from cache ({} entries)", entries.len());
                return Ok(PortfolioRead {
                    snapshot: shape_portfolio(entries.into_values()),
                    from_cache: true,
                });
            }
            Ok(_) => {
                log::info!("Portfolio cache empty, reading from store");
            }
            Err(e) => {
                log::warn!("Portfolio cache read failed, falling back to store: {}", e);
            }
        }

        self.read_from_store().await
    }

    async fn read_from_store(&self) -> Result<PortfolioRead> {
        let items = self.source.fetch_all_items().await?;
        Ok(PortfolioRead {
            snapshot: shape_portfolio(items.into_iter().map(|(_, item)| item)),
            from_cache: false,
        })
    }

    /// Mirror one durable write into the cache
    pub async fn update_cache_item(&self, key: &str, item: PortfolioItem) {
        if !self.config.enabled {
            return;
        }
        if let Err(e) = self.cache.set(&cache_key(key), item).await {
            log::warn!("Failed to update cache entry {}: {}", key, e);
        }
    }

    pub async fn delete_cache_item(&self, key: &str) {
        if !self.config.enabled {
            return;
        }
        if let Err(e) = self.cache.delete(&cache_key(key)).await {
            log::warn!("Failed to delete cache entry {}: {}", key, e);
        }
    }

    /// Mirror every key a write touched, in order
    pub async fn apply_changes(&self, changes: &[Change]) {
        for change in changes {
            match change {
                Change::Upsert { key, item } => self.update_cache_item(key, item.clone()).await,
                Change::Remove { key } => self.delete_cache_item(key).await,
            }
        }
    }

    /// Every cached entry in the portfolio namespace
    pub async fn list_cache_keys(&self) -> Result<BTreeMap<String, PortfolioItem>> {
        self.cache.list_by_prefix(&namespace_prefix()).await
    }
}
