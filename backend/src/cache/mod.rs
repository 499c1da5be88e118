pub mod memory;
pub mod types;

pub use memory::MemoryCache;
pub use types::{CacheStats, CacheStatus};

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

/// Namespace every portfolio cache key lives under
pub const PORTFOLIO_NAMESPACE: &str = "portfolio";

/// Cache key for a store key: `"portfolio:" + key`
pub fn cache_key(store_key: &str) -> String {
    format!("{}:{}", PORTFOLIO_NAMESPACE, store_key)
}

/// Prefix matching every key in the portfolio namespace
pub fn namespace_prefix() -> String {
    format!("{}:", PORTFOLIO_NAMESPACE)
}

/// Process-local key/value cache with prefix listing.
///
/// No TTL and no eviction: the whole dataset is expected to fit.
#[async_trait]
pub trait CacheProvider<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>>;

    async fn set(&self, key: &str, value: V) -> Result<()>;

    /// Returns whether the key was present
    async fn delete(&self, key: &str) -> Result<bool>;

    async fn list_by_prefix(&self, prefix: &str) -> Result<BTreeMap<String, V>>;

    async fn clear(&self) -> Result<()>;

    async fn stats(&self) -> Result<CacheStats>;

    /// Swap the whole content for `entries`.
    ///
    /// The default clears then sets each entry; implementations that can swap
    /// in one step should.
    async fn replace_all(&self, entries: Vec<(String, V)>) -> Result<()> {
        self.clear().await?;
        for (key, value) in entries {
            self.set(&key, value).await?;
        }
        Ok(())
    }
}
