use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheProvider, CacheStats};
use crate::error::Result;

/// Unbounded in-memory cache. A `BTreeMap` keeps prefix listing a range scan.
pub struct MemoryCache<V> {
    entries: RwLock<BTreeMap<String, V>>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> CacheProvider<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: V) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<BTreeMap<String, V>> {
        let entries = self.entries.read().await;
        let range = entries.range::<str, _>((Bound::Included(prefix), Bound::Unbounded));

        Ok(range
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            key_count: self.entries.read().await.len(),
        })
    }

    async fn replace_all(&self, entries: Vec<(String, V)>) -> Result<()> {
        let fresh: BTreeMap<String, V> = entries.into_iter().collect();
        *self.entries.write().await = fresh;
        Ok(())
    }
}
