use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::accessor::{PortfolioCache, PortfolioSource};
use crate::cache::{cache_key, CacheProvider, CacheStatus};
use crate::config::CacheConfig;
use crate::error::Result;

/// What a call to [`CacheRefreshManager::refresh_with_retry`] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Caching is turned off
    Disabled,
    /// Another refresh holds the flag; nothing was done
    AlreadyRunning,
    /// Store health probe failed; the cache was left alone
    Unhealthy,
    Refreshed { keys: usize },
    /// Every attempt failed; the previous cache content is kept
    Failed { attempts: u32 },
}

struct PeriodicTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Keeps the cache in step with the store: one refresh at startup, then one per
/// configured interval. At most one refresh runs at a time.
pub struct CacheRefreshManager {
    config: CacheConfig,
    source: Arc<dyn PortfolioSource>,
    cache: Arc<PortfolioCache>,
    refreshing: AtomicBool,
    last_refreshed_at: Mutex<Option<i64>>,
    timer: Mutex<Option<PeriodicTimer>>,
}

/// Clears the refreshing flag however the refresh ends
struct RefreshingGuard<'a>(&'a AtomicBool);

impl Drop for RefreshingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CacheRefreshManager {
    pub fn new(config: CacheConfig, source: Arc<dyn PortfolioSource>, cache: Arc<PortfolioCache>) -> Self {
        Self {
            config,
            source,
            cache,
            refreshing: AtomicBool::new(false),
            last_refreshed_at: Mutex::new(None),
            timer: Mutex::new(None),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Populate the cache once, then arm the periodic timer.
    ///
    /// No-op when caching is disabled or the timer is already armed.
    pub async fn initialize(self: &Arc<Self>) {
        if !self.config.enabled {
            log::info!("Cache disabled, refresh manager not started");
            return;
        }

        let mut timer = self.timer.lock().await;
        if timer.is_some() {
            log::debug!("Refresh manager already initialized");
            return;
        }

        let outcome = self.refresh_with_retry().await;
        log::info!("Initial cache refresh: {:?}", outcome);

        let period = self.config.refresh_interval;
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        // Weak so the timer task alone never keeps the manager alive
        let manager = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        log::debug!("Cache refresh timer cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let Some(manager) = manager.upgrade() else {
                            break;
                        };
                        let outcome = manager.refresh_with_retry().await;
                        log::debug!("Periodic cache refresh: {:?}", outcome);
                    }
                }
            }
        });

        log::info!("Cache refresh scheduled every {}s", period.as_secs());
        *timer = Some(PeriodicTimer { cancel, handle });
    }

    /// Cancel the periodic timer. An in-flight refresh finishes on its own.
    pub async fn stop(&self) {
        if let Some(timer) = self.timer.lock().await.take() {
            timer.cancel.cancel();
            drop(timer.handle);
            log::info!("Cache refresh timer stopped");
        }
    }

    /// Health-gated, retried, fetch-then-swap refresh of the whole namespace
    pub async fn refresh_with_retry(&self) -> RefreshOutcome {
        if !self.config.enabled {
            return RefreshOutcome::Disabled;
        }

        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::info!("Cache refresh already in progress, skipping");
            return RefreshOutcome::AlreadyRunning;
        }
        let _guard = RefreshingGuard(&self.refreshing);

        if !self.source.health_check().await {
            log::warn!("Store health check failed, keeping existing cache");
            return RefreshOutcome::Unhealthy;
        }

        let policy = &self.config.retry;
        for attempt in 0..policy.max_attempts {
            match self.refresh_once().await {
                Ok(keys) => {
                    *self.last_refreshed_at.lock().await = Some(chrono::Utc::now().timestamp());
                    log::info!("Cache refreshed with {} keys", keys);
                    return RefreshOutcome::Refreshed { keys };
                }
                Err(e) => {
                    log::warn!(
                        "Cache refresh attempt {}/{} failed: {}",
                        attempt + 1,
                        policy.max_attempts,
                        e
                    );
                    if attempt + 1 < policy.max_attempts {
                        tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
                    }
                }
            }
        }

        log::error!(
            "Cache refresh failed after {} attempts, serving previous cache",
            policy.max_attempts
        );
        RefreshOutcome::Failed {
            attempts: policy.max_attempts,
        }
    }

    async fn refresh_once(&self) -> Result<usize> {
        let items = self.source.fetch_all_items().await?;
        let entries: Vec<_> = items
            .into_iter()
            .map(|(key, item)| (cache_key(&key), item))
            .collect();
        let count = entries.len();

        self.cache.replace_all(entries).await?;
        Ok(count)
    }

    pub async fn force_refresh(&self) -> RefreshOutcome {
        log::info!("Manual cache refresh requested");
        self.refresh_with_retry().await
    }

    pub async fn clear_cache(&self) -> Result<()> {
        self.cache.clear().await?;
        log::info!("Cache cleared");
        Ok(())
    }

    pub async fn status(&self) -> Result<CacheStatus> {
        let stats = self.cache.stats().await?;
        Ok(CacheStatus {
            enabled: self.config.enabled,
            refresh_interval_seconds: self.config.refresh_interval.as_secs(),
            key_count: stats.key_count,
            refreshing: self.is_refreshing(),
            last_refreshed_at: *self.last_refreshed_at.lock().await,
        })
    }
}
