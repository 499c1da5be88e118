use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 1800;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 4000,
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff: initial * 2^attempt, capped at `max_delay_ms`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self
            .initial_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// When false every read goes straight to the store
    pub enabled: bool,
    pub refresh_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from any variable source; unset variables fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = match lookup("CACHE_ENABLED") {
            Some(raw) => parse_bool(&raw).with_context(|| "Invalid CACHE_ENABLED")?,
            None => true,
        };

        let refresh_secs = match lookup("CACHE_REFRESH_INTERVAL_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid CACHE_REFRESH_INTERVAL_SECONDS '{}'", raw))?,
            None => DEFAULT_REFRESH_INTERVAL_SECS,
        };
        if refresh_secs == 0 {
            return Err(anyhow!("CACHE_REFRESH_INTERVAL_SECONDS must be greater than zero"));
        }

        let database_path = match lookup("PORTFOLIO_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => Self::default_db_path()?,
        };

        Ok(Self {
            database_path,
            bind_addr: lookup("PORTFOLIO_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cache: CacheConfig {
                enabled,
                refresh_interval: Duration::from_secs(refresh_secs),
                retry: RetryPolicy::default(),
            },
        })
    }

    /// ~/.portfolio/portfolio.db
    fn default_db_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;

        Ok(home_dir.join(".portfolio").join("portfolio.db"))
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("expected a boolean, got '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("PORTFOLIO_DB_PATH", "/tmp/p.db")])).unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.refresh_interval, Duration::from_secs(1800));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.database_path, PathBuf::from("/tmp/p.db"));
    }

    #[test]
    fn test_cache_settings_from_env() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORTFOLIO_DB_PATH", "/tmp/p.db"),
            ("CACHE_ENABLED", "false"),
            ("CACHE_REFRESH_INTERVAL_SECONDS", "60"),
        ]))
        .unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.refresh_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[
            ("PORTFOLIO_DB_PATH", "/tmp/p.db"),
            ("CACHE_ENABLED", "maybe")
        ]))
        .is_err());
        assert!(AppConfig::from_lookup(lookup(&[
            ("PORTFOLIO_DB_PATH", "/tmp/p.db"),
            ("CACHE_REFRESH_INTERVAL_SECONDS", "0")
        ]))
        .is_err());
    }

    #[test]
    fn test_retry_delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(4));
    }
}
