use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CacheStats {
    pub key_count: usize,
}

/// Cache configuration and live state, as reported to admins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CacheStatus {
    pub enabled: bool,
    pub refresh_interval_seconds: u64,
    pub key_count: usize,
    pub refreshing: bool,
    pub last_refreshed_at: Option<i64>,
}
