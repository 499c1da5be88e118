use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::cache::CacheStatus;
use crate::data::PortfolioItem;
use crate::refresh::RefreshOutcome;
use crate::server::error::{ApiResult, ErrorResponse};
use crate::server::ServerState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CacheKeysResponse {
    pub success: bool,
    pub count: usize,
    #[schema(value_type = Object)]
    pub entries: BTreeMap<String, PortfolioItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CacheActionResponse {
    pub success: bool,
    pub message: String,
    pub status: CacheStatus,
}

/// Get cache configuration and live state
#[utoipa::path(
    get,
    path = "/api/cache/status",
    responses((status = 200, description = "Cache status", body = CacheStatus)),
    tag = "cache"
)]
pub async fn get_cache_status(State(state): State<Arc<ServerState>>) -> ApiResult<CacheStatus> {
    Ok(Json(state.service.get_cache_status().await?))
}

/// List every cached entry in the portfolio namespace
#[utoipa::path(
    get,
    path = "/api/cache/keys",
    responses((status = 200, description = "Cached entries", body = CacheKeysResponse)),
    tag = "cache"
)]
pub async fn list_cache_keys(State(state): State<Arc<ServerState>>) -> ApiResult<CacheKeysResponse> {
    let entries = state.service.list_cache_keys().await?;
    Ok(Json(CacheKeysResponse {
        success: true,
        count: entries.len(),
        entries,
    }))
}

#[utoipa::path(
    post,
    path = "/api/cache/clear",
    responses(
        (status = 200, description = "Cache emptied", body = CacheActionResponse),
        (status = 500, description = "Cache failure", body = ErrorResponse)
    ),
    tag = "cache"
)]
pub async fn clear_cache(State(state): State<Arc<ServerState>>) -> ApiResult<CacheActionResponse> {
    state.service.clear_cache().await?;
    Ok(Json(CacheActionResponse {
        success: true,
        message: "Cache cleared".to_string(),
        status: state.service.get_cache_status().await?,
    }))
}

/// Rebuild the cache from the store now
#[utoipa::path(
    post,
    path = "/api/cache/refresh",
    responses((status = 200, description = "Refresh result", body = CacheActionResponse)),
    tag = "cache"
)]
pub async fn refresh_cache(State(state): State<Arc<ServerState>>) -> ApiResult<CacheActionResponse> {
    let outcome = state.service.force_refresh().await;
    let (success, message) = match outcome {
        RefreshOutcome::Refreshed { keys } => (true, format!("Cache refreshed with {} keys", keys)),
        RefreshOutcome::AlreadyRunning => (true, "A refresh is already running".to_string()),
        RefreshOutcome::Disabled => (false, "Caching is disabled".to_string()),
        RefreshOutcome::Unhealthy => (false, "Store unhealthy, cache left unchanged".to_string()),
        RefreshOutcome::Failed { attempts } => (
            false,
            format!("Refresh failed after {} attempts, cache left unchanged", attempts),
        ),
    };

    Ok(Json(CacheActionResponse {
        success,
        message,
        status: state.service.get_cache_status().await?,
    }))
}
