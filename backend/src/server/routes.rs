use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::cache::CacheStatus;
use crate::server::ServerState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" when the store answers, "degraded" otherwise
    pub status: String,
    pub version: String,
    pub store_available: bool,
    pub cache: Option<CacheStatus>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service health and cache status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    let store_available = state.service.health_check().await;

    let cache = match state.service.get_cache_status().await {
        Ok(status) => Some(status),
        Err(e) => {
            log::warn!("Failed to read cache status: {}", e);
            None
        }
    };

    Json(HealthResponse {
        status: if store_available { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store_available,
        cache,
    })
}
