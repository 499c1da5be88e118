use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::data::DashboardStats;
use crate::server::error::{ApiResult, ErrorResponse};
use crate::server::ServerState;
use crate::store::Record;

/// Dashboard stats endpoint
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Record counts and derived totals", body = DashboardStats),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn get_stats(State(state): State<Arc<ServerState>>) -> ApiResult<DashboardStats> {
    Ok(Json(state.service.get_dashboard_stats().await?))
}

/// Every stored version of a key, newest first
#[utoipa::path(
    get,
    path = "/api/admin/history/{key}",
    params(("key" = String, Path, description = "Store key, e.g. skill:<id>")),
    responses(
        (status = 200, description = "Version history", body = Vec<Record>),
        (status = 404, description = "Key never written", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn get_history(
    State(state): State<Arc<ServerState>>,
    Path(key): Path<String>,
) -> ApiResult<Vec<Record>> {
    Ok(Json(state.service.get_history(&key).await?))
}

/// Make an earlier version of a key the active one
#[utoipa::path(
    post,
    path = "/api/admin/history/{key}/rollback/{version}",
    params(
        ("key" = String, Path, description = "Store key"),
        ("version" = i64, Path, description = "Version to reactivate")
    ),
    responses(
        (status = 200, description = "Record now active", body = Record),
        (status = 404, description = "Unknown key or version", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn rollback(
    State(state): State<Arc<ServerState>>,
    Path((key, version)): Path<(String, i64)>,
) -> ApiResult<Record> {
    log::info!("Rolling back {} to version {}", key, version);
    Ok(Json(state.service.rollback(&key, version).await?))
}
