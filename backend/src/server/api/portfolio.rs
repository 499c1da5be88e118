// Public portfolio read and the profile singleton
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::data::{PortfolioSnapshot, Profile, ProfileInput};
use crate::error::DataError;
use crate::server::error::{ApiResult, ErrorResponse};
use crate::server::ServerState;

/// Portfolio response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PortfolioResponse {
    pub success: bool,
    pub portfolio: PortfolioSnapshot,
    /// Whether the answer came from the in-memory cache
    pub cached: bool,
}

/// Get the shaped portfolio: profile, featured skills, experiences, published projects
#[utoipa::path(
    get,
    path = "/api/portfolio",
    responses(
        (status = 200, description = "Shaped portfolio", body = PortfolioResponse),
        (status = 503, description = "Store unavailable and cache empty", body = ErrorResponse)
    ),
    tag = "portfolio"
)]
pub async fn get_portfolio(State(state): State<Arc<ServerState>>) -> ApiResult<PortfolioResponse> {
    let read = state.service.read_portfolio().await?;

    Ok(Json(PortfolioResponse {
        success: true,
        portfolio: read.snapshot,
        cached: read.from_cache,
    }))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Current profile", body = Profile),
        (status = 404, description = "No profile yet", body = ErrorResponse)
    ),
    tag = "portfolio"
)]
pub async fn get_profile(State(state): State<Arc<ServerState>>) -> ApiResult<Profile> {
    let profile = state
        .service
        .get_profile()
        .await?
        .ok_or_else(|| DataError::not_found("profile", "profile"))?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = ProfileInput,
    responses(
        (status = 200, description = "Profile saved", body = Profile),
        (status = 400, description = "Invalid profile", body = ErrorResponse)
    ),
    tag = "portfolio"
)]
pub async fn put_profile(
    State(state): State<Arc<ServerState>>,
    Json(input): Json<ProfileInput>,
) -> ApiResult<Profile> {
    Ok(Json(state.service.set_profile(input).await?))
}
