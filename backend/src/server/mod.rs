pub mod api;
pub mod error;
pub mod routes;


use axum::{
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::service::PortfolioService;

pub struct ServerState {
    pub service: Arc<PortfolioService>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health_check,
        api::portfolio::get_portfolio,
        api::portfolio::get_profile,
        api::portfolio::put_profile,
        api::content::list_skills,
        api::content::create_skill,
        api::content::update_skill,
        api::content::delete_skill,
        api::content::reorder_skills,
        api::content::list_experiences,
        api::content::create_experience,
        api::content::update_experience,
        api::content::delete_experience,
        api::content::reorder_experiences,
        api::content::list_projects,
        api::content::get_project_by_slug,
        api::content::create_project,
        api::content::update_project,
        api::content::delete_project,
        api::content::reorder_projects,
        api::admin::get_stats,
        api::admin::get_history,
        api::admin::rollback,
        api::cache::get_cache_status,
        api::cache::list_cache_keys,
        api::cache::clear_cache,
        api::cache::refresh_cache,
    ),
    components(
        schemas(
            routes::HealthResponse,
            error::ErrorResponse,
            api::portfolio::PortfolioResponse,
            api::content::DeleteResponse,
            api::content::ReorderResponse,
            api::content::CreateExperienceRequest,
            api::cache::CacheKeysResponse,
            api::cache::CacheActionResponse,
            crate::cache::CacheStatus,
            crate::data::PortfolioSnapshot,
            crate::data::Profile,
            crate::data::ProfileInput,
            crate::data::Skill,
            crate::data::SkillInput,
            crate::data::Experience,
            crate::data::ExperienceInput,
            crate::data::ExperienceView,
            crate::data::Achievement,
            crate::data::AchievementInput,
            crate::data::Project,
            crate::data::ProjectInput,
            crate::data::ProjectStatus,
            crate::data::ProjectView,
            crate::data::ProjectImage,
            crate::data::ProjectImageInput,
            crate::data::SortOrderUpdate,
            crate::data::DashboardStats,
            crate::store::Record,
            crate::store::RecordType,
            crate::store::TypeCount,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "portfolio", description = "Public portfolio and profile endpoints"),
        (name = "content", description = "Skill, experience and project management"),
        (name = "admin", description = "Dashboard stats and version history"),
        (name = "cache", description = "Cache inspection and administration")
    ),
    info(
        title = "Portfolio API",
        description = "REST API for portfolio content backed by a versioned store and an in-memory cache",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;

/// Every API route plus the Swagger UI, with CORS and request tracing
pub fn build_router(service: Arc<PortfolioService>) -> Router {
    let server_state = Arc::new(ServerState { service });

    let swagger_ui = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new()
        // System endpoints
        .route("/api/health", get(routes::health_check))
        .route("/spec/swagger.json", get(|| async move { Json(ApiDoc::openapi()) }))
        // Public portfolio
        .route("/api/portfolio", get(api::portfolio::get_portfolio))
        .route(
            "/api/profile",
            get(api::portfolio::get_profile).put(api::portfolio::put_profile),
        )
        // Skills
        .route(
            "/api/skills",
            get(api::content::list_skills).post(api::content::create_skill),
        )
        .route("/api/skills/order", put(api::content::reorder_skills))
        .route(
            "/api/skills/:id",
            put(api::content::update_skill).delete(api::content::delete_skill),
        )
        // Experiences
        .route(
            "/api/experiences",
            get(api::content::list_experiences).post(api::content::create_experience),
        )
        .route("/api/experiences/order", put(api::content::reorder_experiences))
        .route(
            "/api/experiences/:id",
            put(api::content::update_experience).delete(api::content::delete_experience),
        )
        // Projects
        .route(
            "/api/projects",
            get(api::content::list_projects).post(api::content::create_project),
        )
        .route("/api/projects/slug/:slug", get(api::content::get_project_by_slug))
        .route("/api/projects/order", put(api::content::reorder_projects))
        .route(
            "/api/projects/:id",
            put(api::content::update_project).delete(api::content::delete_project),
        )
        // Admin
        .route("/api/admin/stats", get(api::admin::get_stats))
        .route("/api/admin/history/:key", get(api::admin::get_history))
        .route(
            "/api/admin/history/:key/rollback/:version",
            post(api::admin::rollback),
        )
        // Cache endpoints
        .route("/api/cache/status", get(api::cache::get_cache_status))
        .route("/api/cache/keys", get(api::cache::list_cache_keys))
        .route("/api/cache/clear", post(api::cache::clear_cache))
        .route("/api/cache/refresh", post(api::cache::refresh_cache))
        .merge(swagger_ui)
        .with_state(server_state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Serve the API on `addr` until the shutdown future resolves
pub async fn start_server<F>(service: Arc<PortfolioService>, addr: &str, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_router(service);
    let listener = TcpListener::bind(addr).await?;

    info!("Starting server:");
    info!("  REST API: http://{}/api", addr);
    info!("  API Documentation: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}
