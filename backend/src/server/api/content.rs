// Admin CRUD for skills, experiences and projects
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::data::{
    AchievementInput, Experience, ExperienceInput, ExperienceView, Project, ProjectImageInput, ProjectInput,
    ProjectView, Skill, SkillInput, SortOrderUpdate,
};
use crate::error::DataError;
use crate::server::error::{ApiResult, ErrorResponse};
use crate::server::ServerState;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReorderResponse {
    pub success: bool,
    pub updated: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExperienceRequest {
    #[serde(flatten)]
    pub experience: ExperienceInput,
    #[serde(default)]
    pub achievements: Vec<AchievementInput>,
}

/// Pull a child collection out of a patch body so the rest can be merged
/// onto the parent
fn take_field<T: DeserializeOwned>(patch: &mut Value, field: &str) -> Result<Option<T>, DataError> {
    let Some(fields) = patch.as_object_mut() else {
        return Err(DataError::InvalidInput("request body must be a JSON object".to_string()));
    };

    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => serde_json::from_value(raw)
            .map(Some)
            .map_err(|e| DataError::InvalidInput(format!("{}: {}", field, e))),
    }
}

// Skills

#[utoipa::path(
    get,
    path = "/api/skills",
    responses((status = 200, description = "All active skills", body = Vec<Skill>)),
    tag = "content"
)]
pub async fn list_skills(State(state): State<Arc<ServerState>>) -> ApiResult<Vec<Skill>> {
    Ok(Json(state.service.list_skills().await?))
}

#[utoipa::path(
    post,
    path = "/api/skills",
    request_body = SkillInput,
    responses(
        (status = 200, description = "Skill created", body = Skill),
        (status = 400, description = "Invalid skill", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn create_skill(
    State(state): State<Arc<ServerState>>,
    Json(input): Json<SkillInput>,
) -> ApiResult<Skill> {
    Ok(Json(state.service.create_skill(input).await?))
}

/// Merge the supplied fields over a skill
#[utoipa::path(
    put,
    path = "/api/skills/{id}",
    params(("id" = String, Path, description = "Skill id")),
    responses(
        (status = 200, description = "Skill updated", body = Skill),
        (status = 404, description = "Unknown skill", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn update_skill(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Skill> {
    Ok(Json(state.service.update_skill(&id, &patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/skills/{id}",
    params(("id" = String, Path, description = "Skill id")),
    responses(
        (status = 200, description = "Skill deleted", body = DeleteResponse),
        (status = 404, description = "Unknown skill", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn delete_skill(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<DeleteResponse> {
    let skill = state.service.delete_skill(&id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        id: skill.id,
    }))
}

#[utoipa::path(
    put,
    path = "/api/skills/order",
    request_body = Vec<SortOrderUpdate>,
    responses(
        (status = 200, description = "All skills reordered", body = ReorderResponse),
        (status = 404, description = "Unknown skill id, nothing applied", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn reorder_skills(
    State(state): State<Arc<ServerState>>,
    Json(updates): Json<Vec<SortOrderUpdate>>,
) -> ApiResult<ReorderResponse> {
    let updated = state.service.update_skill_order(&updates).await?;
    Ok(Json(ReorderResponse { success: true, updated }))
}

// Experiences

#[utoipa::path(
    get,
    path = "/api/experiences",
    responses((status = 200, description = "Experiences with achievements", body = Vec<ExperienceView>)),
    tag = "content"
)]
pub async fn list_experiences(State(state): State<Arc<ServerState>>) -> ApiResult<Vec<ExperienceView>> {
    Ok(Json(state.service.list_experiences().await?))
}

#[utoipa::path(
    post,
    path = "/api/experiences",
    request_body = CreateExperienceRequest,
    responses(
        (status = 200, description = "Experience created", body = ExperienceView),
        (status = 400, description = "Invalid experience", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn create_experience(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CreateExperienceRequest>,
) -> ApiResult<ExperienceView> {
    let view = state
        .service
        .create_experience(request.experience, request.achievements)
        .await?;
    Ok(Json(view))
}

/// Patch an experience. An `achievements` array in the body replaces the
/// whole list; leaving it out keeps the current achievements.
#[utoipa::path(
    put,
    path = "/api/experiences/{id}",
    params(("id" = String, Path, description = "Experience id")),
    responses(
        (status = 200, description = "Experience updated", body = ExperienceView),
        (status = 404, description = "Unknown experience", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn update_experience(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(mut patch): Json<Value>,
) -> ApiResult<ExperienceView> {
    let achievements = take_field::<Vec<AchievementInput>>(&mut patch, "achievements")?;
    let view = state
        .service
        .update_experience(&id, &patch, achievements)
        .await?;
    Ok(Json(view))
}

#[utoipa::path(
    delete,
    path = "/api/experiences/{id}",
    params(("id" = String, Path, description = "Experience id")),
    responses(
        (status = 200, description = "Experience and its achievements deleted", body = DeleteResponse),
        (status = 404, description = "Unknown experience", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn delete_experience(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<DeleteResponse> {
    let experience: Experience = state.service.delete_experience(&id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        id: experience.id,
    }))
}

#[utoipa::path(
    put,
    path = "/api/experiences/order",
    request_body = Vec<SortOrderUpdate>,
    responses(
        (status = 200, description = "All experiences reordered", body = ReorderResponse),
        (status = 404, description = "Unknown experience id, nothing applied", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn reorder_experiences(
    State(state): State<Arc<ServerState>>,
    Json(updates): Json<Vec<SortOrderUpdate>>,
) -> ApiResult<ReorderResponse> {
    let updated = state.service.update_experience_order(&updates).await?;
    Ok(Json(ReorderResponse { success: true, updated }))
}

// Projects

#[utoipa::path(
    get,
    path = "/api/projects",
    responses((status = 200, description = "All projects with technologies and images", body = Vec<ProjectView>)),
    tag = "content"
)]
pub async fn list_projects(State(state): State<Arc<ServerState>>) -> ApiResult<Vec<ProjectView>> {
    Ok(Json(state.service.list_projects().await?))
}

#[utoipa::path(
    get,
    path = "/api/projects/slug/{slug}",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Project", body = ProjectView),
        (status = 404, description = "Unknown slug", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn get_project_by_slug(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> ApiResult<ProjectView> {
    let project = state
        .service
        .get_project_by_slug(&slug)
        .await?
        .ok_or_else(|| DataError::not_found("project", slug))?;
    Ok(Json(project))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = ProjectInput,
    responses(
        (status = 200, description = "Project created", body = ProjectView),
        (status = 409, description = "Slug already taken", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn create_project(
    State(state): State<Arc<ServerState>>,
    Json(input): Json<ProjectInput>,
) -> ApiResult<ProjectView> {
    Ok(Json(state.service.create_project(input).await?))
}

/// Patch a project. `technologies` or `images` in the body replace the
/// corresponding list.
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project updated", body = ProjectView),
        (status = 404, description = "Unknown project", body = ErrorResponse),
        (status = 409, description = "Slug already taken", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn update_project(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(mut patch): Json<Value>,
) -> ApiResult<ProjectView> {
    let technologies = take_field::<Vec<String>>(&mut patch, "technologies")?;
    let images = take_field::<Vec<ProjectImageInput>>(&mut patch, "images")?;
    let view = state
        .service
        .update_project(&id, &patch, technologies, images)
        .await?;
    Ok(Json(view))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project and its children deleted", body = DeleteResponse),
        (status = 404, description = "Unknown project", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn delete_project(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<DeleteResponse> {
    let project: Project = state.service.delete_project(&id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        id: project.id,
    }))
}

#[utoipa::path(
    put,
    path = "/api/projects/order",
    request_body = Vec<SortOrderUpdate>,
    responses(
        (status = 200, description = "All projects reordered", body = ReorderResponse),
        (status = 404, description = "Unknown project id, nothing applied", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn reorder_projects(
    State(state): State<Arc<ServerState>>,
    Json(updates): Json<Vec<SortOrderUpdate>>,
) -> ApiResult<ReorderResponse> {
    let updated = state.service.update_project_order(&updates).await?;
    Ok(Json(ReorderResponse { success: true, updated }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_take_field_splits_children_from_patch() {
        let mut patch = json!({"position": "Lead", "achievements": [{"description": "Shipped"}]});
        let achievements = take_field::<Vec<AchievementInput>>(&mut patch, "achievements")
            .unwrap()
            .unwrap();

        assert_eq!(achievements.len(), 1);
        assert_eq!(patch, json!({"position": "Lead"}));
        assert!(take_field::<Vec<String>>(&mut patch, "technologies").unwrap().is_none());
    }

    #[test]
    fn test_take_field_rejects_bad_shapes() {
        let mut patch = json!({"technologies": "rust"});
        assert!(matches!(
            take_field::<Vec<String>>(&mut patch, "technologies"),
            Err(DataError::InvalidInput(_))
        ));

        let mut not_object = json!([1, 2]);
        assert!(take_field::<Vec<String>>(&mut not_object, "technologies").is_err());
    }
}
