// Projects with their technology tags and gallery images.
//
// Technologies are one record per (project, technology) so a tag can be
// added or dropped on its own; both child collections are replaced
// wholesale when a write supplies them.
use serde_json::Value;

use super::join::attach_project_children;
use super::{
    decode_patched, merge_patch, new_id, now, require_non_empty, Applied, DataTx, PortfolioData,
    PortfolioItem, Project, ProjectImage, ProjectImageInput, ProjectInput, ProjectTech,
    ProjectView,
};
use crate::error::{DataError, Result};
use crate::store::types::{project_image_key, project_key, project_tech_key};
use crate::store::RecordType;

const PROTECTED_FIELDS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "technologies",
    "images",
];

fn validate(project: &Project) -> Result<()> {
    require_non_empty("title", &project.title)?;
    require_non_empty("slug", &project.slug)?;
    if project.slug.chars().any(char::is_whitespace) {
        return Err(DataError::InvalidInput(format!(
            "slug '{}' must not contain whitespace",
            project.slug
        )));
    }
    Ok(())
}

/// Slugs are unique among active projects
pub(super) fn ensure_unique_slug(tx: &DataTx<'_>, slug: &str, project_id: &str) -> Result<()> {
    let taken = tx
        .list::<Project>(RecordType::Project)?
        .into_iter()
        .any(|p| p.slug == slug && p.id != project_id);

    if taken {
        return Err(DataError::Conflict(format!("slug '{}' is already in use", slug)));
    }
    Ok(())
}

fn technologies_of(tx: &DataTx<'_>, project_id: &str) -> Result<Vec<ProjectTech>> {
    Ok(tx
        .list::<ProjectTech>(RecordType::ProjectTech)?
        .into_iter()
        .filter(|t| t.project_id == project_id)
        .collect())
}

fn images_of(tx: &DataTx<'_>, project_id: &str) -> Result<Vec<ProjectImage>> {
    Ok(tx
        .list::<ProjectImage>(RecordType::ProjectImage)?
        .into_iter()
        .filter(|i| i.project_id == project_id)
        .collect())
}

fn replace_technologies(tx: &mut DataTx<'_>, project_id: &str, technologies: Vec<String>) -> Result<()> {
    for existing in technologies_of(tx, project_id)? {
        tx.remove(&project_tech_key(project_id, &existing.technology))?;
    }

    let mut seen = Vec::with_capacity(technologies.len());
    for technology in technologies {
        let technology = technology.trim().to_string();
        if technology.is_empty() || seen.contains(&technology) {
            continue;
        }

        let tech = ProjectTech {
            project_id: project_id.to_string(),
            technology: technology.clone(),
            position: seen.len() as i64,
        };
        tx.put(
            &project_tech_key(project_id, &technology),
            PortfolioItem::ProjectTech(tech),
        )?;
        seen.push(technology);
    }

    Ok(())
}

fn replace_images(tx: &mut DataTx<'_>, project_id: &str, images: Vec<ProjectImageInput>) -> Result<()> {
    for existing in images_of(tx, project_id)? {
        tx.remove(&project_image_key(&existing.id))?;
    }

    for (index, input) in images.into_iter().enumerate() {
        require_non_empty("image url", &input.url)?;
        let image = ProjectImage {
            id: new_id(),
            project_id: project_id.to_string(),
            url: input.url,
            caption: input.caption,
            sort_order: input.sort_order.or(Some(index as i64)),
        };
        tx.put(&project_image_key(&image.id), PortfolioItem::ProjectImage(image))?;
    }

    Ok(())
}

fn project_view(tx: &DataTx<'_>, project: Project) -> Result<ProjectView> {
    let technologies = technologies_of(tx, &project.id)?;
    let images = images_of(tx, &project.id)?;
    attach_project_children(vec![project], technologies, images)
        .pop()
        .ok_or_else(|| DataError::InvalidInput("project vanished while attaching children".to_string()))
}

impl PortfolioData {
    /// Every active project regardless of status, in `sort_order`
    pub async fn get_all_projects(&self) -> Result<Vec<ProjectView>> {
        let (projects, technologies, images) = self
            .read(|tx| {
                Ok((
                    tx.list::<Project>(RecordType::Project)?,
                    tx.list::<ProjectTech>(RecordType::ProjectTech)?,
                    tx.list::<ProjectImage>(RecordType::ProjectImage)?,
                ))
            })
            .await?;

        Ok(attach_project_children(projects, technologies, images))
    }

    pub async fn get_project(&self, id: &str) -> Result<Option<ProjectView>> {
        self.read(|tx| match tx.get::<Project>(&project_key(id))? {
            Some(project) => Ok(Some(project_view(tx, project)?)),
            None => Ok(None),
        })
        .await
    }

    pub async fn get_project_by_slug(&self, slug: &str) -> Result<Option<ProjectView>> {
        self.read(|tx| {
            let project = tx
                .list::<Project>(RecordType::Project)?
                .into_iter()
                .find(|p| p.slug == slug);

            match project {
                Some(project) => Ok(Some(project_view(tx, project)?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn create_project(&self, id: &str, input: ProjectInput) -> Result<Applied<ProjectView>> {
        let now = now();
        let project = Project {
            id: id.to_string(),
            slug: input.slug.trim().to_string(),
            title: input.title,
            summary: input.summary,
            description: input.description,
            status: input.status,
            repo_url: input.repo_url,
            live_url: input.live_url,
            thumbnail_url: input.thumbnail_url,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        };
        validate(&project)?;

        self.write(|tx| {
            let key = project_key(id);
            if tx.get_value(&key)?.is_some() {
                return Err(DataError::Conflict(format!("project {} already exists", id)));
            }
            ensure_unique_slug(tx, &project.slug, id)?;

            tx.put(&key, PortfolioItem::Project(project.clone()))?;
            replace_technologies(tx, id, input.technologies)?;
            replace_images(tx, id, input.images)?;
            log::info!("Created project {} ({})", project.slug, id);

            project_view(tx, project)
        })
        .await
    }

    /// Patch the project and, when supplied, replace its technologies and images
    pub async fn update_project(
        &self,
        id: &str,
        patch: &Value,
        technologies: Option<Vec<String>>,
        images: Option<Vec<ProjectImageInput>>,
    ) -> Result<Applied<ProjectView>> {
        self.write(|tx| {
            let key = project_key(id);
            let mut value = tx
                .get_value(&key)?
                .ok_or_else(|| DataError::not_found("project", id))?;

            merge_patch(&mut value, patch, PROTECTED_FIELDS)?;
            let mut project: Project = decode_patched(value)?;
            project.slug = project.slug.trim().to_string();
            project.updated_at = now();
            validate(&project)?;
            ensure_unique_slug(tx, &project.slug, id)?;

            tx.put(&key, PortfolioItem::Project(project.clone()))?;
            if let Some(technologies) = technologies {
                replace_technologies(tx, id, technologies)?;
            }
            if let Some(images) = images {
                replace_images(tx, id, images)?;
            }

            project_view(tx, project)
        })
        .await
    }

    /// Deactivate the project together with its technologies and images
    pub async fn delete_project(&self, id: &str) -> Result<Applied<Project>> {
        self.write(|tx| {
            for tech in technologies_of(tx, id)? {
                tx.remove(&project_tech_key(id, &tech.technology))?;
            }
            for image in images_of(tx, id)? {
                tx.remove(&project_image_key(&image.id))?;
            }

            let removed = tx
                .remove(&project_key(id))?
                .ok_or_else(|| DataError::not_found("project", id))?;
            Ok(serde_json::from_value(removed.value)?)
        })
        .await
    }
}
