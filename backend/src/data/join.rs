// In-process joins and orderings; the store only offers point lookups and
// per-type listings.
use std::cmp::Ordering;
use std::collections::HashMap;

use super::models::{
    Achievement, Experience, ExperienceView, Project, ProjectImage, ProjectTech, ProjectView, Skill,
};

/// Ascending, with missing values after every present one
pub fn cmp_sort_order(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Proficiency descending (unrated last), then sort_order, then name
pub fn sort_skills(skills: &mut [Skill]) {
    skills.sort_by(|a, b| {
        let proficiency = match (a.proficiency, b.proficiency) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        proficiency
            .then_with(|| cmp_sort_order(a.sort_order, b.sort_order))
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Group achievements under their experience. Achievements whose experience
/// is gone are dropped. Ties on sort_order fall back to creation time and
/// id, so the output never depends on input order.
pub fn attach_achievements(
    mut experiences: Vec<Experience>,
    achievements: Vec<Achievement>,
) -> Vec<ExperienceView> {
    let mut by_experience: HashMap<String, Vec<Achievement>> = HashMap::new();
    for achievement in achievements {
        by_experience
            .entry(achievement.experience_id.clone())
            .or_default()
            .push(achievement);
    }

    experiences.sort_by(|a, b| {
        cmp_sort_order(a.sort_order, b.sort_order)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    experiences
        .into_iter()
        .map(|experience| {
            let mut achievements = by_experience.remove(&experience.id).unwrap_or_default();
            achievements.sort_by(|a, b| {
                cmp_sort_order(a.sort_order, b.sort_order)
                    .then_with(|| a.created_at.cmp(&b.created_at))
                    .then_with(|| a.id.cmp(&b.id))
            });
            ExperienceView {
                experience,
                achievements,
            }
        })
        .collect()
}

/// Attach technologies and gallery images to their projects, dropping orphans
pub fn attach_project_children(
    mut projects: Vec<Project>,
    technologies: Vec<ProjectTech>,
    images: Vec<ProjectImage>,
) -> Vec<ProjectView> {
    let mut tech_by_project: HashMap<String, Vec<ProjectTech>> = HashMap::new();
    for tech in technologies {
        tech_by_project
            .entry(tech.project_id.clone())
            .or_default()
            .push(tech);
    }

    let mut images_by_project: HashMap<String, Vec<ProjectImage>> = HashMap::new();
    for image in images {
        images_by_project
            .entry(image.project_id.clone())
            .or_default()
            .push(image);
    }

    projects.sort_by(|a, b| {
        cmp_sort_order(a.sort_order, b.sort_order)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    projects
        .into_iter()
        .map(|project| {
            let mut techs = tech_by_project.remove(&project.id).unwrap_or_default();
            techs.sort_by(|a, b| {
                a.position
                    .cmp(&b.position)
                    .then_with(|| a.technology.cmp(&b.technology))
            });

            let mut images = images_by_project.remove(&project.id).unwrap_or_default();
            images.sort_by(|a, b| cmp_sort_order(a.sort_order, b.sort_order).then_with(|| a.id.cmp(&b.id)));

            ProjectView {
                project,
                technologies: techs.into_iter().map(|t| t.technology).collect(),
                images,
            }
        })
        .collect()
}
