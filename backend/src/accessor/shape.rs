use crate::data::join::{attach_achievements, attach_project_children, sort_skills};
use crate::data::{PortfolioItem, PortfolioSnapshot, ProjectStatus};

/// Turn a flat bag of tagged items into the public portfolio shape.
///
/// Only featured skills and published projects are kept. Children whose
/// parent is missing are dropped.
pub fn shape_portfolio<I>(items: I) -> PortfolioSnapshot
where
    I: IntoIterator<Item = PortfolioItem>,
{
    let mut profile = None;
    let mut skills = Vec::new();
    let mut experiences = Vec::new();
    let mut achievements = Vec::new();
    let mut projects = Vec::new();
    let mut technologies = Vec::new();
    let mut images = Vec::new();

    for item in items {
        match item {
            PortfolioItem::Profile(p) => {
                if profile.is_none() {
                    profile = Some(p);
                }
            }
            PortfolioItem::Skill(s) if s.is_featured => skills.push(s),
            PortfolioItem::Skill(_) => {}
            PortfolioItem::Experience(e) => experiences.push(e),
            PortfolioItem::Achievement(a) => achievements.push(a),
            PortfolioItem::Project(p) if p.status == ProjectStatus::Published => projects.push(p),
            PortfolioItem::Project(_) => {}
            PortfolioItem::ProjectTech(t) => technologies.push(t),
            PortfolioItem::ProjectImage(i) => images.push(i),
        }
    }

    sort_skills(&mut skills);

    PortfolioSnapshot {
        profile,
        skills,
        experiences: attach_achievements(experiences, achievements),
        projects: attach_project_children(projects, technologies, images),
    }
}
