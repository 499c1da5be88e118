use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::Result;
use crate::store::{Record, RecordType, TypeCount};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    /// 1 (basic) to 5 (expert); unrated skills sort after rated ones
    pub proficiency: Option<u8>,
    #[serde(default)]
    pub is_featured: bool,
    pub sort_order: Option<i64>,
    pub icon: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Achievement {
    pub id: String,
    pub experience_id: String,
    pub description: String,
    pub sort_order: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub sort_order: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One technology tag of a project; one record per (project, technology)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectTech {
    pub project_id: String,
    pub technology: String,
    /// Index in the list the caller supplied
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectImage {
    pub id: String,
    pub project_id: String,
    pub url: String,
    pub caption: Option<String>,
    pub sort_order: Option<i64>,
}

/// A stored value tagged with its record type.
///
/// Built from the record's explicit `type` column, never inferred from the
/// shape of the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PortfolioItem {
    Profile(Profile),
    Skill(Skill),
    Experience(Experience),
    Achievement(Achievement),
    Project(Project),
    ProjectTech(ProjectTech),
    ProjectImage(ProjectImage),
}

impl PortfolioItem {
    pub fn record_type(&self) -> RecordType {
        match self {
            PortfolioItem::Profile(_) => RecordType::Profile,
            PortfolioItem::Skill(_) => RecordType::Skill,
            PortfolioItem::Experience(_) => RecordType::Experience,
            PortfolioItem::Achievement(_) => RecordType::Achievement,
            PortfolioItem::Project(_) => RecordType::Project,
            PortfolioItem::ProjectTech(_) => RecordType::ProjectTech,
            PortfolioItem::ProjectImage(_) => RecordType::ProjectImage,
        }
    }

    pub fn from_parts(record_type: RecordType, value: Value) -> Result<Self> {
        Ok(match record_type {
            RecordType::Profile => PortfolioItem::Profile(serde_json::from_value(value)?),
            RecordType::Skill => PortfolioItem::Skill(serde_json::from_value(value)?),
            RecordType::Experience => PortfolioItem::Experience(serde_json::from_value(value)?),
            RecordType::Achievement => PortfolioItem::Achievement(serde_json::from_value(value)?),
            RecordType::Project => PortfolioItem::Project(serde_json::from_value(value)?),
            RecordType::ProjectTech => PortfolioItem::ProjectTech(serde_json::from_value(value)?),
            RecordType::ProjectImage => PortfolioItem::ProjectImage(serde_json::from_value(value)?),
        })
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        Self::from_parts(record.record_type, record.value.clone())
    }

    /// The untagged payload as stored in the `value` column
    pub fn to_value(&self) -> Result<Value> {
        Ok(match self {
            PortfolioItem::Profile(v) => serde_json::to_value(v)?,
            PortfolioItem::Skill(v) => serde_json::to_value(v)?,
            PortfolioItem::Experience(v) => serde_json::to_value(v)?,
            PortfolioItem::Achievement(v) => serde_json::to_value(v)?,
            PortfolioItem::Project(v) => serde_json::to_value(v)?,
            PortfolioItem::ProjectTech(v) => serde_json::to_value(v)?,
            PortfolioItem::ProjectImage(v) => serde_json::to_value(v)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExperienceView {
    #[serde(flatten)]
    pub experience: Experience,
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub technologies: Vec<String>,
    pub images: Vec<ProjectImage>,
}

/// The nested shape served to the public site
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PortfolioSnapshot {
    pub profile: Option<Profile>,
    pub skills: Vec<Skill>,
    pub experiences: Vec<ExperienceView>,
    pub projects: Vec<ProjectView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub counts: BTreeMap<RecordType, TypeCount>,
    pub featured_skills: usize,
    pub published_projects: usize,
    pub total_achievements: usize,
    pub last_updated: Option<i64>,
}

// Write inputs. Ids and timestamps are assigned outside the caller's payload.

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProfileInput {
    pub name: String,
    pub title: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SkillInput {
    pub name: String,
    pub category: Option<String>,
    pub proficiency: Option<u8>,
    #[serde(default)]
    pub is_featured: bool,
    pub sort_order: Option<i64>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExperienceInput {
    pub company: String,
    pub position: String,
    pub location: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AchievementInput {
    pub description: String,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProjectInput {
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub images: Vec<ProjectImageInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProjectImageInput {
    pub url: String,
    pub caption: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct SortOrderUpdate {
    pub id: String,
    pub sort_order: i64,
}
