use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Entity kind carried by every row of `portfolio_data`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Profile,
    Skill,
    Experience,
    Achievement,
    Project,
    ProjectTech,
    ProjectImage,
}

impl RecordType {
    pub const ALL: [RecordType; 7] = [
        RecordType::Profile,
        RecordType::Skill,
        RecordType::Experience,
        RecordType::Achievement,
        RecordType::Project,
        RecordType::ProjectTech,
        RecordType::ProjectImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Profile => "profile",
            RecordType::Skill => "skill",
            RecordType::Experience => "experience",
            RecordType::Achievement => "achievement",
            RecordType::Project => "project",
            RecordType::ProjectTech => "project_tech",
            RecordType::ProjectImage => "project_image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "profile" => Some(RecordType::Profile),
            "skill" => Some(RecordType::Skill),
            "experience" => Some(RecordType::Experience),
            "achievement" => Some(RecordType::Achievement),
            "project" => Some(RecordType::Project),
            "project_tech" => Some(RecordType::ProjectTech),
            "project_image" => Some(RecordType::ProjectImage),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One versioned row of the `portfolio_data` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Record {
    pub id: i64,
    pub key: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[schema(value_type = Object)]
    pub value: Value,
    pub version: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Active row count and most recent update for one record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TypeCount {
    pub count: i64,
    pub last_updated: Option<i64>,
}

pub const PROFILE_KEY: &str = "profile";

pub fn skill_key(id: &str) -> String {
    format!("skill:{}", id)
}

pub fn experience_key(id: &str) -> String {
    format!("experience:{}", id)
}

pub fn achievement_key(id: &str) -> String {
    format!("achievement:{}", id)
}

pub fn project_key(id: &str) -> String {
    format!("project:{}", id)
}

pub fn project_tech_key(project_id: &str, technology: &str) -> String {
    format!("project_tech:{}:{}", project_id, technology)
}

pub fn project_image_key(id: &str) -> String {
    format!("project_image:{}", id)
}
