use serde_json::Value;

use super::{
    decode_patched, merge_patch, now, require_non_empty, Applied, PortfolioData, PortfolioItem,
    Skill, SkillInput,
};
use crate::error::{DataError, Result};
use crate::store::types::skill_key;
use crate::store::RecordType;

/// Fields a patch can never overwrite
const PROTECTED_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

fn validate(skill: &Skill) -> Result<()> {
    require_non_empty("name", &skill.name)?;
    if let Some(proficiency) = skill.proficiency {
        if !(1..=5).contains(&proficiency) {
            return Err(DataError::InvalidInput(format!(
                "proficiency must be between 1 and 5, got {}",
                proficiency
            )));
        }
    }
    Ok(())
}

impl PortfolioData {
    pub async fn get_skill(&self, id: &str) -> Result<Option<Skill>> {
        self.read(|tx| tx.get::<Skill>(&skill_key(id))).await
    }

    /// Every active skill, featured or not, in display order
    pub async fn list_skills(&self) -> Result<Vec<Skill>> {
        let mut skills = self.read(|tx| tx.list::<Skill>(RecordType::Skill)).await?;
        super::join::sort_skills(&mut skills);
        Ok(skills)
    }

    pub async fn create_skill(&self, id: &str, input: SkillInput) -> Result<Applied<Skill>> {
        let now = now();
        let skill = Skill {
            id: id.to_string(),
            name: input.name,
            category: input.category,
            proficiency: input.proficiency,
            is_featured: input.is_featured,
            sort_order: input.sort_order,
            icon: input.icon,
            created_at: now,
            updated_at: now,
        };
        validate(&skill)?;

        self.write(|tx| {
            let key = skill_key(id);
            if tx.get_value(&key)?.is_some() {
                return Err(DataError::Conflict(format!("skill {} already exists", id)));
            }
            tx.put(&key, PortfolioItem::Skill(skill.clone()))?;
            log::info!("Created skill {} ({})", skill.name, id);
            Ok(skill)
        })
        .await
    }

    /// Merge `patch` over the stored skill; `id` and `created_at` survive
    pub async fn update_skill(&self, id: &str, patch: &Value) -> Result<Applied<Skill>> {
        self.write(|tx| {
            let key = skill_key(id);
            let mut value = tx
                .get_value(&key)?
                .ok_or_else(|| DataError::not_found("skill", id))?;

            merge_patch(&mut value, patch, PROTECTED_FIELDS)?;
            let mut skill: Skill = decode_patched(value)?;
            skill.updated_at = now();
            validate(&skill)?;

            tx.put(&key, PortfolioItem::Skill(skill.clone()))?;
            Ok(skill)
        })
        .await
    }

    pub async fn delete_skill(&self, id: &str) -> Result<Applied<Skill>> {
        self.write(|tx| {
            let removed = tx
                .remove(&skill_key(id))?
                .ok_or_else(|| DataError::not_found("skill", id))?;
            Ok(serde_json::from_value(removed.value)?)
        })
        .await
    }
}
