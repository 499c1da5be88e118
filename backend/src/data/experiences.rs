// Experiences and their achievements.
//
// Achievements are separate records pointing at `experience_id`; updates
// replace the whole achievement list rather than diffing it.
use serde_json::Value;

use super::join::attach_achievements;
use super::{
    decode_patched, merge_patch, new_id, now, require_non_empty, Achievement, AchievementInput,
    Applied, DataTx, Experience, ExperienceInput, ExperienceView, PortfolioData, PortfolioItem,
};
use crate::error::{DataError, Result};
use crate::store::types::{achievement_key, experience_key};
use crate::store::RecordType;

const PROTECTED_FIELDS: &[&str] = &["id", "created_at", "updated_at", "achievements"];

fn validate(experience: &Experience) -> Result<()> {
    require_non_empty("company", &experience.company)?;
    require_non_empty("position", &experience.position)
}

/// Active achievements belonging to `experience_id`
fn achievements_of(tx: &DataTx<'_>, experience_id: &str) -> Result<Vec<Achievement>> {
    Ok(tx
        .list::<Achievement>(RecordType::Achievement)?
        .into_iter()
        .filter(|a| a.experience_id == experience_id)
        .collect())
}

/// Deactivate every achievement of the experience and insert `inputs` as
/// fresh records
fn replace_achievements(
    tx: &mut DataTx<'_>,
    experience_id: &str,
    inputs: Vec<AchievementInput>,
) -> Result<Vec<Achievement>> {
    for existing in achievements_of(tx, experience_id)? {
        tx.remove(&achievement_key(&existing.id))?;
    }

    let now = now();
    let mut inserted = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        require_non_empty("achievement description", &input.description)?;
        let achievement = Achievement {
            id: new_id(),
            experience_id: experience_id.to_string(),
            description: input.description,
            sort_order: input.sort_order.or(Some(index as i64)),
            created_at: now,
        };
        tx.put(
            &achievement_key(&achievement.id),
            PortfolioItem::Achievement(achievement.clone()),
        )?;
        inserted.push(achievement);
    }

    inserted.sort_by(|a, b| super::join::cmp_sort_order(a.sort_order, b.sort_order));
    Ok(inserted)
}

impl PortfolioData {
    /// All experiences with achievements attached, both in `sort_order`
    pub async fn get_all_experiences(&self) -> Result<Vec<ExperienceView>> {
        let (experiences, achievements) = self
            .read(|tx| {
                Ok((
                    tx.list::<Experience>(RecordType::Experience)?,
                    tx.list::<Achievement>(RecordType::Achievement)?,
                ))
            })
            .await?;

        Ok(attach_achievements(experiences, achievements))
    }

    pub async fn get_experience(&self, id: &str) -> Result<Option<ExperienceView>> {
        self.read(|tx| {
            let Some(experience) = tx.get::<Experience>(&experience_key(id))? else {
                return Ok(None);
            };
            let achievements = achievements_of(tx, id)?;
            Ok(attach_achievements(vec![experience], achievements).pop())
        })
        .await
    }

    pub async fn create_experience(
        &self,
        id: &str,
        input: ExperienceInput,
        achievements: Vec<AchievementInput>,
    ) -> Result<Applied<ExperienceView>> {
        let now = now();
        let experience = Experience {
            id: id.to_string(),
            company: input.company,
            position: input.position,
            location: input.location,
            start_date: input.start_date,
            end_date: input.end_date,
            description: input.description,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        };
        validate(&experience)?;

        self.write(|tx| {
            let key = experience_key(id);
            if tx.get_value(&key)?.is_some() {
                return Err(DataError::Conflict(format!("experience {} already exists", id)));
            }

            tx.put(&key, PortfolioItem::Experience(experience.clone()))?;
            let achievements = replace_achievements(tx, id, achievements)?;
            log::info!(
                "Created experience {} at {} with {} achievements",
                id,
                experience.company,
                achievements.len()
            );

            Ok(ExperienceView {
                experience,
                achievements,
            })
        })
        .await
    }

    /// Patch the experience fields only; achievements are left alone
    pub async fn update_experience(&self, id: &str, patch: &Value) -> Result<Applied<ExperienceView>> {
        self.write(|tx| {
            let experience = patch_experience(tx, id, patch)?;
            let achievements = achievements_of(tx, id)?;
            attach_achievements(vec![experience], achievements)
                .pop()
                .ok_or_else(|| DataError::not_found("experience", id))
        })
        .await
    }

    /// Atomically bump the experience and replace its whole achievement list
    pub async fn update_experience_with_achievements(
        &self,
        id: &str,
        patch: &Value,
        achievements: Vec<AchievementInput>,
    ) -> Result<Applied<ExperienceView>> {
        self.write(|tx| {
            let experience = patch_experience(tx, id, patch)?;
            let achievements = replace_achievements(tx, id, achievements)?;
            log::info!(
                "Updated experience {} with {} achievements",
                id,
                achievements.len()
            );

            Ok(ExperienceView {
                experience,
                achievements,
            })
        })
        .await
    }

    /// Deactivate the experience and every achievement under it
    pub async fn delete_experience(&self, id: &str) -> Result<Applied<Experience>> {
        self.write(|tx| {
            for achievement in achievements_of(tx, id)? {
                tx.remove(&achievement_key(&achievement.id))?;
            }

            let removed = tx
                .remove(&experience_key(id))?
                .ok_or_else(|| DataError::not_found("experience", id))?;
            Ok(serde_json::from_value(removed.value)?)
        })
        .await
    }
}

fn patch_experience(tx: &mut DataTx<'_>, id: &str, patch: &Value) -> Result<Experience> {
    let key = experience_key(id);
    let mut value = tx
        .get_value(&key)?
        .ok_or_else(|| DataError::not_found("experience", id))?;

    merge_patch(&mut value, patch, PROTECTED_FIELDS)?;
    let mut experience: Experience = decode_patched(value)?;
    experience.updated_at = now();
    validate(&experience)?;

    tx.put(&key, PortfolioItem::Experience(experience.clone()))?;
    Ok(experience)
}
