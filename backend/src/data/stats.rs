// Bulk operations spanning every record type: reordering, dashboard stats,
// full dataset reads and version history.
use serde_json::json;

use super::join::attach_achievements;
use super::projects::ensure_unique_slug;
use super::{
    now, Achievement, Applied, DashboardStats, Experience, PortfolioData, PortfolioItem, Project,
    ProjectStatus, Skill, SortOrderUpdate,
};
use crate::error::{DataError, Result};
use crate::store::types::{experience_key, project_key, skill_key};
use crate::store::{Record, RecordType};

impl PortfolioData {
    pub async fn update_skill_order(&self, updates: &[SortOrderUpdate]) -> Result<Applied<usize>> {
        self.reorder(RecordType::Skill, "skill", skill_key, updates).await
    }

    pub async fn update_experience_order(&self, updates: &[SortOrderUpdate]) -> Result<Applied<usize>> {
        self.reorder(RecordType::Experience, "experience", experience_key, updates)
            .await
    }

    pub async fn update_project_order(&self, updates: &[SortOrderUpdate]) -> Result<Applied<usize>> {
        self.reorder(RecordType::Project, "project", project_key, updates)
            .await
    }

    /// Write a new version of every listed record with its new `sort_order`.
    /// One unknown id fails the whole batch.
    async fn reorder(
        &self,
        record_type: RecordType,
        kind: &'static str,
        key_for: fn(&str) -> String,
        updates: &[SortOrderUpdate],
    ) -> Result<Applied<usize>> {
        self.write(|tx| {
            let now = now();
            for update in updates {
                let key = key_for(&update.id);
                let mut value = tx
                    .get_value(&key)?
                    .ok_or_else(|| DataError::not_found(kind, update.id.as_str()))?;

                let Some(fields) = value.as_object_mut() else {
                    return Err(DataError::InvalidInput(format!(
                        "stored {} {} is not an object",
                        kind, update.id
                    )));
                };
                fields.insert("sort_order".to_string(), json!(update.sort_order));
                fields.insert("updated_at".to_string(), json!(now));

                tx.put(&key, PortfolioItem::from_parts(record_type, value)?)?;
            }

            log::info!("Reordered {} {} records", updates.len(), kind);
            Ok(updates.len())
        })
        .await
    }

    pub async fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        let (counts, skills, experiences, achievements, projects) = self
            .read(|tx| {
                Ok((
                    tx.counts()?,
                    tx.list::<Skill>(RecordType::Skill)?,
                    tx.list::<Experience>(RecordType::Experience)?,
                    tx.list::<Achievement>(RecordType::Achievement)?,
                    tx.list::<Project>(RecordType::Project)?,
                ))
            })
            .await?;

        let total_achievements = attach_achievements(experiences, achievements)
            .iter()
            .map(|e| e.achievements.len())
            .sum();

        Ok(DashboardStats {
            last_updated: counts.values().filter_map(|c| c.last_updated).max(),
            featured_skills: skills.iter().filter(|s| s.is_featured).count(),
            published_projects: projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Published)
                .count(),
            total_achievements,
            counts,
        })
    }

    /// The whole active dataset as `(key, item)` pairs, read in one snapshot.
    ///
    /// Rows that no longer decode are skipped with a warning instead of
    /// failing the read.
    pub async fn fetch_all_items(&self) -> Result<Vec<(String, PortfolioItem)>> {
        let records = self
            .read(|tx| {
                let mut records = Vec::new();
                for record_type in RecordType::ALL {
                    records.extend(tx.list_records(record_type)?);
                }
                Ok(records)
            })
            .await?;

        let mut items = Vec::with_capacity(records.len());
        for record in records {
            match PortfolioItem::from_record(&record) {
                Ok(item) => items.push((record.key, item)),
                Err(e) => log::warn!("Skipping undecodable record {} v{}: {}", record.key, record.version, e),
            }
        }

        Ok(items)
    }

    pub async fn get_history(&self, key: &str) -> Result<Vec<Record>> {
        let history = self.read(|tx| tx.history(key)).await?;
        if history.is_empty() {
            return Err(DataError::not_found("record", key));
        }
        Ok(history)
    }

    /// Reactivate an earlier version of `key`. A project whose old slug now
    /// belongs to another active project is refused with `Conflict`.
    pub async fn rollback(&self, key: &str, version: i64) -> Result<Applied<Record>> {
        self.write(|tx| {
            let record = tx.activate_version(key, version)?;
            if record.record_type == RecordType::Project {
                let project: Project = serde_json::from_value(record.value.clone())?;
                ensure_unique_slug(tx, &project.slug, &project.id)?;
            }
            log::info!("Rolled back {} to version {}", key, version);
            Ok(record)
        })
        .await
    }
}
