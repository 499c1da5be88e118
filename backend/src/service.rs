use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::accessor::{DataAccessor, PortfolioCache, PortfolioRead};
use crate::cache::{CacheStatus, MemoryCache};
use crate::config::CacheConfig;
use crate::data::{
    new_id, AchievementInput, Applied, DashboardStats, Experience, ExperienceInput, ExperienceView,
    PortfolioData, PortfolioItem, PortfolioSnapshot, Profile, ProfileInput, Project, ProjectImageInput,
    ProjectInput, ProjectView, Skill, SkillInput, SortOrderUpdate,
};
use crate::error::Result;
use crate::refresh::{CacheRefreshManager, RefreshOutcome};
use crate::store::{PortfolioStore, Record};

/// The portfolio core as one injected object: durable writes, cache
/// write-through, cache-aware reads and the refresh lifecycle.
pub struct PortfolioService {
    data: PortfolioData,
    accessor: DataAccessor,
    refresh: Arc<CacheRefreshManager>,
}

impl PortfolioService {
    /// Service over `store` with a fresh in-memory cache
    pub fn new(config: CacheConfig, store: PortfolioStore) -> Self {
        Self::with_cache(config, store, Arc::new(MemoryCache::<PortfolioItem>::new()))
    }

    pub fn with_cache(config: CacheConfig, store: PortfolioStore, cache: Arc<PortfolioCache>) -> Self {
        let data = PortfolioData::new(store);
        let source = Arc::new(data.clone());
        let accessor = DataAccessor::new(config.clone(), source.clone(), cache.clone());
        let refresh = Arc::new(CacheRefreshManager::new(config, source, cache));

        Self {
            data,
            accessor,
            refresh,
        }
    }

    /// Warm the cache and start periodic refresh
    pub async fn initialize(&self) {
        self.refresh.initialize().await;
    }

    pub async fn shutdown(&self) {
        self.refresh.stop().await;
    }

    pub fn data(&self) -> &PortfolioData {
        &self.data
    }

    async fn mirror<T>(&self, applied: Applied<T>) -> T {
        self.accessor.apply_changes(&applied.changes).await;
        applied.value
    }

    // Reads

    pub async fn health_check(&self) -> bool {
        self.data.store().health_check().await
    }

    pub async fn get_portfolio_data(&self) -> Result<PortfolioSnapshot> {
        self.accessor.get_portfolio_data().await
    }

    pub async fn read_portfolio(&self) -> Result<PortfolioRead> {
        self.accessor.read_portfolio().await
    }

    pub async fn get_profile(&self) -> Result<Option<Profile>> {
        self.data.get_profile().await
    }

    pub async fn list_skills(&self) -> Result<Vec<Skill>> {
        self.data.list_skills().await
    }

    pub async fn list_experiences(&self) -> Result<Vec<ExperienceView>> {
        self.data.get_all_experiences().await
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectView>> {
        self.data.get_all_projects().await
    }

    pub async fn get_project_by_slug(&self, slug: &str) -> Result<Option<ProjectView>> {
        self.data.get_project_by_slug(slug).await
    }

    pub async fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        self.data.get_dashboard_stats().await
    }

    pub async fn get_history(&self, key: &str) -> Result<Vec<Record>> {
        self.data.get_history(key).await
    }

    // Writes

    pub async fn set_profile(&self, input: ProfileInput) -> Result<Profile> {
        let applied = self.data.set_profile(input).await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn create_skill(&self, input: SkillInput) -> Result<Skill> {
        let applied = self.data.create_skill(&new_id(), input).await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn update_skill(&self, id: &str, patch: &Value) -> Result<Skill> {
        let applied = self.data.update_skill(id, patch).await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn delete_skill(&self, id: &str) -> Result<Skill> {
        let applied = self.data.delete_skill(id).await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn update_skill_order(&self, updates: &[SortOrderUpdate]) -> Result<usize> {
        let applied = self.data.update_skill_order(updates).await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn create_experience(
        &self,
        input: ExperienceInput,
        achievements: Vec<AchievementInput>,
    ) -> Result<ExperienceView> {
        let applied = self
            .data
            .create_experience(&new_id(), input, achievements)
            .await?;
        Ok(self.mirror(applied).await)
    }

    /// Patch an experience; a supplied achievement list replaces the old one
    pub async fn update_experience(
        &self,
        id: &str,
        patch: &Value,
        achievements: Option<Vec<AchievementInput>>,
    ) -> Result<ExperienceView> {
        let applied = match achievements {
            Some(achievements) => {
                self.data
                    .update_experience_with_achievements(id, patch, achievements)
                    .await?
            }
            None => self.data.update_experience(id, patch).await?,
        };
        Ok(self.mirror(applied).await)
    }

    pub async fn delete_experience(&self, id: &str) -> Result<Experience> {
        let applied = self.data.delete_experience(id).await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn update_experience_order(&self, updates: &[SortOrderUpdate]) -> Result<usize> {
        let applied = self.data.update_experience_order(updates).await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn create_project(&self, input: ProjectInput) -> Result<ProjectView> {
        let applied = self.data.create_project(&new_id(), input).await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn update_project(
        &self,
        id: &str,
        patch: &Value,
        technologies: Option<Vec<String>>,
        images: Option<Vec<ProjectImageInput>>,
    ) -> Result<ProjectView> {
        let applied = self
            .data
            .update_project(id, patch, technologies, images)
            .await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn delete_project(&self, id: &str) -> Result<Project> {
        let applied = self.data.delete_project(id).await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn update_project_order(&self, updates: &[SortOrderUpdate]) -> Result<usize> {
        let applied = self.data.update_project_order(updates).await?;
        Ok(self.mirror(applied).await)
    }

    pub async fn rollback(&self, key: &str, version: i64) -> Result<Record> {
        let applied = self.data.rollback(key, version).await?;
        Ok(self.mirror(applied).await)
    }

    // Cache administration

    pub async fn get_cache_status(&self) -> Result<CacheStatus> {
        self.refresh.status().await
    }

    pub async fn clear_cache(&self) -> Result<()> {
        self.refresh.clear_cache().await
    }

    pub async fn force_refresh(&self) -> RefreshOutcome {
        self.refresh.force_refresh().await
    }

    pub async fn list_cache_keys(&self) -> Result<BTreeMap<String, PortfolioItem>> {
        self.accessor.list_cache_keys().await
    }
}
