// Profile: a singleton stored under the `profile` key
use super::{now, require_non_empty, Applied, PortfolioData, PortfolioItem, Profile, ProfileInput};
use crate::error::Result;
use crate::store::types::PROFILE_KEY;

impl PortfolioData {
    pub async fn get_profile(&self) -> Result<Option<Profile>> {
        self.read(|tx| tx.get::<Profile>(PROFILE_KEY)).await
    }

    /// Replace the profile, keeping its original creation time
    pub async fn set_profile(&self, input: ProfileInput) -> Result<Applied<Profile>> {
        require_non_empty("name", &input.name)?;

        self.write(|tx| {
            let now = now();
            let created_at = tx
                .get::<Profile>(PROFILE_KEY)?
                .map(|existing| existing.created_at)
                .unwrap_or(now);

            let profile = Profile {
                name: input.name,
                title: input.title,
                bio: input.bio,
                email: input.email,
                location: input.location,
                avatar_url: input.avatar_url,
                resume_url: input.resume_url,
                social_links: input.social_links,
                created_at,
                updated_at: now,
            };

            tx.put(PROFILE_KEY, PortfolioItem::Profile(profile.clone()))?;
            log::info!("Profile updated");
            Ok(profile)
        })
        .await
    }
}
