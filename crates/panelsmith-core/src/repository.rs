//! Episode repository abstraction.
//!
//! The engine never decides how episodes are stored. It reads the whole
//! collection, asks for the current id maxima, and hands back the episodes it
//! created or changed.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::record::Episode;

/// Persistence collaborator for the production store.
#[async_trait]
pub trait EpisodeRepository: Send + Sync {
    /// Load every episode, ordered by id.
    async fn get_all_episodes(&self) -> Result<Vec<Episode>, DomainError>;

    /// Highest panel id ever stored, or 0 for an empty store.
    async fn get_max_panel_id(&self) -> Result<i64, DomainError>;

    /// Highest episode id ever stored, or 0 for an empty store.
    async fn get_max_episode_id(&self) -> Result<i64, DomainError>;

    /// Insert or replace the given episodes (matched by id) as one unit.
    /// Either every episode is saved or none is.
    async fn save_episodes(&self, episodes: &[Episode]) -> Result<(), DomainError>;

    /// Load a single episode by id.
    async fn get_episode(&self, episode_id: i64) -> Result<Option<Episode>, DomainError> {
        Ok(self
            .get_all_episodes()
            .await?
            .into_iter()
            .find(|e| e.id == episode_id))
    }
}
