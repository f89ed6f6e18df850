//! In-memory implementation of the `EpisodeRepository` trait.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use panelsmith_core::error::DomainError;
use panelsmith_core::record::Episode;
use panelsmith_core::repository::EpisodeRepository;

/// Episode store held in process memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryEpisodeRepository {
    episodes: RwLock<Vec<Episode>>,
}

fn poisoned<T>(_: PoisonError<T>) -> DomainError {
    DomainError::Infrastructure("episode store lock poisoned".into())
}

impl InMemoryEpisodeRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `episodes`.
    #[must_use]
    pub fn with_episodes(episodes: Vec<Episode>) -> Self {
        Self {
            episodes: RwLock::new(episodes),
        }
    }
}

#[async_trait]
impl EpisodeRepository for InMemoryEpisodeRepository {
    async fn get_all_episodes(&self) -> Result<Vec<Episode>, DomainError> {
        let mut episodes = self.episodes.read().map_err(poisoned)?.clone();
        episodes.sort_by_key(|e| e.id);
        Ok(episodes)
    }

    async fn get_max_panel_id(&self) -> Result<i64, DomainError> {
        let episodes = self.episodes.read().map_err(poisoned)?;
        Ok(episodes
            .iter()
            .map(Episode::max_panel_id)
            .max()
            .unwrap_or(0))
    }

    async fn get_max_episode_id(&self) -> Result<i64, DomainError> {
        let episodes = self.episodes.read().map_err(poisoned)?;
        Ok(episodes.iter().map(|e| e.id).max().unwrap_or(0))
    }

    async fn save_episodes(&self, episodes: &[Episode]) -> Result<(), DomainError> {
        let mut stored = self.episodes.write().map_err(poisoned)?;
        for episode in episodes {
            match stored.iter_mut().find(|e| e.id == episode.id) {
                Some(existing) => *existing = episode.clone(),
                None => stored.push(episode.clone()),
            }
        }
        debug!(count = episodes.len(), "episodes saved");
        Ok(())
    }

    async fn get_episode(&self, episode_id: i64) -> Result<Option<Episode>, DomainError> {
        let episodes = self.episodes.read().map_err(poisoned)?;
        Ok(episodes.iter().find(|e| e.id == episode_id).cloned())
    }
}
