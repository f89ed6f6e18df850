//! Mock `EpisodeRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use panelsmith_core::error::DomainError;
use panelsmith_core::record::Episode;
use panelsmith_core::repository::EpisodeRepository;

/// An in-memory episode repository that records every `save_episodes` batch.
///
/// Saves upsert by id, like a real store. When built with
/// [`RecordingEpisodeRepository::rejecting_saves`], every save fails with an
/// infrastructure error and leaves the episodes untouched.
#[derive(Debug)]
pub struct RecordingEpisodeRepository {
    episodes: Mutex<Vec<Episode>>,
    saved: Mutex<Vec<Vec<Episode>>>,
    reject_saves: bool,
}

impl RecordingEpisodeRepository {
    /// Create a repository seeded with `episodes`.
    #[must_use]
    pub fn new(episodes: Vec<Episode>) -> Self {
        Self {
            episodes: Mutex::new(episodes),
            saved: Mutex::new(Vec::new()),
            reject_saves: false,
        }
    }

    /// Create a seeded repository whose saves always fail.
    #[must_use]
    pub fn rejecting_saves(episodes: Vec<Episode>) -> Self {
        Self {
            reject_saves: true,
            ..Self::new(episodes)
        }
    }

    /// Returns a snapshot of the stored episodes.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn episodes(&self) -> Vec<Episode> {
        self.episodes.lock().unwrap().clone()
    }

    /// Returns every batch passed to `save_episodes`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_batches(&self) -> Vec<Vec<Episode>> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl EpisodeRepository for RecordingEpisodeRepository {
    async fn get_all_episodes(&self) -> Result<Vec<Episode>, DomainError> {
        Ok(self.episodes())
    }

    async fn get_max_panel_id(&self) -> Result<i64, DomainError> {
        Ok(self
            .episodes
            .lock()
            .unwrap()
            .iter()
            .map(Episode::max_panel_id)
            .max()
            .unwrap_or(0))
    }

    async fn get_max_episode_id(&self) -> Result<i64, DomainError> {
        Ok(self
            .episodes
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.id)
            .max()
            .unwrap_or(0))
    }

    async fn save_episodes(&self, episodes: &[Episode]) -> Result<(), DomainError> {
        if self.reject_saves {
            return Err(DomainError::Infrastructure("disk full".into()));
        }
        self.saved.lock().unwrap().push(episodes.to_vec());
        let mut stored = self.episodes.lock().unwrap();
        for episode in episodes {
            match stored.iter_mut().find(|e| e.id == episode.id) {
                Some(existing) => *existing = episode.clone(),
                None => stored.push(episode.clone()),
            }
        }
        Ok(())
    }
}

/// An episode repository that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingEpisodeRepository;

#[async_trait]
impl EpisodeRepository for FailingEpisodeRepository {
    async fn get_all_episodes(&self) -> Result<Vec<Episode>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn get_max_panel_id(&self) -> Result<i64, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn get_max_episode_id(&self) -> Result<i64, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save_episodes(&self, _episodes: &[Episode]) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
