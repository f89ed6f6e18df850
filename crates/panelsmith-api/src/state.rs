//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use panelsmith_breakdown::domain::breakdown::Breakdown;
use panelsmith_breakdown::domain::entities::EntityExtractor;
use panelsmith_core::clock::Clock;
use panelsmith_core::error::DomainError;
use panelsmith_core::repository::EpisodeRepository;
use panelsmith_production::application::write_lock::StoreWriteLock;
use panelsmith_production::domain::workflow::TransitionPolicy;
use uuid::Uuid;

/// Breakdowns composed but not yet committed, keyed by import id.
#[derive(Debug, Clone, Default)]
pub struct PendingBreakdowns {
    inner: Arc<Mutex<HashMap<Uuid, Breakdown>>>,
}

impl PendingBreakdowns {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Breakdown>>, DomainError> {
        self.inner
            .lock()
            .map_err(|_| DomainError::Infrastructure("pending breakdowns lock poisoned".into()))
    }

    /// Stages `breakdown` under a fresh import id and returns the id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn stage(&self, breakdown: Breakdown) -> Result<Uuid, DomainError> {
        let import_id = Uuid::new_v4();
        self.lock()?.insert(import_id, breakdown);
        Ok(import_id)
    }

    /// Returns a copy of the staged breakdown.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ImportNotFound` if nothing is staged under
    /// `import_id`.
    pub fn get(&self, import_id: Uuid) -> Result<Breakdown, DomainError> {
        self.lock()?
            .get(&import_id)
            .cloned()
            .ok_or(DomainError::ImportNotFound(import_id))
    }

    /// Removes and returns the staged breakdown so only one commit can run
    /// for it at a time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ImportNotFound` if nothing is staged under
    /// `import_id`.
    pub fn take(&self, import_id: Uuid) -> Result<Breakdown, DomainError> {
        self.lock()?
            .remove(&import_id)
            .ok_or(DomainError::ImportNotFound(import_id))
    }

    /// Puts a taken breakdown back after a failed commit.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn restore(&self, import_id: Uuid, breakdown: Breakdown) -> Result<(), DomainError> {
        self.lock()?.insert(import_id, breakdown);
        Ok(())
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for commit and status-change timestamps.
    pub clock: Arc<dyn Clock>,
    /// The production store.
    pub episode_repository: Arc<dyn EpisodeRepository>,
    /// Serializes every write to the production store.
    pub write_lock: Arc<StoreWriteLock>,
    /// Character, location and prop extraction.
    pub extractor: Arc<dyn EntityExtractor>,
    /// Which status changes are allowed.
    pub transition_policy: Arc<dyn TransitionPolicy>,
    /// Breakdowns awaiting commit.
    pub pending: PendingBreakdowns,
}

impl AppState {
    /// Create new application state with an empty staging area.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        episode_repository: Arc<dyn EpisodeRepository>,
        extractor: Arc<dyn EntityExtractor>,
        transition_policy: Arc<dyn TransitionPolicy>,
    ) -> Self {
        Self {
            clock,
            episode_repository,
            write_lock: Arc::new(StoreWriteLock::new()),
            extractor,
            transition_policy,
            pending: PendingBreakdowns::default(),
        }
    }
}
