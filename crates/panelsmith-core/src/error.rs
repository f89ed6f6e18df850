//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested episode does not exist in the production store.
    #[error("episode not found: {0}")]
    EpisodeNotFound(i64),

    /// The requested panel does not exist within the given episode.
    #[error("panel {panel_id} not found in episode {episode_id}")]
    PanelNotFound {
        /// The episode that was searched.
        episode_id: i64,
        /// The panel that was requested.
        panel_id: i64,
    },

    /// No staged breakdown exists under the given import id.
    #[error("staged breakdown not found: {0}")]
    ImportNotFound(Uuid),

    /// A breakdown with no panels was offered for merging. Nothing was committed.
    #[error("breakdown contains no panels; nothing to merge")]
    EmptyBreakdown,

    /// The active transition policy refused a status change.
    #[error("status transition from {from} to {to} is not permitted")]
    TransitionRejected {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
