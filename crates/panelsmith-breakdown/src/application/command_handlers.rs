//! Command handlers for the Script Breakdown context.
//!
//! Extraction and segmentation are independent passes over the same text;
//! composition consumes both. The only store access is a read of the current
//! episode id maximum, used to suggest the id of the first new episode.

use panelsmith_core::command::Command;
use panelsmith_core::error::DomainError;
use panelsmith_core::record::next_id;
use panelsmith_core::repository::EpisodeRepository;
use tracing::{info, instrument};

use crate::domain::breakdown::{Breakdown, EpisodeCountHint, compose};
use crate::domain::commands::BreakdownScript;
use crate::domain::entities::EntityExtractor;
use crate::domain::scenes::segment;

/// Runs the full extraction → segmentation → composition pipeline.
///
/// Total: empty or whitespace-only text degrades to the fallback character
/// and two placeholder scenes.
#[must_use]
pub fn breakdown_script(
    text: &str,
    extractor: &dyn EntityExtractor,
    hint: EpisodeCountHint,
    suggested_next_episode_id: i64,
) -> Breakdown {
    let extraction = extractor.extract(text);
    let scenes = segment(text);
    compose(scenes, extraction, hint, suggested_next_episode_id)
}

/// Handles the `BreakdownScript` command: reads the episode id maximum and
/// composes a breakdown. The store is not modified.
///
/// # Errors
///
/// Returns `DomainError` if reading the episode id maximum fails.
#[instrument(
    skip_all,
    fields(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        episode_count = %command.episode_count,
    )
)]
pub async fn handle_breakdown_script(
    command: &BreakdownScript,
    extractor: &dyn EntityExtractor,
    repo: &dyn EpisodeRepository,
) -> Result<Breakdown, DomainError> {
    let suggested_next_episode_id = next_id(repo.get_max_episode_id().await?)?;
    let breakdown = breakdown_script(
        &command.text,
        extractor,
        command.episode_count,
        suggested_next_episode_id,
    );

    info!(
        episodes = breakdown.episodes.len(),
        panels = breakdown.panel_count(),
        characters = breakdown.characters.len(),
        "script broken down"
    );

    Ok(breakdown)
}
