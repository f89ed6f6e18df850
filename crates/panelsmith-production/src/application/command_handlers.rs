//! Command handlers for the Production context.
//!
//! Every handler here writes to the production store, so each one holds the
//! [`StoreWriteLock`] from its first read until its single `save_episodes`
//! call. A handler that fails before saving leaves the store untouched.

use chrono::{DateTime, Utc};
use panelsmith_core::clock::Clock;
use panelsmith_core::command::Command;
use panelsmith_core::error::DomainError;
use panelsmith_core::record::{EpisodeStatus, PanelStatus, next_id};
use panelsmith_core::repository::EpisodeRepository;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::application::write_lock::StoreWriteLock;
use crate::domain::commands::{
    AppendBreakdown, ChangeEpisodeStatus, ChangePanelStatus, CreateEpisodes,
};
use crate::domain::merge::{MergeOutcome, plan_append, plan_create};
use crate::domain::workflow::TransitionPolicy;

/// Result of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange<S> {
    /// The episode that was touched.
    pub episode_id: i64,
    /// The panel that was touched, for panel status changes.
    pub panel_id: Option<i64>,
    /// Status before the change.
    pub previous: S,
    /// Status after the change.
    pub current: S,
    /// When the change was applied.
    pub changed_at: DateTime<Utc>,
}

/// Handles the `AppendBreakdown` command: appends every breakdown panel onto
/// the target episode with fresh ids continuing from the global panel id
/// maximum.
///
/// # Errors
///
/// Returns `DomainError::EpisodeNotFound` if the target does not exist,
/// `DomainError::EmptyBreakdown` if the breakdown has no panels, or any
/// error from the repository. The store is unchanged in every error case.
#[instrument(
    skip_all,
    fields(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        target_episode_id = command.target_episode_id,
    )
)]
pub async fn handle_append_breakdown(
    command: &AppendBreakdown,
    clock: &dyn Clock,
    lock: &StoreWriteLock,
    repo: &dyn EpisodeRepository,
) -> Result<MergeOutcome, DomainError> {
    let _guard = lock.acquire().await;

    let Some(target) = repo.get_episode(command.target_episode_id).await? else {
        warn!("append target does not exist");
        return Err(DomainError::EpisodeNotFound(command.target_episode_id));
    };
    let next_panel_id = next_id(repo.get_max_panel_id().await?)?;

    let plan = plan_append(&target, &command.breakdown, next_panel_id).inspect_err(|e| {
        warn!(error = %e, "append rejected");
    })?;
    repo.save_episodes(std::slice::from_ref(&plan.episode))
        .await?;

    info!(
        created_panel_ids = ?plan.created_panel_ids,
        page_count = plan.episode.page_count,
        "breakdown appended"
    );

    Ok(MergeOutcome {
        selected_episode_id: plan.episode.id,
        created_episode_ids: Vec::new(),
        created_panel_ids: plan.created_panel_ids,
        committed_at: clock.now(),
    })
}

/// Handles the `CreateEpisodes` command: creates one new episode per
/// breakdown episode, issuing episode and panel ids past the current maxima.
///
/// # Errors
///
/// Returns `DomainError::EmptyBreakdown` if the breakdown has no episodes or
/// panels, or any error from the repository. The store is unchanged in every
/// error case.
#[instrument(
    skip_all,
    fields(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
    )
)]
pub async fn handle_create_episodes(
    command: &CreateEpisodes,
    clock: &dyn Clock,
    lock: &StoreWriteLock,
    repo: &dyn EpisodeRepository,
) -> Result<MergeOutcome, DomainError> {
    let _guard = lock.acquire().await;

    let next_episode_id = next_id(repo.get_max_episode_id().await?)?;
    let next_panel_id = next_id(repo.get_max_panel_id().await?)?;

    let plan = plan_create(&command.breakdown, next_episode_id, next_panel_id).inspect_err(
        |e| {
            warn!(error = %e, "create rejected");
        },
    )?;
    repo.save_episodes(&plan.episodes).await?;

    let created_episode_ids: Vec<i64> = plan.episodes.iter().map(|e| e.id).collect();
    info!(
        created_episode_ids = ?created_episode_ids,
        created_panels = plan.created_panel_ids.len(),
        "episodes created from breakdown"
    );

    Ok(MergeOutcome {
        selected_episode_id: next_episode_id,
        created_episode_ids,
        created_panel_ids: plan.created_panel_ids,
        committed_at: clock.now(),
    })
}

/// Handles the `ChangeEpisodeStatus` command.
///
/// # Errors
///
/// Returns `DomainError::EpisodeNotFound` if the episode does not exist,
/// `DomainError::TransitionRejected` if the policy refuses the change, or any
/// error from the repository.
#[instrument(
    skip_all,
    fields(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        episode_id = command.episode_id,
        status = %command.status,
    )
)]
pub async fn handle_change_episode_status(
    command: &ChangeEpisodeStatus,
    policy: &dyn TransitionPolicy,
    clock: &dyn Clock,
    lock: &StoreWriteLock,
    repo: &dyn EpisodeRepository,
) -> Result<StatusChange<EpisodeStatus>, DomainError> {
    let _guard = lock.acquire().await;

    let mut episode = repo
        .get_episode(command.episode_id)
        .await?
        .ok_or(DomainError::EpisodeNotFound(command.episode_id))?;
    let previous = episode.status;
    policy.check_episode(previous, command.status)?;

    if previous != command.status {
        episode.status = command.status;
        repo.save_episodes(std::slice::from_ref(&episode)).await?;
        info!(%previous, "episode status changed");
    }

    Ok(StatusChange {
        episode_id: episode.id,
        panel_id: None,
        previous,
        current: command.status,
        changed_at: clock.now(),
    })
}

/// Handles the `ChangePanelStatus` command.
///
/// # Errors
///
/// Returns `DomainError::EpisodeNotFound` or `DomainError::PanelNotFound` if
/// the panel cannot be located, `DomainError::TransitionRejected` if the
/// policy refuses the change, or any error from the repository.
#[instrument(
    skip_all,
    fields(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        episode_id = command.episode_id,
        panel_id = command.panel_id,
        status = %command.status,
    )
)]
pub async fn handle_change_panel_status(
    command: &ChangePanelStatus,
    policy: &dyn TransitionPolicy,
    clock: &dyn Clock,
    lock: &StoreWriteLock,
    repo: &dyn EpisodeRepository,
) -> Result<StatusChange<PanelStatus>, DomainError> {
    let _guard = lock.acquire().await;

    let mut episode = repo
        .get_episode(command.episode_id)
        .await?
        .ok_or(DomainError::EpisodeNotFound(command.episode_id))?;
    let panel = episode
        .panel_mut(command.panel_id)
        .ok_or(DomainError::PanelNotFound {
            episode_id: command.episode_id,
            panel_id: command.panel_id,
        })?;
    let previous = panel.status;
    policy.check_panel(previous, command.status)?;

    if previous != command.status {
        panel.status = command.status;
        repo.save_episodes(std::slice::from_ref(&episode)).await?;
        info!(%previous, "panel status changed");
    }

    Ok(StatusChange {
        episode_id: command.episode_id,
        panel_id: Some(command.panel_id),
        previous,
        current: command.status,
        changed_at: clock.now(),
    })
}
