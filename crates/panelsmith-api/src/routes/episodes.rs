//! Routes for the production store: episode queries and status workflow.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use panelsmith_core::record::{EpisodeStatus, PanelStatus};
use panelsmith_production::application::command_handlers::{
    StatusChange, handle_change_episode_status, handle_change_panel_status,
};
use panelsmith_production::application::query_handlers::{
    self, EpisodeDetailView, EpisodeSummaryView, ProductionOverview,
};
use panelsmith_production::domain::commands::{ChangeEpisodeStatus, ChangePanelStatus};
use panelsmith_production::domain::workflow::EpisodeFilter;

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /.
#[derive(Debug, Default, Deserialize)]
pub struct ListEpisodesParams {
    /// `all`, `active`, or an episode status. Empty means `all`.
    pub filter: Option<String>,
    /// Case-insensitive search text.
    pub q: Option<String>,
}

/// Request body for POST /{episode_id}/status.
#[derive(Debug, Deserialize)]
pub struct EpisodeStatusRequest {
    /// The requested status.
    pub status: EpisodeStatus,
}

/// Request body for POST /{episode_id}/panels/{panel_id}/status.
#[derive(Debug, Deserialize)]
pub struct PanelStatusRequest {
    /// The requested status.
    pub status: PanelStatus,
}

/// GET /
async fn list_episodes(
    State(state): State<AppState>,
    Query(params): Query<ListEpisodesParams>,
) -> Result<Json<Vec<EpisodeSummaryView>>, ApiError> {
    let filter = match params.filter.as_deref().filter(|f| !f.is_empty()) {
        Some(raw) => raw.parse()?,
        None => EpisodeFilter::All,
    };
    let episodes = query_handlers::list_episodes(
        filter,
        params.q.as_deref(),
        state.episode_repository.as_ref(),
    )
    .await?;
    Ok(Json(episodes))
}

/// GET /overview
async fn production_overview(
    State(state): State<AppState>,
) -> Result<Json<ProductionOverview>, ApiError> {
    let overview = query_handlers::production_overview(state.episode_repository.as_ref()).await?;
    Ok(Json(overview))
}

/// GET /{episode_id}
async fn get_episode(
    State(state): State<AppState>,
    Path(episode_id): Path<i64>,
) -> Result<Json<EpisodeDetailView>, ApiError> {
    let episode =
        query_handlers::get_episode_by_id(episode_id, state.episode_repository.as_ref()).await?;
    Ok(Json(episode))
}

/// POST /{episode_id}/status
#[instrument(skip_all, fields(episode_id = episode_id, status = %request.status))]
async fn change_episode_status(
    State(state): State<AppState>,
    Path(episode_id): Path<i64>,
    Json(request): Json<EpisodeStatusRequest>,
) -> Result<Json<StatusChange<EpisodeStatus>>, ApiError> {
    let command = ChangeEpisodeStatus {
        correlation_id: Uuid::new_v4(),
        episode_id,
        status: request.status,
    };

    info!(correlation_id = %command.correlation_id, "handling change_episode_status command");

    let change = handle_change_episode_status(
        &command,
        state.transition_policy.as_ref(),
        state.clock.as_ref(),
        &state.write_lock,
        state.episode_repository.as_ref(),
    )
    .await?;
    Ok(Json(change))
}

/// POST /{episode_id}/panels/{panel_id}/status
#[instrument(skip_all, fields(episode_id = episode_id, panel_id = panel_id, status = %request.status))]
async fn change_panel_status(
    State(state): State<AppState>,
    Path((episode_id, panel_id)): Path<(i64, i64)>,
    Json(request): Json<PanelStatusRequest>,
) -> Result<Json<StatusChange<PanelStatus>>, ApiError> {
    let command = ChangePanelStatus {
        correlation_id: Uuid::new_v4(),
        episode_id,
        panel_id,
        status: request.status,
    };

    info!(correlation_id = %command.correlation_id, "handling change_panel_status command");

    let change = handle_change_panel_status(
        &command,
        state.transition_policy.as_ref(),
        state.clock.as_ref(),
        &state.write_lock,
        state.episode_repository.as_ref(),
    )
    .await?;
    Ok(Json(change))
}

/// Returns the router for episodes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_episodes))
        .route("/overview", get(production_overview))
        .route("/{episode_id}", get(get_episode))
        .route("/{episode_id}/status", post(change_episode_status))
        .route(
            "/{episode_id}/panels/{panel_id}/status",
            post(change_panel_status),
        )
}
