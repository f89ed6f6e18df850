//! Routes for composing, staging and committing script breakdowns.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use panelsmith_breakdown::application::command_handlers::handle_breakdown_script;
use panelsmith_breakdown::domain::breakdown::{Breakdown, EpisodeCountHint};
use panelsmith_breakdown::domain::commands::BreakdownScript;
use panelsmith_production::application::command_handlers::{
    handle_append_breakdown, handle_create_episodes,
};
use panelsmith_production::domain::commands::{AppendBreakdown, CreateEpisodes};
use panelsmith_production::domain::merge::{MergeOutcome, MergeTarget};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct BreakdownRequest {
    /// The narrative text to break down.
    pub text: String,
    /// `"auto"` or a positive number of episodes.
    #[serde(default)]
    pub episode_count: EpisodeCountHint,
}

/// Request body for POST /{import_id}/commit.
#[derive(Debug, Deserialize)]
pub struct CommitRequest {
    /// `"new"` or the id of the episode to append onto.
    pub target_episode: MergeTarget,
}

/// A staged breakdown and the id to commit it under.
#[derive(Debug, Serialize)]
pub struct StagedBreakdownResponse {
    /// Handle for later retrieval or commit.
    pub import_id: Uuid,
    /// The composed breakdown.
    pub breakdown: Breakdown,
}

/// POST /
#[instrument(skip(state, request), fields(text_len = request.text.len()))]
async fn compose_breakdown(
    State(state): State<AppState>,
    Json(request): Json<BreakdownRequest>,
) -> Result<Json<StagedBreakdownResponse>, ApiError> {
    let command = BreakdownScript {
        correlation_id: Uuid::new_v4(),
        text: request.text,
        episode_count: request.episode_count,
    };

    info!(correlation_id = %command.correlation_id, "handling breakdown_script command");

    let breakdown = handle_breakdown_script(
        &command,
        state.extractor.as_ref(),
        state.episode_repository.as_ref(),
    )
    .await?;
    let import_id = state.pending.stage(breakdown.clone())?;

    Ok(Json(StagedBreakdownResponse {
        import_id,
        breakdown,
    }))
}

/// GET /{import_id}
async fn get_breakdown(
    State(state): State<AppState>,
    Path(import_id): Path<Uuid>,
) -> Result<Json<StagedBreakdownResponse>, ApiError> {
    let breakdown = state.pending.get(import_id)?;
    Ok(Json(StagedBreakdownResponse {
        import_id,
        breakdown,
    }))
}

/// POST /{import_id}/commit
#[instrument(skip_all, fields(%import_id, target = %request.target_episode))]
async fn commit_breakdown(
    State(state): State<AppState>,
    Path(import_id): Path<Uuid>,
    Json(request): Json<CommitRequest>,
) -> Result<Json<MergeOutcome>, ApiError> {
    let breakdown = state.pending.take(import_id)?;
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, "handling commit_breakdown request");

    let (result, breakdown) = match request.target_episode {
        MergeTarget::New => {
            let command = CreateEpisodes {
                correlation_id,
                breakdown,
            };
            let result = handle_create_episodes(
                &command,
                state.clock.as_ref(),
                &state.write_lock,
                state.episode_repository.as_ref(),
            )
            .await;
            (result, command.breakdown)
        }
        MergeTarget::Episode(target_episode_id) => {
            let command = AppendBreakdown {
                correlation_id,
                target_episode_id,
                breakdown,
            };
            let result = handle_append_breakdown(
                &command,
                state.clock.as_ref(),
                &state.write_lock,
                state.episode_repository.as_ref(),
            )
            .await;
            (result, command.breakdown)
        }
    };

    match result {
        Ok(outcome) => Ok(Json(outcome)),
        Err(err) => {
            warn!(error = %err, "commit failed; breakdown stays staged");
            state.pending.restore(import_id, breakdown)?;
            Err(err.into())
        }
    }
}

/// Returns the router for staged breakdowns.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(compose_breakdown))
        .route("/{import_id}", get(get_breakdown))
        .route("/{import_id}/commit", post(commit_breakdown))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::TimeZone;
    use panelsmith_breakdown::domain::entities::Gazetteer;
    use panelsmith_core::repository::EpisodeRepository;
    use panelsmith_production::domain::workflow::PermissiveTransitions;
    use panelsmith_test_support::{
        FailingEpisodeRepository, FixedClock, RecordingEpisodeRepository, episode_with_panels,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    const SCRIPT: &str = "Kaito sprints across the court at dawn. \
        Ryu waits by the scoreboard with the ball! \
        Coach blows the whistle and the match begins. \
        Hana cheers from the stands as the final buzzer sounds.";

    fn app_state_with(repo: Arc<dyn EpisodeRepository>) -> AppState {
        let clock = Arc::new(FixedClock(
            chrono::Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        AppState::new(
            clock,
            repo,
            Arc::new(Gazetteer::default()),
            Arc::new(PermissiveTransitions),
        )
    }

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    async fn stage(state: &AppState) -> Uuid {
        let response = router()
            .with_state(state.clone())
            .oneshot(post("/", &serde_json::json!({ "text": SCRIPT })))
            .await
            .unwrap();
        let json = json_body(response).await;
        Uuid::parse_str(json["import_id"].as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_compose_breakdown_returns_staged_breakdown() {
        // Arrange
        let repo = Arc::new(RecordingEpisodeRepository::new(vec![episode_with_panels(
            4,
            &[(10, 1)],
        )]));
        let app = router().with_state(app_state_with(repo.clone()));

        // Act
        let response = app
            .oneshot(post("/", &serde_json::json!({ "text": SCRIPT })))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        Uuid::parse_str(json["import_id"].as_str().unwrap()).unwrap();
        let breakdown = &json["breakdown"];
        assert_eq!(breakdown["suggested_next_episode_id"], 5);
        assert_eq!(breakdown["scenes"].as_array().unwrap().len(), 4);
        assert_eq!(breakdown["episodes"].as_array().unwrap().len(), 2);
        assert_eq!(breakdown["episodes"][0]["title"], "Episode 5");
        assert!(repo.saved_batches().is_empty());
    }

    #[tokio::test]
    async fn test_compose_breakdown_rejects_zero_episode_count() {
        let app = router().with_state(app_state_with(Arc::new(
            RecordingEpisodeRepository::new(Vec::new()),
        )));

        let response = app
            .oneshot(post(
                "/",
                &serde_json::json!({ "text": SCRIPT, "episode_count": 0 }),
            ))
            .await
            .unwrap();

        // Axum returns 422 for deserialization failures.
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_compose_breakdown_returns_500_when_repository_fails() {
        let app = router().with_state(app_state_with(Arc::new(FailingEpisodeRepository)));

        let response = app
            .oneshot(post("/", &serde_json::json!({ "text": SCRIPT })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["error"], "infrastructure_error");
    }

    #[tokio::test]
    async fn test_get_breakdown_returns_404_for_unknown_import() {
        let app = router().with_state(app_state_with(Arc::new(
            RecordingEpisodeRepository::new(Vec::new()),
        )));
        let request = Request::builder()
            .method("GET")
            .uri(format!("/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"], "import_not_found");
    }

    #[tokio::test]
    async fn test_commit_new_creates_episodes_and_clears_staging() {
        // Arrange
        let repo = Arc::new(RecordingEpisodeRepository::new(Vec::new()));
        let state = app_state_with(repo.clone());
        let import_id = stage(&state).await;

        // Act
        let response = router()
            .with_state(state.clone())
            .oneshot(post(
                &format!("/{import_id}/commit"),
                &serde_json::json!({ "target_episode": "new" }),
            ))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["selected_episode_id"], 1);
        assert_eq!(json["created_episode_ids"], serde_json::json!([1, 2]));
        assert_eq!(json["created_panel_ids"], serde_json::json!([1, 2, 3, 4]));
        assert_eq!(json["committed_at"], "2026-01-15T10:00:00Z");
        assert_eq!(repo.episodes().len(), 2);
        assert!(state.pending.get(import_id).is_err());
    }

    #[tokio::test]
    async fn test_commit_append_adds_panels_to_target() {
        let repo = Arc::new(RecordingEpisodeRepository::new(vec![episode_with_panels(
            3,
            &[(8, 1), (9, 2)],
        )]));
        let state = app_state_with(repo.clone());
        let import_id = stage(&state).await;

        let response = router()
            .with_state(state)
            .oneshot(post(
                &format!("/{import_id}/commit"),
                &serde_json::json!({ "target_episode": 3 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["selected_episode_id"], 3);
        assert_eq!(json["created_episode_ids"], serde_json::json!([]));
        assert_eq!(
            json["created_panel_ids"],
            serde_json::json!([10, 11, 12, 13])
        );
        assert_eq!(repo.episodes()[0].panels.len(), 6);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_breakdown_staged() {
        // Arrange
        let repo = Arc::new(RecordingEpisodeRepository::new(Vec::new()));
        let state = app_state_with(repo.clone());
        let import_id = stage(&state).await;
        let staged = state.pending.get(import_id).unwrap();

        // Act
        let response = router()
            .with_state(state.clone())
            .oneshot(post(
                &format!("/{import_id}/commit"),
                &serde_json::json!({ "target_episode": 99 }),
            ))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"], "episode_not_found");
        assert_eq!(state.pending.get(import_id).unwrap(), staged);
        assert!(repo.saved_batches().is_empty());
    }

    #[tokio::test]
    async fn test_commit_rejects_unknown_target_word() {
        let state = app_state_with(Arc::new(RecordingEpisodeRepository::new(Vec::new())));
        let import_id = stage(&state).await;

        let response = router()
            .with_state(state)
            .oneshot(post(
                &format!("/{import_id}/commit"),
                &serde_json::json!({ "target_episode": "latest" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
