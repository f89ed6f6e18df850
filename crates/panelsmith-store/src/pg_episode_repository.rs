//! `PostgreSQL` implementation of the `EpisodeRepository` trait.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;

use panelsmith_core::error::DomainError;
use panelsmith_core::record::{Episode, Panel};
use panelsmith_core::repository::EpisodeRepository;

use crate::schema::CREATE_EPISODES_TABLE;

const SELECT_EPISODES: &str =
    "SELECT id, title, arc, status, summary, page_count, panels FROM episodes";

/// PostgreSQL-backed episode repository.
#[derive(Debug, Clone)]
pub struct PgEpisodeRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct EpisodeRow {
    id: i64,
    title: String,
    arc: String,
    status: String,
    summary: String,
    page_count: i32,
    panels: Json<Vec<Panel>>,
}

impl TryFrom<EpisodeRow> for Episode {
    type Error = DomainError;

    fn try_from(row: EpisodeRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|_| {
            DomainError::Infrastructure(format!(
                "episode {} has unknown status {:?}",
                row.id, row.status
            ))
        })?;
        let page_count = u32::try_from(row.page_count).map_err(|_| {
            DomainError::Infrastructure(format!(
                "episode {} has negative page count {}",
                row.id, row.page_count
            ))
        })?;
        Ok(Episode {
            id: row.id,
            title: row.title,
            arc: row.arc,
            status,
            summary: row.summary,
            page_count,
            panels: row.panels.0,
        })
    }
}

fn infrastructure(context: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::Infrastructure(format!("{context}: {e}"))
}

impl PgEpisodeRepository {
    /// Creates a new `PgEpisodeRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the episodes table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::raw_sql(CREATE_EPISODES_TABLE)
            .execute(&self.pool)
            .await
            .map_err(infrastructure("schema creation failed"))?;
        Ok(())
    }
}

#[async_trait]
impl EpisodeRepository for PgEpisodeRepository {
    async fn get_all_episodes(&self) -> Result<Vec<Episode>, DomainError> {
        let rows: Vec<EpisodeRow> = sqlx::query_as(&format!("{SELECT_EPISODES} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure("loading episodes failed"))?;
        rows.into_iter().map(Episode::try_from).collect()
    }

    async fn get_max_panel_id(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar(
            "SELECT COALESCE(MAX((panel->>'id')::BIGINT), 0) \
             FROM episodes CROSS JOIN LATERAL jsonb_array_elements(panels) AS panel",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure("reading max panel id failed"))
    }

    async fn get_max_episode_id(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) FROM episodes")
            .fetch_one(&self.pool)
            .await
            .map_err(infrastructure("reading max episode id failed"))
    }

    async fn save_episodes(&self, episodes: &[Episode]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(infrastructure("opening transaction failed"))?;

        for episode in episodes {
            let page_count = i32::try_from(episode.page_count).map_err(|_| {
                DomainError::Validation(format!(
                    "episode {} page count {} is out of range",
                    episode.id, episode.page_count
                ))
            })?;
            sqlx::query(
                "INSERT INTO episodes (id, title, arc, status, summary, page_count, panels) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (id) DO UPDATE SET \
                     title = EXCLUDED.title, \
                     arc = EXCLUDED.arc, \
                     status = EXCLUDED.status, \
                     summary = EXCLUDED.summary, \
                     page_count = EXCLUDED.page_count, \
                     panels = EXCLUDED.panels",
            )
            .bind(episode.id)
            .bind(&episode.title)
            .bind(&episode.arc)
            .bind(episode.status.as_str())
            .bind(&episode.summary)
            .bind(page_count)
            .bind(Json(&episode.panels))
            .execute(&mut *tx)
            .await
            .map_err(infrastructure("saving episode failed"))?;
        }

        tx.commit()
            .await
            .map_err(infrastructure("committing episodes failed"))?;
        debug!(count = episodes.len(), "episodes saved");
        Ok(())
    }

    async fn get_episode(&self, episode_id: i64) -> Result<Option<Episode>, DomainError> {
        let row: Option<EpisodeRow> = sqlx::query_as(&format!("{SELECT_EPISODES} WHERE id = $1"))
            .bind(episode_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure("loading episode failed"))?;
        row.map(Episode::try_from).transpose()
    }
}
