//! Query handlers for the Production context.
//!
//! This module contains query handlers that read the production store and
//! return read-only view DTOs with derived workflow metrics.

use std::collections::BTreeMap;

use panelsmith_core::error::DomainError;
use panelsmith_core::record::{Episode, EpisodeStatus, Panel, PanelStatus};
use panelsmith_core::repository::EpisodeRepository;
use serde::Serialize;

use crate::domain::workflow::{EpisodeFilter, completion_pct, ratio_pct, select_episodes};

/// Read-only list entry for an episode.
#[derive(Debug, Serialize)]
pub struct EpisodeSummaryView {
    /// The episode identifier.
    pub episode_id: i64,
    /// Episode title.
    pub title: String,
    /// Story arc label.
    pub arc: String,
    /// Production status.
    pub status: EpisodeStatus,
    /// Short synopsis.
    pub summary: String,
    /// Number of pages.
    pub page_count: u32,
    /// Number of panels.
    pub panel_count: usize,
    /// Percentage of approved panels.
    pub completion_pct: u8,
}

impl From<&Episode> for EpisodeSummaryView {
    fn from(episode: &Episode) -> Self {
        Self {
            episode_id: episode.id,
            title: episode.title.clone(),
            arc: episode.arc.clone(),
            status: episode.status,
            summary: episode.summary.clone(),
            page_count: episode.page_count,
            panel_count: episode.panels.len(),
            completion_pct: completion_pct(episode),
        }
    }
}

/// One page of an episode.
#[derive(Debug, Serialize)]
pub struct PageView {
    /// Page number within the episode.
    pub page_number: u32,
    /// Panels on the page, in insertion order.
    pub panels: Vec<Panel>,
}

/// Read-only detail view of an episode, grouped by page.
#[derive(Debug, Serialize)]
pub struct EpisodeDetailView {
    /// Summary fields.
    #[serde(flatten)]
    pub summary: EpisodeSummaryView,
    /// Pages in page-number order.
    pub pages: Vec<PageView>,
}

/// Store-wide production counts.
#[derive(Debug, Serialize)]
pub struct ProductionOverview {
    /// Number of episodes.
    pub episode_count: usize,
    /// Number of panels across all episodes.
    pub panel_count: usize,
    /// Episodes per status; every status is present.
    pub episodes_by_status: BTreeMap<&'static str, usize>,
    /// Panels per status; every status is present.
    pub panels_by_status: BTreeMap<&'static str, usize>,
    /// Percentage of approved panels across the store.
    pub completion_pct: u8,
}

fn group_pages(panels: &[Panel]) -> Vec<PageView> {
    let mut pages: BTreeMap<u32, Vec<Panel>> = BTreeMap::new();
    for panel in panels {
        pages.entry(panel.page_number).or_default().push(panel.clone());
    }
    pages
        .into_iter()
        .map(|(page_number, panels)| PageView {
            page_number,
            panels,
        })
        .collect()
}

/// Lists episodes matching `filter` and, if given, the search `query`.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store cannot be read.
pub async fn list_episodes(
    filter: EpisodeFilter,
    query: Option<&str>,
    repo: &dyn EpisodeRepository,
) -> Result<Vec<EpisodeSummaryView>, DomainError> {
    let episodes = repo.get_all_episodes().await?;
    Ok(select_episodes(&episodes, filter, query)
        .into_iter()
        .map(EpisodeSummaryView::from)
        .collect())
}

/// Retrieves one episode with its pages.
///
/// # Errors
///
/// Returns `DomainError::EpisodeNotFound` if no episode has the given id.
/// Returns `DomainError::Infrastructure` if the store cannot be read.
pub async fn get_episode_by_id(
    episode_id: i64,
    repo: &dyn EpisodeRepository,
) -> Result<EpisodeDetailView, DomainError> {
    let episode = repo
        .get_episode(episode_id)
        .await?
        .ok_or(DomainError::EpisodeNotFound(episode_id))?;
    Ok(EpisodeDetailView {
        summary: EpisodeSummaryView::from(&episode),
        pages: group_pages(&episode.panels),
    })
}

/// Counts episodes and panels per status across the store.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store cannot be read.
pub async fn production_overview(
    repo: &dyn EpisodeRepository,
) -> Result<ProductionOverview, DomainError> {
    let episodes = repo.get_all_episodes().await?;

    let mut episodes_by_status: BTreeMap<&'static str, usize> =
        EpisodeStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    let mut panels_by_status: BTreeMap<&'static str, usize> =
        PanelStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();

    for episode in &episodes {
        *episodes_by_status.entry(episode.status.as_str()).or_default() += 1;
        for panel in &episode.panels {
            *panels_by_status.entry(panel.status.as_str()).or_default() += 1;
        }
    }

    let panel_count: usize = episodes.iter().map(|e| e.panels.len()).sum();
    let approved = panels_by_status
        .get(PanelStatus::Approved.as_str())
        .copied()
        .unwrap_or(0);

    Ok(ProductionOverview {
        episode_count: episodes.len(),
        panel_count,
        episodes_by_status,
        panels_by_status,
        completion_pct: ratio_pct(approved, panel_count),
    })
}
