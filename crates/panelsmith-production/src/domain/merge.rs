//! Merge planning: turning a [`Breakdown`] into committed records.
//!
//! Planning is pure. Given the current id maxima and (for append) the target
//! episode, a plan holds every record the merge will write. The command
//! handlers save a plan in a single `save_episodes` call, so a merge either
//! lands completely or not at all.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use panelsmith_breakdown::domain::breakdown::{Breakdown, DraftEpisode, PanelDraft};
use panelsmith_core::error::DomainError;
use panelsmith_core::record::{Episode, EpisodeStatus, Panel, PanelStatus};
use serde::{Deserialize, Serialize};

/// Arc label given to episodes created from a breakdown.
pub const CREATED_ARC: &str = "From Script";
/// Characters of concatenated panel descriptions kept in a created summary.
pub const SUMMARY_CHARS: usize = 120;

/// Where a breakdown should be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TargetRepr", into = "TargetRepr")]
pub enum MergeTarget {
    /// Create new episodes.
    New,
    /// Append onto this existing episode.
    Episode(i64),
}

impl fmt::Display for MergeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::Episode(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for MergeTarget {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("new") {
            return Ok(Self::New);
        }
        s.parse::<i64>().map(Self::Episode).map_err(|_| {
            DomainError::Validation(format!(
                "merge target must be \"new\" or an episode id, got {s:?}"
            ))
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TargetRepr {
    Id(i64),
    Word(String),
}

impl TryFrom<TargetRepr> for MergeTarget {
    type Error = DomainError;

    fn try_from(repr: TargetRepr) -> Result<Self, Self::Error> {
        match repr {
            TargetRepr::Id(id) => Ok(Self::Episode(id)),
            TargetRepr::Word(word) => word.parse(),
        }
    }
}

impl From<MergeTarget> for TargetRepr {
    fn from(target: MergeTarget) -> Self {
        match target {
            MergeTarget::New => Self::Word("new".to_owned()),
            MergeTarget::Episode(id) => Self::Id(id),
        }
    }
}

/// What a committed merge produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// The episode the caller should now show as selected.
    pub selected_episode_id: i64,
    /// Newly created episode ids; empty on append.
    pub created_episode_ids: Vec<i64>,
    /// Newly issued panel ids, in order.
    pub created_panel_ids: Vec<i64>,
    /// When the merge was committed.
    pub committed_at: DateTime<Utc>,
}

/// Records to write for an append.
#[derive(Debug, Clone)]
pub struct AppendPlan {
    /// The target episode with the new panels appended.
    pub episode: Episode,
    /// Ids issued to the new panels.
    pub created_panel_ids: Vec<i64>,
}

/// Records to write for a create.
#[derive(Debug, Clone)]
pub struct CreatePlan {
    /// The new episodes, in breakdown order.
    pub episodes: Vec<Episode>,
    /// Ids issued to the new panels, across all new episodes.
    pub created_panel_ids: Vec<i64>,
}

/// Issues strictly increasing ids from a starting value. `None` once the
/// last representable id has been handed out.
#[derive(Debug)]
struct IdSequence(Option<i64>);

impl IdSequence {
    fn starting_at(first: i64) -> Self {
        Self(Some(first))
    }

    fn issue(&mut self) -> Result<i64, DomainError> {
        let id = self
            .0
            .ok_or_else(|| DomainError::Infrastructure("id space exhausted".to_owned()))?;
        self.0 = id.checked_add(1);
        Ok(id)
    }
}

fn commit_panel(draft: &PanelDraft, id: i64, page_number: u32) -> Panel {
    Panel {
        id,
        name: draft.name.clone(),
        page_number,
        panel_type: draft.panel_type,
        description: draft.description.clone(),
        dialogue: draft.dialogue.clone(),
        characters: draft.characters.clone(),
        scene: draft.scene.clone(),
        props: draft.props.clone(),
        status: PanelStatus::Queued,
    }
}

fn summarize(draft: &DraftEpisode) -> String {
    let joined = draft
        .panels()
        .map(|p| p.description.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let head: String = joined.chars().take(SUMMARY_CHARS).collect();
    format!("{head}...")
}

/// Plans appending every panel of `breakdown` onto `target`.
///
/// New panels get ids from `next_panel_id` upwards, in breakdown order. Each
/// non-empty breakdown page becomes one new page numbered past the target's
/// highest existing page, so `page_count` grows by the number of new pages.
/// Existing panels and fields of `target` are carried over unchanged.
///
/// # Errors
///
/// Returns `DomainError::EmptyBreakdown` if the breakdown has no panels, or
/// `DomainError::Infrastructure` if the panel ids would pass `i64::MAX`.
pub fn plan_append(
    target: &Episode,
    breakdown: &Breakdown,
    next_panel_id: i64,
) -> Result<AppendPlan, DomainError> {
    if breakdown.panel_count() == 0 {
        return Err(DomainError::EmptyBreakdown);
    }

    let mut ids = IdSequence::starting_at(next_panel_id);
    let mut episode = target.clone();
    let mut created_panel_ids = Vec::new();
    let mut page_number = target.max_page_number();
    let mut new_pages = 0;

    for page in breakdown.episodes.iter().flat_map(|e| e.pages.iter()) {
        if page.panels.is_empty() {
            continue;
        }
        page_number += 1;
        new_pages += 1;
        for draft in &page.panels {
            let id = ids.issue()?;
            created_panel_ids.push(id);
            episode.panels.push(commit_panel(draft, id, page_number));
        }
    }
    episode.page_count += new_pages;

    Ok(AppendPlan {
        episode,
        created_panel_ids,
    })
}

/// Plans creating one new episode per breakdown episode.
///
/// Episode ids run from `next_episode_id`, panel ids from `next_panel_id`;
/// the panel sequence is shared across all new episodes. New episodes start
/// as `todo` with arc [`CREATED_ARC`].
///
/// # Errors
///
/// Returns `DomainError::EmptyBreakdown` if the breakdown has no episodes or
/// no panels, or `DomainError::Infrastructure` if either id sequence would
/// pass `i64::MAX`.
pub fn plan_create(
    breakdown: &Breakdown,
    next_episode_id: i64,
    next_panel_id: i64,
) -> Result<CreatePlan, DomainError> {
    if breakdown.episodes.is_empty() || breakdown.panel_count() == 0 {
        return Err(DomainError::EmptyBreakdown);
    }

    let mut episode_ids = IdSequence::starting_at(next_episode_id);
    let mut panel_ids = IdSequence::starting_at(next_panel_id);
    let mut created_panel_ids = Vec::new();
    let mut episodes = Vec::with_capacity(breakdown.episodes.len());

    for draft in &breakdown.episodes {
        let mut panels = Vec::new();
        for page in &draft.pages {
            for panel in &page.panels {
                let id = panel_ids.issue()?;
                created_panel_ids.push(id);
                panels.push(commit_panel(panel, id, page.page_number));
            }
        }
        let mut episode = Episode {
            id: episode_ids.issue()?,
            title: draft.title.clone(),
            arc: CREATED_ARC.to_owned(),
            status: EpisodeStatus::Todo,
            summary: summarize(draft),
            page_count: 0,
            panels,
        };
        episode.page_count = episode.distinct_page_count();
        episodes.push(episode);
    }

    Ok(CreatePlan {
        episodes,
        created_panel_ids,
    })
}
