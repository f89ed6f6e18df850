//! Production records: episodes, panels and their status values.
//!
//! These are the plain records the production store holds. They are created
//! by the merge engine, mutated in place (status only) by the workflow
//! tracker, and never deleted by the engine.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Production status of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    /// Not started.
    #[default]
    Todo,
    /// Work under way.
    InProgress,
    /// Awaiting review.
    Review,
    /// Finished.
    Completed,
    /// Shelved.
    Archived,
}

impl EpisodeStatus {
    /// Every episode status, in workflow order.
    pub const ALL: [Self; 5] = [
        Self::Todo,
        Self::InProgress,
        Self::Review,
        Self::Completed,
        Self::Archived,
    ];

    /// Returns the wire name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EpisodeStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown episode status: {s}")))
    }
}

/// Production status of a single panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelStatus {
    /// Waiting for an artist.
    #[default]
    Queued,
    /// Being drawn.
    Drawing,
    /// Awaiting review.
    Review,
    /// Signed off.
    Approved,
    /// Sent back for rework.
    Redo,
}

impl PanelStatus {
    /// Every panel status, in workflow order.
    pub const ALL: [Self; 5] = [
        Self::Queued,
        Self::Drawing,
        Self::Review,
        Self::Approved,
        Self::Redo,
    ];

    /// Returns the wire name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Drawing => "drawing",
            Self::Review => "review",
            Self::Approved => "approved",
            Self::Redo => "redo",
        }
    }
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown panel status: {s}")))
    }
}

/// Shot vocabulary for a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelType {
    /// Wide shot that sets the place.
    Establishing,
    /// Tight shot on a face or object.
    #[serde(rename = "Close-up")]
    CloseUp,
    /// Movement.
    Action,
    /// A character responding.
    Reaction,
    /// The big reveal.
    #[serde(rename = "Dramatic Reveal")]
    DramaticReveal,
    /// No dialogue, no effects.
    Silent,
}

impl PanelType {
    /// The fixed round-robin vocabulary, in pick order.
    pub const ROTATION: [Self; 6] = [
        Self::Establishing,
        Self::CloseUp,
        Self::Action,
        Self::Reaction,
        Self::DramaticReveal,
        Self::Silent,
    ];

    /// Returns the display label of this panel type.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Establishing => "Establishing",
            Self::CloseUp => "Close-up",
            Self::Action => "Action",
            Self::Reaction => "Reaction",
            Self::DramaticReveal => "Dramatic Reveal",
            Self::Silent => "Silent",
        }
    }
}

impl fmt::Display for PanelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A committed panel, the atomic unit of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    /// Globally unique, never reused.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// The page this panel sits on within its episode.
    pub page_number: u32,
    /// Shot type.
    pub panel_type: PanelType,
    /// What the panel shows.
    pub description: String,
    /// Spoken line, possibly empty.
    pub dialogue: String,
    /// Characters in frame, in first-seen order.
    pub characters: Vec<String>,
    /// Location label.
    pub scene: String,
    /// Props in frame, in first-seen order.
    pub props: Vec<String>,
    /// Production status.
    pub status: PanelStatus,
}

/// A committed episode and its panels in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Globally unique, never reused.
    pub id: i64,
    /// Episode title.
    pub title: String,
    /// Story arc label.
    pub arc: String,
    /// Production status.
    pub status: EpisodeStatus,
    /// Short synopsis.
    pub summary: String,
    /// Number of distinct page numbers among `panels`.
    pub page_count: u32,
    /// Panels in chronological insertion order.
    pub panels: Vec<Panel>,
}

impl Episode {
    /// Counts the distinct page numbers among this episode's panels.
    #[must_use]
    pub fn distinct_page_count(&self) -> u32 {
        let pages: BTreeSet<u32> = self.panels.iter().map(|p| p.page_number).collect();
        u32::try_from(pages.len()).unwrap_or(u32::MAX)
    }

    /// Returns the highest page number in use, or 0 when there are no panels.
    #[must_use]
    pub fn max_page_number(&self) -> u32 {
        self.panels.iter().map(|p| p.page_number).max().unwrap_or(0)
    }

    /// Returns the highest panel id in this episode, or 0 when there are none.
    #[must_use]
    pub fn max_panel_id(&self) -> i64 {
        self.panels.iter().map(|p| p.id).max().unwrap_or(0)
    }

    /// Finds a panel by id for in-place edits.
    pub fn panel_mut(&mut self, panel_id: i64) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.id == panel_id)
    }
}

/// Returns the id that follows `max`, the highest id currently issued.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` when `max` is already `i64::MAX`.
pub fn next_id(max: i64) -> Result<i64, DomainError> {
    max.checked_add(1)
        .ok_or_else(|| DomainError::Infrastructure(format!("id space exhausted after {max}")))
}
