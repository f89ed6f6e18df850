//! Episode/panel status workflow and derived metrics.
//!
//! Transitions are permissive by default: any status can be set from any
//! other. A stricter [`TransitionPolicy`] can be swapped in without changing
//! the command shapes.

use std::fmt;
use std::str::FromStr;

use panelsmith_core::error::DomainError;
use panelsmith_core::record::{Episode, EpisodeStatus, PanelStatus};

/// Decides whether a status change is allowed.
pub trait TransitionPolicy: Send + Sync + fmt::Debug {
    /// Check an episode status change.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TransitionRejected` if the change is not allowed.
    fn check_episode(&self, from: EpisodeStatus, to: EpisodeStatus) -> Result<(), DomainError>;

    /// Check a panel status change.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TransitionRejected` if the change is not allowed.
    fn check_panel(&self, from: PanelStatus, to: PanelStatus) -> Result<(), DomainError>;
}

/// Allows every transition, for ad hoc triage.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveTransitions;

impl TransitionPolicy for PermissiveTransitions {
    fn check_episode(&self, _from: EpisodeStatus, _to: EpisodeStatus) -> Result<(), DomainError> {
        Ok(())
    }

    fn check_panel(&self, _from: PanelStatus, _to: PanelStatus) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Refuses to reopen finished work: completed or archived episodes cannot go
/// back to `todo`, approved panels cannot go back to `queued`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardOnlyTransitions;

fn rejected(from: impl fmt::Display, to: impl fmt::Display) -> DomainError {
    DomainError::TransitionRejected {
        from: from.to_string(),
        to: to.to_string(),
    }
}

impl TransitionPolicy for ForwardOnlyTransitions {
    fn check_episode(&self, from: EpisodeStatus, to: EpisodeStatus) -> Result<(), DomainError> {
        match (from, to) {
            (EpisodeStatus::Completed | EpisodeStatus::Archived, EpisodeStatus::Todo) => {
                Err(rejected(from, to))
            }
            _ => Ok(()),
        }
    }

    fn check_panel(&self, from: PanelStatus, to: PanelStatus) -> Result<(), DomainError> {
        match (from, to) {
            (PanelStatus::Approved, PanelStatus::Queued) => Err(rejected(from, to)),
            _ => Ok(()),
        }
    }
}

/// Share of approved panels, as a whole percentage. 0 for an episode with no
/// panels.
#[must_use]
pub fn completion_pct(episode: &Episode) -> u8 {
    let total = episode.panels.len();
    let approved = episode
        .panels
        .iter()
        .filter(|p| p.status == PanelStatus::Approved)
        .count();
    ratio_pct(approved, total)
}

/// `round(100 * part / total)`, half rounding up; 0 when `total` is 0.
#[must_use]
pub fn ratio_pct(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (200 * part + total) / (2 * total);
    u8::try_from(pct).unwrap_or(100)
}

/// Named filter over the episode collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeFilter {
    /// Every episode.
    #[default]
    All,
    /// Neither archived nor completed.
    Active,
    /// Exactly this status.
    Status(EpisodeStatus),
}

impl EpisodeFilter {
    /// Whether `episode` passes this filter.
    #[must_use]
    pub fn matches(self, episode: &Episode) -> bool {
        match self {
            Self::All => true,
            Self::Active => !matches!(
                episode.status,
                EpisodeStatus::Archived | EpisodeStatus::Completed
            ),
            Self::Status(status) => episode.status == status,
        }
    }
}

impl FromStr for EpisodeFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            other => other.parse().map(Self::Status).map_err(|_| {
                DomainError::Validation(format!("unknown episode filter: {other}"))
            }),
        }
    }
}

/// Case-insensitive substring search over an episode's title and summary and
/// its panels' descriptions and panel types. A blank query matches everything.
#[must_use]
pub fn matches_search(episode: &Episode, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |haystack: &str| haystack.to_lowercase().contains(&needle);
    hit(&episode.title)
        || hit(&episode.summary)
        || episode
            .panels
            .iter()
            .any(|p| hit(&p.description) || hit(p.panel_type.label()))
}

/// Applies a filter and an optional search to `episodes`, keeping order.
#[must_use]
pub fn select_episodes<'a>(
    episodes: &'a [Episode],
    filter: EpisodeFilter,
    query: Option<&str>,
) -> Vec<&'a Episode> {
    episodes
        .iter()
        .filter(|e| filter.matches(e))
        .filter(|e| query.is_none_or(|q| matches_search(e, q)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelsmith_core::record::PanelType;
    use panelsmith_test_support::episode_with_panels;

    fn with_status(id: i64, status: EpisodeStatus) -> Episode {
        let mut episode = episode_with_panels(id, &[(id * 10, 1)]);
        episode.status = status;
        episode
    }

    #[test]
    fn test_completion_pct_of_empty_episode_is_zero() {
        let episode = episode_with_panels(1, &[]);

        assert_eq!(completion_pct(&episode), 0);
    }

    #[test]
    fn test_completion_pct_rounds_approved_share() {
        // Arrange
        let mut episode = episode_with_panels(1, &[(1, 1), (2, 1), (3, 2)]);
        episode.panels[0].status = PanelStatus::Approved;

        // Act / Assert: 1 of 3 is 33.3%.
        assert_eq!(completion_pct(&episode), 33);

        episode.panels[1].status = PanelStatus::Approved;
        // 2 of 3 is 66.7%.
        assert_eq!(completion_pct(&episode), 67);
        assert_eq!(completion_pct(&episode), 67);

        episode.panels[2].status = PanelStatus::Approved;
        assert_eq!(completion_pct(&episode), 100);
    }

    #[test]
    fn test_ratio_pct_rounds_half_up() {
        assert_eq!(ratio_pct(1, 8), 13);
        assert_eq!(ratio_pct(1, 2), 50);
        assert_eq!(ratio_pct(0, 0), 0);
    }

    #[test]
    fn test_active_filter_excludes_archived_and_completed() {
        let episodes: Vec<Episode> = EpisodeStatus::ALL
            .iter()
            .zip(1..)
            .map(|(status, id)| with_status(id, *status))
            .collect();

        let active = select_episodes(&episodes, EpisodeFilter::Active, None);

        let statuses: Vec<EpisodeStatus> = active.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                EpisodeStatus::Todo,
                EpisodeStatus::InProgress,
                EpisodeStatus::Review
            ]
        );
        assert_eq!(select_episodes(&episodes, EpisodeFilter::All, None).len(), 5);
    }

    #[test]
    fn test_status_filter_matches_exactly() {
        let episodes = vec![
            with_status(1, EpisodeStatus::Review),
            with_status(2, EpisodeStatus::Todo),
            with_status(3, EpisodeStatus::Review),
        ];
        let filter: EpisodeFilter = "review".parse().unwrap();

        let ids: Vec<i64> = select_episodes(&episodes, filter, None)
            .iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_filter_parse_rejects_unknown_names() {
        assert_eq!("all".parse::<EpisodeFilter>().unwrap(), EpisodeFilter::All);
        assert_eq!("active".parse::<EpisodeFilter>().unwrap(), EpisodeFilter::Active);
        assert!(matches!(
            "someday".parse::<EpisodeFilter>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_search_matches_title_summary_and_panels() {
        let mut episode = episode_with_panels(1, &[(1, 1)]);
        episode.title = "Rooftop Showdown".to_owned();
        episode.summary = "Kaito confronts Ryu".to_owned();
        episode.panels[0].description = "The whistle echoes".to_owned();
        episode.panels[0].panel_type = PanelType::DramaticReveal;

        assert!(matches_search(&episode, "rooftop"));
        assert!(matches_search(&episode, "CONFRONTS"));
        assert!(matches_search(&episode, "whistle"));
        assert!(matches_search(&episode, "dramatic"));
        assert!(matches_search(&episode, "  "));
        assert!(!matches_search(&episode, "locker"));
    }

    #[test]
    fn test_select_episodes_combines_filter_and_search() {
        let mut archived = with_status(1, EpisodeStatus::Archived);
        archived.title = "Finals".to_owned();
        let mut active = with_status(2, EpisodeStatus::InProgress);
        active.title = "Finals Rematch".to_owned();
        let episodes = vec![archived, active];

        let found = select_episodes(&episodes, EpisodeFilter::Active, Some("finals"));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn test_permissive_policy_allows_everything() {
        let policy = PermissiveTransitions;
        for from in EpisodeStatus::ALL {
            for to in EpisodeStatus::ALL {
                assert!(policy.check_episode(from, to).is_ok());
            }
        }
        for from in PanelStatus::ALL {
            for to in PanelStatus::ALL {
                assert!(policy.check_panel(from, to).is_ok());
            }
        }
    }

    #[test]
    fn test_forward_only_policy_refuses_reopening() {
        let policy = ForwardOnlyTransitions;

        match policy.check_episode(EpisodeStatus::Completed, EpisodeStatus::Todo) {
            Err(DomainError::TransitionRejected { from, to }) => {
                assert_eq!(from, "completed");
                assert_eq!(to, "todo");
            }
            other => panic!("expected TransitionRejected, got {other:?}"),
        }
        assert!(policy
            .check_episode(EpisodeStatus::Archived, EpisodeStatus::Todo)
            .is_err());
        assert!(policy
            .check_episode(EpisodeStatus::Completed, EpisodeStatus::Review)
            .is_ok());
        assert!(policy
            .check_panel(PanelStatus::Approved, PanelStatus::Queued)
            .is_err());
        assert!(policy
            .check_panel(PanelStatus::Approved, PanelStatus::Redo)
            .is_ok());
    }
}
