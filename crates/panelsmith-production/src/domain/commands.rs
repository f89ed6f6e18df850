//! Commands for the Production context.

use panelsmith_breakdown::domain::breakdown::Breakdown;
use panelsmith_core::command::Command;
use panelsmith_core::record::{EpisodeStatus, PanelStatus};
use uuid::Uuid;

/// Command to append every panel of a breakdown onto an existing episode.
#[derive(Debug, Clone)]
pub struct AppendBreakdown {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The episode receiving the panels.
    pub target_episode_id: i64,
    /// The breakdown to commit.
    pub breakdown: Breakdown,
}

impl Command for AppendBreakdown {
    fn command_type(&self) -> &'static str {
        "production.append_breakdown"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to create new episodes from a breakdown.
#[derive(Debug, Clone)]
pub struct CreateEpisodes {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The breakdown to commit.
    pub breakdown: Breakdown,
}

impl Command for CreateEpisodes {
    fn command_type(&self) -> &'static str {
        "production.create_episodes"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to set an episode's production status.
#[derive(Debug, Clone)]
pub struct ChangeEpisodeStatus {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The episode to update.
    pub episode_id: i64,
    /// The requested status.
    pub status: EpisodeStatus,
}

impl Command for ChangeEpisodeStatus {
    fn command_type(&self) -> &'static str {
        "production.change_episode_status"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to set a panel's production status.
#[derive(Debug, Clone)]
pub struct ChangePanelStatus {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The episode holding the panel.
    pub episode_id: i64,
    /// The panel to update.
    pub panel_id: i64,
    /// The requested status.
    pub status: PanelStatus,
}

impl Command for ChangePanelStatus {
    fn command_type(&self) -> &'static str {
        "production.change_panel_status"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
