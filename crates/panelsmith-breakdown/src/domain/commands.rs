//! Commands for the Script Breakdown context.

use panelsmith_core::command::Command;
use uuid::Uuid;

use super::breakdown::EpisodeCountHint;

/// Command to break a block of narrative text down into a candidate
/// Episode → Page → Panel tree.
#[derive(Debug, Clone)]
pub struct BreakdownScript {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The raw narrative text.
    pub text: String,
    /// How many candidate episodes to produce.
    pub episode_count: EpisodeCountHint,
}

impl Command for BreakdownScript {
    fn command_type(&self) -> &'static str {
        "breakdown.breakdown_script"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
