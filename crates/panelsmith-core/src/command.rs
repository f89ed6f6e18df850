//! Requests handled by the breakdown and production contexts.

use uuid::Uuid;

/// A breakdown, merge or status-change request. Handlers record both
/// identifiers on their tracing span.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable dotted name such as `"production.create_episodes"`, logged as
    /// `command_type`.
    fn command_type(&self) -> &'static str;

    /// Id shared by every log line the request produces.
    fn correlation_id(&self) -> Uuid;
}
