//! Time source for merge and status-change timestamps.

use chrono::{DateTime, Utc};

/// Supplies `committed_at` for merges and `changed_at` for status changes.
/// Tests pin it to a fixed instant.
pub trait Clock: Send + Sync {
    /// Returns the instant to stamp on the record being written.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, used by the API server.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
