//! Shared test mocks and utilities for the Panelsmith script breakdown engine.

mod clock;
mod fixtures;
mod repository;

pub use clock::FixedClock;
pub use fixtures::episode_with_panels;
pub use repository::{FailingEpisodeRepository, RecordingEpisodeRepository};
