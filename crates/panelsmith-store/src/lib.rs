//! Episode stores for the Panelsmith engine.
//!
//! The engine only sees the `EpisodeRepository` trait; this crate supplies
//! the PostgreSQL implementation used in production and an in-memory one for
//! local runs without a database.

pub mod memory_episode_repository;
pub mod pg_episode_repository;
pub mod schema;
