//! Domain model for the Script Breakdown context.

pub mod breakdown;
pub mod commands;
pub mod entities;
pub mod scenes;
