//! Domain model for the Production context.

pub mod commands;
pub mod merge;
pub mod workflow;
