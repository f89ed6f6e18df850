//! Application layer for the Production context.

pub mod command_handlers;
pub mod query_handlers;
pub mod write_lock;
