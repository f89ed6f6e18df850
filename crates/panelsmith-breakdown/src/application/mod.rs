//! Application layer for the Script Breakdown context.

pub mod command_handlers;
