//! Panelsmith API: the HTTP surface of the script breakdown engine.
//!
//! Breakdowns are composed and staged under an import id, then committed
//! into the production store as new episodes or appended onto an existing
//! one. The episode routes expose the workflow read side and status changes.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
