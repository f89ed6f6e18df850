//! Panelsmith Production Hierarchy & Workflow bounded context.
//!
//! Responsible for committing breakdowns into the production store (as new
//! episodes or appended onto an existing one) with globally unique,
//! monotonically increasing ids, and for the episode/panel status workflow
//! layered on top of the committed hierarchy.

pub mod application;
pub mod domain;
