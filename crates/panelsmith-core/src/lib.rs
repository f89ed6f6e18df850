//! Panelsmith Core: shared production records and seams.
//!
//! This crate defines the plain records (episodes, panels, status values)
//! that every bounded context reads and writes, plus the traits that the
//! engine talks to its collaborators through. It contains no infrastructure
//! code.

pub mod clock;
pub mod command;
pub mod error;
pub mod record;
pub mod repository;
