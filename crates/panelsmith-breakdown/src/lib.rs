//! Panelsmith Script Breakdown bounded context.
//!
//! Turns a block of narrative text into a candidate Episode → Page → Panel
//! tree: heuristic entity extraction, scene segmentation, and composition.
//! Nothing in this crate writes to the production store.

pub mod application;
pub mod domain;
