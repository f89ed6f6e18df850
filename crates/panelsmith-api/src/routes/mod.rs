//! Route modules.

pub mod breakdowns;
pub mod episodes;
pub mod health;
