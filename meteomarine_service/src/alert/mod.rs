//! Forecast alert filtering and observation staleness.
//!
//! Submodules:
//! - `filters`: "only alerts" and "only days with precipitation risk" toggles.
//! - `stalenesses`: flags stations whose newest observation is too old.

pub mod filters;
pub mod stalenesses;
