//! Geometry stages that run after a symbol has been located
//!
//! Finder-pattern detection lives with the format readers; this module
//! holds the shared perspective sampling they feed their corners into.

/// Sample grid extraction and perspective correction
pub mod grid_sampler;

pub use grid_sampler::{DefaultGridSampler, GridSampler, check_and_nudge_points, default_grid_sampler};
