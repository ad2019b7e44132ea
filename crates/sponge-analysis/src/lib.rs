//! Post-run analysis for the sponge growth simulation.
//!
//! Everything here reads finished output and never touches a run in
//! progress.
//!
//! - [`dimension`] -- Box-counting estimate of the scaling dimension of a
//!   point cloud.
//! - [`diagnostics`] -- Derived columns over an exported series.

pub mod diagnostics;
pub mod dimension;

pub use diagnostics::{EnergySeries, energy_series, normalized_defects};
pub use dimension::{DimensionEstimate, box_counting_dimension};
