//! Shared type definitions for the sponge growth simulation.
//!
//! This crate is the single source of truth for the value types that flow
//! between the energy ledger, the growth engine, and the analysis tools.
//!
//! # Modules
//!
//! - [`point`] -- 3D coordinates of cell centers
//! - [`cell`] -- Optional per-cell provenance records
//! - [`state`] -- The immutable per-level [`SimulationState`] snapshot and
//!   its three energy reservoirs, plus the counts-only [`CensusState`]
//! - [`series`] -- The exported per-level [`SeriesPoint`] row

pub mod cell;
pub mod point;
pub mod series;
pub mod state;

// Re-export all public types at crate root for convenience.
pub use cell::{Cell, CellId};
pub use point::Point3;
pub use series::SeriesPoint;
pub use state::{CensusState, EnergyReservoirs, SimulationState};
