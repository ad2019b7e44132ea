//! One row of an exported run series.

use serde::{Deserialize, Serialize};

use crate::state::{CensusState, SimulationState};

/// Per-level summary of a run, as persisted under the `series` key.
///
/// Field names are part of the persisted-result schema and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Subdivision level.
    pub t: u32,
    /// Unhealed defects at this level.
    pub defects_count: u64,
    /// Geometric reservoir.
    #[serde(rename = "E_geom")]
    pub e_geom: f64,
    /// Healing reservoir.
    #[serde(rename = "E_heal")]
    pub e_heal: f64,
    /// Entropy reservoir.
    #[serde(rename = "E_entropy")]
    pub e_entropy: f64,
    /// Number of realized cells.
    pub n_realized_centers: u64,
}

impl From<&SimulationState> for SeriesPoint {
    fn from(state: &SimulationState) -> Self {
        Self {
            t: state.t(),
            defects_count: state.defects_count(),
            e_geom: state.e_geom(),
            e_heal: state.e_heal(),
            e_entropy: state.e_entropy(),
            n_realized_centers: u64::try_from(state.n_realized_centers()).unwrap_or(u64::MAX),
        }
    }
}

impl From<&CensusState> for SeriesPoint {
    fn from(state: &CensusState) -> Self {
        Self {
            t: state.t,
            defects_count: state.defects_count,
            e_geom: state.energy.geom,
            e_heal: state.energy.heal,
            e_entropy: state.energy.entropy,
            n_realized_centers: state.n_realized,
        }
    }
}
