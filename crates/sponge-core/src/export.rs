//! The persisted-result record.
//!
//! A finished run is saved as one JSON object with exactly three top-level
//! keys:
//!
//! ```json
//! {
//!   "meta":   { "model": "FCC-CORE", "version": "1.3.1", "seed": 42 },
//!   "params": { "p0": 0.05, "eps": 0.3, "k": 2.0, "alpha": 0.7, "eta": 0.5, "beta": 0.02 },
//!   "series": [ { "t": 0, "defects_count": 0, "E_geom": 1.0, "E_heal": 0.0,
//!                 "E_entropy": 0.0, "n_realized_centers": 1 } ]
//! }
//! ```
//!
//! Serialization is left to the caller; the record only fixes the shape.

use serde::{Deserialize, Serialize};
use sponge_types::{CensusState, SeriesPoint, SimulationState};

use crate::params::ParameterSet;

/// Model identifier written to every record.
pub const MODEL_NAME: &str = "FCC-CORE";

/// Model version written to every record.
pub const MODEL_VERSION: &str = "1.3.1";

/// Provenance of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMeta {
    /// Model identifier.
    pub model: String,
    /// Model version.
    pub version: String,
    /// Seed of the run, if it was seeded.
    pub seed: Option<u64>,
}

impl RunMeta {
    /// Metadata for the current model with the given seed.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            model: MODEL_NAME.to_owned(),
            version: MODEL_VERSION.to_owned(),
            seed,
        }
    }
}

/// A finished run ready to be written out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Provenance.
    pub meta: RunMeta,
    /// Constants the run used.
    pub params: ParameterSet,
    /// One row per state, in level order.
    pub series: Vec<SeriesPoint>,
}

impl RunRecord {
    /// Record a full run.
    pub fn from_states(params: ParameterSet, seed: Option<u64>, states: &[SimulationState]) -> Self {
        Self {
            meta: RunMeta::new(seed),
            params,
            series: states.iter().map(SeriesPoint::from).collect(),
        }
    }

    /// Record a counts-only run.
    pub fn from_census(params: ParameterSet, seed: Option<u64>, states: &[CensusState]) -> Self {
        Self {
            meta: RunMeta::new(seed),
            params,
            series: states.iter().map(SeriesPoint::from).collect(),
        }
    }

    /// The last row of the series, if any.
    pub fn final_point(&self) -> Option<&SeriesPoint> {
        self.series.last()
    }
}
