//! The per-level simulation snapshot.
//!
//! A [`SimulationState`] is produced once per level by the step evolver and
//! never mutated afterwards. Fields are private so the only way to obtain a
//! state is to build a whole new one.

use serde::{Deserialize, Serialize};

use crate::point::Point3;

/// The three conserved energy reservoirs.
///
/// Their sum is 1 at every level of a run; the energy ledger verifies this
/// after each step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyReservoirs {
    /// Energy bound in the realized geometry.
    #[serde(rename = "E_geom")]
    pub geom: f64,
    /// Energy available to heal defects.
    #[serde(rename = "E_heal")]
    pub heal: f64,
    /// Energy irreversibly lost to entropy.
    #[serde(rename = "E_entropy")]
    pub entropy: f64,
}

impl EnergyReservoirs {
    /// All energy in the geometric reservoir.
    pub const INITIAL: Self = Self {
        geom: 1.0,
        heal: 0.0,
        entropy: 0.0,
    };

    /// Sum of the three reservoirs.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn total(&self) -> f64 {
        self.geom + self.heal + self.entropy
    }

    /// Reservoirs as `(name, value)` pairs in canonical order.
    pub const fn named(&self) -> [(&'static str, f64); 3] {
        [
            ("E_geom", self.geom),
            ("E_heal", self.heal),
            ("E_entropy", self.entropy),
        ]
    }
}

/// Snapshot of the system at one discrete level `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Subdivision level.
    t: u32,
    /// Centers of the cells that survived every level up to `t`.
    realized_centers: Vec<Point3>,
    /// Unhealed defects produced by the step that reached this level.
    defects_count: u64,
    /// Energy reservoirs at this level.
    energy: EnergyReservoirs,
}

impl SimulationState {
    /// Assemble a snapshot from its parts.
    pub const fn new(
        t: u32,
        realized_centers: Vec<Point3>,
        defects_count: u64,
        energy: EnergyReservoirs,
    ) -> Self {
        Self {
            t,
            realized_centers,
            defects_count,
            energy,
        }
    }

    /// The canonical starting state: level 0, one cell at the unit cube's
    /// centroid, no defects, all energy geometric.
    pub fn initial() -> Self {
        Self::new(0, vec![Point3::CENTROID], 0, EnergyReservoirs::INITIAL)
    }

    /// Return the level.
    pub const fn t(&self) -> u32 {
        self.t
    }

    /// Return the realized cell centers in generation order.
    pub fn realized_centers(&self) -> &[Point3] {
        &self.realized_centers
    }

    /// Return the number of realized cells.
    pub fn n_realized_centers(&self) -> usize {
        self.realized_centers.len()
    }

    /// Return the unhealed defect count at this level.
    pub const fn defects_count(&self) -> u64 {
        self.defects_count
    }

    /// Return all three reservoirs.
    pub const fn energy(&self) -> EnergyReservoirs {
        self.energy
    }

    /// Return the geometric reservoir.
    pub const fn e_geom(&self) -> f64 {
        self.energy.geom
    }

    /// Return the healing reservoir.
    pub const fn e_heal(&self) -> f64 {
        self.energy.heal
    }

    /// Return the entropy reservoir.
    pub const fn e_entropy(&self) -> f64 {
        self.energy.entropy
    }

    /// Return the sum of the three reservoirs.
    pub fn total_energy(&self) -> f64 {
        self.energy.total()
    }

    /// Consume the snapshot, returning its point cloud.
    pub fn into_realized_centers(self) -> Vec<Point3> {
        self.realized_centers
    }
}

/// Counts-only snapshot of a level, for runs too deep to keep the point
/// cloud.
///
/// Carries the same bookkeeping as [`SimulationState`] with the realized
/// centers reduced to their number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CensusState {
    /// Subdivision level.
    pub t: u32,
    /// Number of realized cells.
    pub n_realized: u64,
    /// Unhealed defects produced by the step that reached this level.
    pub defects_count: u64,
    /// Energy reservoirs at this level.
    pub energy: EnergyReservoirs,
}

impl CensusState {
    /// The counts-only view of [`SimulationState::initial`].
    pub const fn initial() -> Self {
        Self {
            t: 0,
            n_realized: 1,
            defects_count: 0,
            energy: EnergyReservoirs::INITIAL,
        }
    }
}

impl From<&SimulationState> for CensusState {
    fn from(state: &SimulationState) -> Self {
        Self {
            t: state.t,
            n_realized: u64::try_from(state.realized_centers.len()).unwrap_or(u64::MAX),
            defects_count: state.defects_count,
            energy: state.energy,
        }
    }
}
