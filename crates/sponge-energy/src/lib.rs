//! Three-reservoir energy ledger for the sponge growth simulation.
//!
//! All energy in a run lives in three reservoirs: geometric, healing, and
//! entropy. Energy is never created or destroyed, only moved between them.
//! The conservation law is enforced at the end of every step.
//!
//! # Architecture
//!
//! - [`healing`] -- The [`HealingAllocator`]: turns available healing energy
//!   into a healed-defect count at a per-level unit cost.
//! - [`flows`] -- [`EnergyFlows`]: every transfer of one step, applied to the
//!   previous reservoirs as a single transition.
//! - [`conservation`] -- Conservation law and bound verification.
//!
//! # Conservation Law
//!
//! For every level t:
//!
//! ```text
//! E_geom(t) + E_heal(t) + E_entropy(t) == 1   (within 1e-10)
//! 0 <= E_x(t) <= 1                            for each reservoir
//! ```
//!
//! A violation produces an [`EnergyAnomaly`]. The ledger never panics; it
//! returns results.
//!
//! # Flow Table
//!
//! | Flow | From | To |
//! |------|------|----|
//! | Defect deficit (`alpha` share) | Geometric | Healing |
//! | Defect deficit (`1 - alpha` share) | Geometric | Entropy |
//! | Healing spent on repairs | Healing | Geometric |
//! | Unspent fractional healing | Healing | Geometric |
//! | Leak (`beta * E_heal`) | Healing | Entropy |
//!
//! # Usage
//!
//! ```
//! use sponge_energy::{EnergyFlows, HealingAllocator};
//! use sponge_energy::conservation::{verify_conservation, ConservationResult};
//! use sponge_types::EnergyReservoirs;
//!
//! let allocator = HealingAllocator::new(0.7, 0.5);
//! let start = EnergyReservoirs::INITIAL;
//!
//! // Three defects while growing level 0 -> 1.
//! let healing = allocator.allocate(3, start.heal, 1);
//! let flows = EnergyFlows::for_step(&start, &healing, 0.7, 0.02);
//! let next = flows.apply(&start);
//!
//! assert_eq!(verify_conservation(1, &next), ConservationResult::Balanced);
//! ```

pub mod conservation;
pub mod flows;
pub mod healing;

// Re-export primary types at crate root.
pub use conservation::{ConservationResult, ENERGY_TOLERANCE};
pub use flows::EnergyFlows;
pub use healing::{HealingAllocation, HealingAllocator, unit_cost};

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A single way in which a set of reservoirs broke the conservation law.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub enum Violation {
    /// The reservoirs do not sum to 1 within [`ENERGY_TOLERANCE`].
    Imbalance {
        /// The actual sum.
        total: f64,
    },
    /// A reservoir left the closed interval `[0, 1]` (or is not finite).
    OutOfBounds {
        /// The reservoir name as it appears in exported series.
        reservoir: &'static str,
        /// The offending value.
        value: f64,
    },
}

impl core::fmt::Display for Violation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Imbalance { total } => write!(f, "reservoirs sum to {total}, expected 1"),
            Self::OutOfBounds { reservoir, value } => {
                write!(f, "{reservoir} = {value} is outside [0, 1]")
            }
        }
    }
}

/// A conservation law violation detected after a step.
///
/// Captures every violated condition at once so the report is complete.
#[derive(Debug, Clone, PartialEq, serde::Serialize, thiserror::Error)]
#[error("ENERGY_ANOMALY at level {level}: {message}")]
pub struct EnergyAnomaly {
    /// The level whose state failed verification.
    pub level: u32,
    /// Every violated condition, imbalance first.
    pub violations: Vec<Violation>,
    /// Human-readable summary of the violations.
    pub message: String,
}
