//! Conservation law verification for the energy reservoirs.
//!
//! After every step the reservoirs must sum to 1 within
//! [`ENERGY_TOLERANCE`], and each must lie in the closed interval `[0, 1]`.
//! Flows are constructed so that the sum is preserved, so a failure here
//! means a parameter set outside its stability region or a floating-point
//! defect, never an ordinary outcome.
//!
//! A violation produces an [`EnergyAnomaly`] listing every failed condition.

use sponge_types::EnergyReservoirs;
use tracing::warn;

use crate::{EnergyAnomaly, Violation};

/// Maximum allowed deviation of the reservoir sum from 1.
pub const ENERGY_TOLERANCE: f64 = 1e-10;

/// The result of a conservation check for a single level.
#[derive(Debug, Clone, PartialEq)]
pub enum ConservationResult {
    /// All reservoirs are in bounds and sum to 1.
    Balanced,
    /// One or more conditions failed.
    Anomaly(EnergyAnomaly),
}

impl ConservationResult {
    /// Convert into a `Result`, turning an anomaly into an error.
    pub fn into_result(self) -> Result<(), EnergyAnomaly> {
        match self {
            Self::Balanced => Ok(()),
            Self::Anomaly(anomaly) => Err(anomaly),
        }
    }
}

/// Verify the conservation law for the reservoirs at `level`.
///
/// Uses [`ENERGY_TOLERANCE`] for the sum. Bounds are checked exactly.
pub fn verify_conservation(level: u32, energy: &EnergyReservoirs) -> ConservationResult {
    verify_conservation_with_tolerance(level, energy, ENERGY_TOLERANCE)
}

/// Verify the conservation law with a caller-chosen tolerance on the sum.
#[allow(clippy::arithmetic_side_effects)]
pub fn verify_conservation_with_tolerance(
    level: u32,
    energy: &EnergyReservoirs,
    tolerance: f64,
) -> ConservationResult {
    let mut violations = Vec::new();

    let total = energy.total();
    // Written so that a NaN total also fails.
    if !((total - 1.0).abs() < tolerance) {
        violations.push(Violation::Imbalance { total });
    }

    for (reservoir, value) in energy.named() {
        if !(0.0..=1.0).contains(&value) {
            violations.push(Violation::OutOfBounds { reservoir, value });
        }
    }

    if violations.is_empty() {
        return ConservationResult::Balanced;
    }

    let details: Vec<String> = violations.iter().map(ToString::to_string).collect();
    let message = details.join("; ");
    warn!(level, total, %message, "Energy conservation violated");

    ConservationResult::Anomaly(EnergyAnomaly {
        level,
        violations,
        message,
    })
}
