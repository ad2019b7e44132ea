//! Per-step energy transfers between the three reservoirs.

use serde::Serialize;
use sponge_types::EnergyReservoirs;

use crate::healing::HealingAllocation;

/// Every energy transfer of one step.
///
/// All quantities are non-negative for valid parameters. Applying the flows
/// moves energy between reservoirs without changing the total:
///
/// ```text
/// E_geom'    = E_geom - deficit + repaired + residual
/// E_heal'    = E_heal + to_heal - used - leak
/// E_entropy' = E_entropy + to_entropy + leak
/// ```
///
/// where `to_heal + to_entropy == deficit` and `repaired + residual == used`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyFlows {
    /// Geometric energy lost to this step's defects.
    pub deficit: f64,
    /// The `alpha` share of the deficit, credited to the healing reservoir.
    pub to_heal: f64,
    /// The `1 - alpha` share of the deficit, credited to entropy.
    pub to_entropy: f64,
    /// Healing energy drawn this step.
    pub used: f64,
    /// The part of `used` that paid for whole repairs.
    pub repaired: f64,
    /// The part of `used` folded back into geometry without a repair.
    pub residual: f64,
    /// Healing energy leaked to entropy: `beta * E_heal` before the step.
    pub leak: f64,
}

impl EnergyFlows {
    /// Derive the flows of one step from the reservoirs before it, the
    /// step's healing allocation, and the deficit share and leak rate.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn for_step(
        before: &EnergyReservoirs,
        healing: &HealingAllocation,
        alpha: f64,
        beta: f64,
    ) -> Self {
        let to_heal = alpha * healing.deficit;
        Self {
            deficit: healing.deficit,
            to_heal,
            to_entropy: healing.deficit - to_heal,
            used: healing.used,
            repaired: healing.repaired,
            residual: healing.residual,
            leak: beta * before.heal,
        }
    }

    /// Apply the flows to `before`, returning the reservoirs after the step.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn apply(&self, before: &EnergyReservoirs) -> EnergyReservoirs {
        EnergyReservoirs {
            geom: before.geom - self.deficit + self.repaired + self.residual,
            heal: before.heal + self.to_heal - self.used - self.leak,
            entropy: before.entropy + self.to_entropy + self.leak,
        }
    }
}
