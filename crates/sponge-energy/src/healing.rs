//! Healing allocation: how many of a level's defects the healing reservoir
//! can pay for.
//!
//! Each defect at level `t` removes `20^-t` of geometric energy (one of the
//! `20^t` equal cells the level would have if the sponge were perfect), and
//! healing it costs the same amount. The usable energy is capped twice:
//!
//! ```text
//! deficit   = defects * cost(t)
//! available = E_heal + alpha * deficit
//! used      = min(eta * available, deficit)
//! healed    = min(floor(used / cost(t)), defects)
//! residual  = used - healed * cost(t)
//! ```
//!
//! A fully funded step (`used == deficit`) heals every defect.
//!
//! Healing is pure accounting. Healed defects restore geometric energy but
//! their cells are not added back to the realized point cloud.

use serde::Serialize;

/// Number of sub-cells kept per subdivision.
pub const BRANCHING: f64 = 20.0;

/// Energy carried by one cell at `level`: `20^-level`.
///
/// Levels beyond `i32::MAX` carry no measurable energy and return 0.
pub fn unit_cost(level: u32) -> f64 {
    i32::try_from(level).map_or(0.0, |exp| BRANCHING.powi(exp).recip())
}

/// Converts available healing energy into a healed-defect count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealingAllocator {
    /// Share of the defect deficit routed into the healing reservoir.
    alpha: f64,
    /// Fraction of available healing energy that can actually be spent.
    eta: f64,
}

/// Outcome of one healing allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealingAllocation {
    /// The level the defects belong to (the level being grown into).
    pub level: u32,
    /// Per-defect healing cost at that level.
    pub unit_cost: f64,
    /// Defects before healing.
    pub defects: u64,
    /// Geometric energy lost to those defects.
    pub deficit: f64,
    /// Healing energy available this step, including the `alpha` share of
    /// the deficit.
    pub available: f64,
    /// Healing energy drawn from the healing reservoir.
    pub used: f64,
    /// Defects repaired, never more than `defects`.
    pub healed: u64,
    /// Energy spent on the repaired defects: `healed * unit_cost`.
    pub repaired: f64,
    /// Drawn energy that did not buy a whole repair.
    pub residual: f64,
}

impl HealingAllocation {
    /// Defects left unhealed.
    pub const fn remaining_defects(&self) -> u64 {
        self.defects.saturating_sub(self.healed)
    }
}

impl HealingAllocator {
    /// Create an allocator from the deficit share and the healing efficiency.
    pub const fn new(alpha: f64, eta: f64) -> Self {
        Self { alpha, eta }
    }

    /// Allocate healing for `defects` new defects at `level`, given the
    /// healing reservoir `heal_reserve` before the step.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn allocate(&self, defects: u64, heal_reserve: f64, level: u32) -> HealingAllocation {
        let cost = unit_cost(level);
        let deficit = defects as f64 * cost;
        let available = self.alpha.mul_add(deficit, heal_reserve);
        let used = (self.eta * available).min(deficit);

        let healed = if defects > 0 && used >= deficit {
            // Fully funded. `(n * c) / c` can land just below `n`.
            defects
        } else {
            Self::affordable(used, cost, defects)
        };

        let repaired = healed as f64 * cost;
        let residual = used - repaired;

        HealingAllocation {
            level,
            unit_cost: cost,
            defects,
            deficit,
            available,
            used,
            healed,
            repaired,
            residual,
        }
    }

    /// `floor(used / cost)` with a few ulps of slack, clamped to
    /// `[0, defects]`. A NaN or negative quotient heals nothing.
    #[allow(
        clippy::arithmetic_side_effects,
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn affordable(used: f64, cost: f64, defects: u64) -> u64 {
        if cost <= 0.0 {
            return 0;
        }
        let quotient = ((used / cost) * 4.0_f64.mul_add(f64::EPSILON, 1.0)).floor();
        if quotient.is_nan() || quotient <= 0.0 {
            0
        } else if quotient >= defects as f64 {
            defects
        } else {
            // 0 < quotient < defects, so the cast is exact.
            quotient as u64
        }
    }
}
