//! Defect probability and sampling.
//!
//! The probability that a candidate sub-cube fails at level `t` is
//!
//! ```text
//! p_def = p0 * (1 + eps)^(-t) * exp(-k * E_heal)
//! ```
//!
//! It decays geometrically with depth and exponentially with the energy held
//! in the healing reservoir. Every candidate gets exactly one uniform draw
//! from the run's random stream, in candidate order, and survives if the
//! draw exceeds `p_def`. Given the same stream and the same candidates the
//! partition into realized and defective cells is reproduced exactly.

use rand::Rng;
use sponge_types::Point3;

use crate::params::ParameterSet;

/// Failure probability of each candidate produced at level `t` when the
/// healing reservoir holds `e_heal`.
#[allow(clippy::arithmetic_side_effects)]
pub fn defect_probability(params: &ParameterSet, t: u32, e_heal: f64) -> f64 {
    let decay = i32::try_from(t).map_or(0.0, |exp| (1.0 + params.eps).powi(exp).recip());
    params.p0 * decay * (-params.k * e_heal).exp()
}

/// Candidates that survived one sampling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DefectSample {
    /// Surviving centers, in candidate order.
    pub realized: Vec<Point3>,
    /// Candidates that failed.
    pub defects: u64,
}

impl DefectSample {
    /// Total candidates sampled.
    pub fn candidates(&self) -> u64 {
        u64::try_from(self.realized.len())
            .unwrap_or(u64::MAX)
            .saturating_add(self.defects)
    }
}

/// Applies a fixed failure probability to a stream of candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefectSampler {
    p_def: f64,
}

impl DefectSampler {
    /// Sampler with an explicit failure probability.
    pub const fn new(p_def: f64) -> Self {
        Self { p_def }
    }

    /// Sampler for candidates produced at level `t` with `e_heal` in the
    /// healing reservoir.
    pub fn for_level(params: &ParameterSet, t: u32, e_heal: f64) -> Self {
        Self::new(defect_probability(params, t, e_heal))
    }

    /// The failure probability applied to each candidate.
    pub const fn p_def(&self) -> f64 {
        self.p_def
    }

    /// Draw once for a single candidate. Returns `true` if it survives.
    pub fn survives(&self, rng: &mut impl Rng) -> bool {
        rng.random::<f64>() > self.p_def
    }

    /// Partition `candidates` into survivors and a defect count, drawing once
    /// per candidate in order.
    pub fn sample(
        &self,
        candidates: impl IntoIterator<Item = Point3>,
        rng: &mut impl Rng,
    ) -> DefectSample {
        let mut realized = Vec::new();
        let mut defects: u64 = 0;

        for candidate in candidates {
            if self.survives(rng) {
                realized.push(candidate);
            } else {
                defects = defects.saturating_add(1);
            }
        }

        DefectSample { realized, defects }
    }

    /// Count survivors among `candidates` anonymous candidates, drawing once
    /// per candidate. Consumes the stream exactly like [`Self::sample`].
    pub fn count_survivors(&self, candidates: u64, rng: &mut impl Rng) -> u64 {
        let mut survivors: u64 = 0;
        for _ in 0..candidates {
            if self.survives(rng) {
                survivors = survivors.saturating_add(1);
            }
        }
        survivors
    }
}
