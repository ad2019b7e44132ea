//! The step evolver: one verified transition from level `t` to `t + 1`.
//!
//! # Order of operations
//!
//! 1. Compute `p_def` from the current healing reservoir.
//! 2. Generate the 20 candidates of every realized cell and sample defects.
//! 3. Allocate healing for the new defects.
//! 4. Move energy between reservoirs (see [`EnergyFlows`]).
//! 5. Verify conservation and bounds. A failure aborts the run.
//!
//! Healed defects only affect the energy accounting. Their centers are not
//! added back to the realized point cloud.

use rand::Rng;
use serde::Serialize;
use sponge_energy::conservation::verify_conservation;
use sponge_energy::{EnergyAnomaly, EnergyFlows, HealingAllocation, HealingAllocator};
use sponge_types::{EnergyReservoirs, SimulationState};
use tracing::debug;

use crate::defects::DefectSampler;
use crate::growth;
use crate::params::ParameterSet;

/// Errors that abort a step.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The state after the step broke energy conservation or a reservoir
    /// bound.
    #[error("invariant violation: {source}")]
    InvariantViolation {
        /// The detected anomaly.
        #[from]
        source: EnergyAnomaly,
    },

    /// The level counter cannot advance further.
    #[error("level counter overflow: cannot advance beyond level {level}")]
    LevelOverflow {
        /// The level that could not be advanced.
        level: u32,
    },
}

/// What happened during one step, beyond the resulting state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepReport {
    /// The level reached by the step.
    pub level: u32,
    /// Failure probability applied to each candidate.
    pub p_def: f64,
    /// Candidates generated.
    pub candidates: u64,
    /// Realized candidates.
    pub realized: u64,
    /// Healing allocation for the step's defects.
    pub healing: HealingAllocation,
    /// Energy moved between reservoirs.
    pub flows: EnergyFlows,
}

impl StepReport {
    /// Defects before healing.
    pub const fn defects(&self) -> u64 {
        self.healing.defects
    }

    /// Defects repaired.
    pub const fn healed(&self) -> u64 {
        self.healing.healed
    }
}

/// Advances [`SimulationState`]s one level at a time.
///
/// The evolver does not validate its parameters; [`crate::runner`] does that
/// once per run. Driving it directly with out-of-range parameters is allowed
/// and leaves the conservation check as the only guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvolver {
    params: ParameterSet,
    allocator: HealingAllocator,
}

impl StepEvolver {
    /// Create an evolver for `params`.
    pub const fn new(params: ParameterSet) -> Self {
        Self {
            params,
            allocator: HealingAllocator::new(params.alpha, params.eta),
        }
    }

    /// The parameters this evolver applies.
    pub const fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Advance `state` by one level, drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvariantViolation`] if the resulting reservoirs
    /// break conservation or bounds, and [`StepError::LevelOverflow`] if the
    /// level cannot be incremented.
    pub fn evolve(
        &self,
        state: &SimulationState,
        rng: &mut impl Rng,
    ) -> Result<(SimulationState, StepReport), StepError> {
        let t = state.t();
        let next_level = t
            .checked_add(1)
            .ok_or(StepError::LevelOverflow { level: t })?;

        let sampler = DefectSampler::for_level(&self.params, t, state.e_heal());
        let sample = sampler.sample(growth::children(state.realized_centers(), t), rng);
        let candidates = sample.candidates();

        let (energy, report) = self.settle(
            &state.energy(),
            next_level,
            sampler.p_def(),
            candidates,
            sample.defects,
        )?;

        let next = SimulationState::new(
            next_level,
            sample.realized,
            report.healing.remaining_defects(),
            energy,
        );
        Ok((next, report))
    }

    /// Do the healing and energy accounting for `defects` new defects among
    /// `candidates` candidates at `next_level`, and verify the result.
    ///
    /// Shared by the full and counts-only evolutions so both keep identical
    /// books.
    pub(crate) fn settle(
        &self,
        before: &EnergyReservoirs,
        next_level: u32,
        p_def: f64,
        candidates: u64,
        defects: u64,
    ) -> Result<(EnergyReservoirs, StepReport), StepError> {
        let healing = self.allocator.allocate(defects, before.heal, next_level);
        let flows = EnergyFlows::for_step(before, &healing, self.params.alpha, self.params.beta);
        let after = flows.apply(before);

        verify_conservation(next_level, &after).into_result()?;

        let report = StepReport {
            level: next_level,
            p_def,
            candidates,
            realized: candidates.saturating_sub(defects),
            healing,
            flows,
        };

        debug!(
            level = next_level,
            p_def,
            candidates,
            defects,
            healed = healing.healed,
            e_geom = after.geom,
            e_heal = after.heal,
            e_entropy = after.entropy,
            "Step settled"
        );

        Ok((after, report))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sponge_energy::{ENERGY_TOLERANCE, Violation};
    use sponge_types::{CensusState, Point3};

    use super::*;

    fn evolve_n(params: ParameterSet, seed: u64, levels: u32) -> Vec<(SimulationState, StepReport)> {
        let evolver = StepEvolver::new(params);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = SimulationState::initial();
        let mut out = Vec::new();
        for _ in 0..levels {
            let (next, report) = evolver.evolve(&state, &mut rng).unwrap();
            out.push((next.clone(), report));
            state = next;
        }
        out
    }

    #[test]
    fn first_step_produces_level_one() {
        let steps = evolve_n(ParameterSet::default(), 1, 1);
        let (state, report) = &steps[0];
        assert_eq!(state.t(), 1);
        assert_eq!(report.level, 1);
        assert_eq!(report.candidates, 20);
        assert_eq!(
            state.n_realized_centers() as u64 + report.defects(),
            report.candidates
        );
        assert!((report.p_def - 0.05).abs() < 1e-15);
    }

    #[test]
    fn every_step_conserves_energy() {
        for seed in 0..20 {
            for (state, _) in evolve_n(ParameterSet::default(), seed, 3) {
                assert!((state.total_energy() - 1.0).abs() < ENERGY_TOLERANCE);
                for value in [state.e_geom(), state.e_heal(), state.e_entropy()] {
                    assert!((0.0..=1.0).contains(&value));
                }
            }
        }
    }

    #[test]
    fn healed_is_bounded_by_defects() {
        let params = ParameterSet {
            p0: 0.06,
            ..ParameterSet::default()
        };
        for seed in 0..20 {
            for (state, report) in evolve_n(params, seed, 3) {
                assert!(report.healed() <= report.defects());
                assert_eq!(state.defects_count(), report.defects() - report.healed());
            }
        }
    }

    #[test]
    fn funded_steps_heal_every_defect() {
        let evolver = StepEvolver::new(ParameterSet::default());
        let mut funded = 0;
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = CensusState::initial();
            for _ in 0..4 {
                let (next, report) = evolver.evolve_census(&state, &mut rng).unwrap();
                let h = &report.healing;
                if h.defects > 0 && h.used >= h.deficit {
                    funded += 1;
                    assert_eq!(
                        h.healed, h.defects,
                        "seed {seed} level {}: fully funded step left defects",
                        report.level
                    );
                    assert_eq!(next.defects_count, 0);
                }
                state = next;
            }
        }
        assert!(funded > 0);
    }

    #[test]
    fn realized_centers_are_the_surviving_candidates() {
        for (state, report) in evolve_n(ParameterSet::default(), 4, 3) {
            assert_eq!(state.n_realized_centers() as u64, report.realized);
            assert_eq!(report.realized + report.defects(), report.candidates);
        }
    }

    #[test]
    fn healing_does_not_restore_centers() {
        // A high defect rate guarantees healed defects; the point cloud still
        // holds only the survivors.
        let params = ParameterSet {
            p0: 0.6,
            ..ParameterSet::default()
        };
        let steps = evolve_n(params, 8, 3);
        assert!(steps.iter().any(|(_, r)| r.healed() > 0));
        for (state, report) in &steps {
            assert_eq!(state.n_realized_centers() as u64, report.realized);
        }
    }

    #[test]
    fn zero_base_probability_never_defects() {
        let params = ParameterSet {
            p0: 0.0,
            ..ParameterSet::default()
        };
        let steps = evolve_n(params, 21, 3);
        for (state, report) in &steps {
            assert_eq!(state.defects_count(), 0);
            assert_eq!(report.defects(), 0);
        }
        let (last, _) = steps.last().unwrap();
        assert_eq!(last.n_realized_centers(), 8000);
        assert!((last.e_geom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn same_seed_same_states() {
        let a = evolve_n(ParameterSet::default(), 13, 3);
        let b = evolve_n(ParameterSet::default(), 13, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn energy_update_matches_flow_equations() {
        let params = ParameterSet::default();
        let steps = evolve_n(params, 2, 2);
        let mut before = SimulationState::initial().energy();
        for (state, report) in &steps {
            let h = &report.healing;
            let leak = params.beta * before.heal;
            let geom = before.geom - h.deficit + h.repaired + h.residual;
            let heal = before.heal + params.alpha * h.deficit - h.used - leak;
            let entropy = before.entropy + (1.0 - params.alpha) * h.deficit + leak;
            assert!((state.e_geom() - geom).abs() < 1e-15);
            assert!((state.e_heal() - heal).abs() < 1e-15);
            assert!((state.e_entropy() - entropy).abs() < 1e-15);
            before = state.energy();
        }
    }

    #[test]
    fn negative_healing_reservoir_aborts_the_step() {
        // Full leak plus full efficiency drains the healing reservoir below
        // zero as soon as any defect appears.
        let params = ParameterSet {
            p0: 0.99,
            k: 0.0,
            alpha: 0.5,
            eta: 1.0,
            beta: 1.0,
            ..ParameterSet::default()
        };
        let state = SimulationState::new(
            0,
            vec![Point3::CENTROID],
            0,
            EnergyReservoirs {
                geom: 0.5,
                heal: 0.5,
                entropy: 0.0,
            },
        );
        let mut rng = StdRng::seed_from_u64(1);
        let err = StepEvolver::new(params).evolve(&state, &mut rng).unwrap_err();
        let StepError::InvariantViolation { source } = err else {
            panic!("expected an invariant violation");
        };
        assert_eq!(source.level, 1);
        assert!(source.violations.iter().any(|v| matches!(
            v,
            Violation::OutOfBounds {
                reservoir: "E_heal",
                ..
            }
        )));
    }

    #[test]
    fn level_overflow_is_reported() {
        let state = SimulationState::new(u32::MAX, Vec::new(), 0, EnergyReservoirs::INITIAL);
        let mut rng = StdRng::seed_from_u64(1);
        let err = StepEvolver::new(ParameterSet::default())
            .evolve(&state, &mut rng)
            .unwrap_err();
        assert!(matches!(err, StepError::LevelOverflow { level: u32::MAX }));
    }
}
