//! Counts-only evolution.
//!
//! The energy accounting never looks at where realized cells are, only at
//! how many there are. A census step draws one number per candidate from the
//! run's stream, exactly like [`StepEvolver::evolve`], but keeps counts
//! instead of centers. Memory stays constant while the full point cloud
//! grows as `20^t`, and for the same seed the census reproduces the full
//! run's defect counts and reservoirs.

use rand::Rng;
use sponge_types::CensusState;

use crate::defects::DefectSampler;
use crate::growth::CHILDREN_PER_CELL;
use crate::step::{StepError, StepEvolver, StepReport};

/// Candidates per realized cell, as a count.
const BRANCHING: u64 = CHILDREN_PER_CELL as u64;

impl StepEvolver {
    /// Advance a counts-only `state` by one level, drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Same as [`StepEvolver::evolve`]; the candidate count saturates at
    /// `u64::MAX` rather than overflowing.
    pub fn evolve_census(
        &self,
        state: &CensusState,
        rng: &mut impl Rng,
    ) -> Result<(CensusState, StepReport), StepError> {
        let t = state.t;
        let next_level = t
            .checked_add(1)
            .ok_or(StepError::LevelOverflow { level: t })?;

        let sampler = DefectSampler::for_level(self.params(), t, state.energy.heal);
        let candidates = state.n_realized.saturating_mul(BRANCHING);
        let survivors = sampler.count_survivors(candidates, rng);
        let defects = candidates.saturating_sub(survivors);

        let (energy, report) =
            self.settle(&state.energy, next_level, sampler.p_def(), candidates, defects)?;

        let next = CensusState {
            t: next_level,
            n_realized: survivors,
            defects_count: report.healing.remaining_defects(),
            energy,
        };
        Ok((next, report))
    }
}
