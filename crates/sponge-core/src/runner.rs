//! Seeded runs from the canonical initial state.
//!
//! A run validates its [`ParameterSet`] once, seeds a single
//! [`StdRng`] from the caller's seed, and applies the [`StepEvolver`] `T`
//! times. The returned sequence holds `T + 1` states, starting with the
//! initial one. The first failing step aborts the whole run; no partial
//! sequence is returned.
//!
//! Two flavors share the same random stream:
//!
//! - [`run`] keeps every realized center, which bounds practical depth to
//!   about five levels.
//! - [`run_census`] keeps counts only and reproduces [`run`]'s counts and
//!   reservoirs exactly for the same seed.

use rand::SeedableRng;
use rand::rngs::StdRng;
use sponge_types::{CensusState, SeriesPoint, SimulationState};
use tracing::{info, warn};

use crate::params::{ConfigurationError, ParameterSet};
use crate::step::{StepError, StepEvolver, StepReport};

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The parameter set was rejected before any step ran.
    #[error("configuration error: {source}")]
    Configuration {
        /// The rejected constraints.
        #[from]
        source: ConfigurationError,
    },

    /// A step failed and the run was aborted.
    #[error("step error: {source}")]
    Step {
        /// The underlying step error.
        #[from]
        source: StepError,
    },
}

/// Callback invoked after each successful step.
///
/// Receives the step's report and the series row of the state it produced.
pub trait StepObserver {
    /// Called after a step completes successfully.
    fn on_step(&mut self, report: &StepReport, point: &SeriesPoint);
}

/// A no-op observer.
pub struct NoOpObserver;

impl StepObserver for NoOpObserver {
    fn on_step(&mut self, _report: &StepReport, _point: &SeriesPoint) {}
}

/// Run `levels` steps with a full point cloud.
///
/// # Errors
///
/// Returns [`RunError::Configuration`] if `params` fails validation, and
/// [`RunError::Step`] if any step breaks an invariant.
pub fn run(levels: u32, params: &ParameterSet, seed: u64) -> Result<Vec<SimulationState>, RunError> {
    run_with_observer(levels, params, seed, &mut NoOpObserver)
}

/// Run `levels` steps with a full point cloud, reporting each step to
/// `observer`.
///
/// # Errors
///
/// Same as [`run`].
pub fn run_with_observer(
    levels: u32,
    params: &ParameterSet,
    seed: u64,
    observer: &mut impl StepObserver,
) -> Result<Vec<SimulationState>, RunError> {
    let evolver = StepEvolver::new(params.validated()?);
    let mut rng = StdRng::seed_from_u64(seed);
    log_run_start("full", levels, seed, params);

    let mut states = Vec::with_capacity(capacity_for(levels));
    let mut current = SimulationState::initial();

    for _ in 0..levels {
        let (next, report) = evolver
            .evolve(&current, &mut rng)
            .inspect_err(|e| log_run_aborted(&SeriesPoint::from(&current), e))?;
        observer.on_step(&report, &SeriesPoint::from(&next));
        states.push(current);
        current = next;
    }

    log_run_end(&SeriesPoint::from(&current));
    states.push(current);
    Ok(states)
}

/// Run `levels` steps keeping counts only.
///
/// # Errors
///
/// Same as [`run`].
pub fn run_census(levels: u32, params: &ParameterSet, seed: u64) -> Result<Vec<CensusState>, RunError> {
    run_census_with_observer(levels, params, seed, &mut NoOpObserver)
}

/// Run `levels` steps keeping counts only, reporting each step to
/// `observer`.
///
/// # Errors
///
/// Same as [`run`].
pub fn run_census_with_observer(
    levels: u32,
    params: &ParameterSet,
    seed: u64,
    observer: &mut impl StepObserver,
) -> Result<Vec<CensusState>, RunError> {
    let evolver = StepEvolver::new(params.validated()?);
    let mut rng = StdRng::seed_from_u64(seed);
    log_run_start("census", levels, seed, params);

    let mut states = Vec::with_capacity(capacity_for(levels));
    states.push(CensusState::initial());
    let mut current = CensusState::initial();

    for _ in 0..levels {
        let (next, report) = evolver
            .evolve_census(&current, &mut rng)
            .inspect_err(|e| log_run_aborted(&SeriesPoint::from(&current), e))?;
        observer.on_step(&report, &SeriesPoint::from(&next));
        states.push(next);
        current = next;
    }

    log_run_end(&SeriesPoint::from(&current));
    Ok(states)
}

fn capacity_for(levels: u32) -> usize {
    usize::try_from(levels).map_or(0, |n| n.saturating_add(1))
}

fn log_run_start(mode: &str, levels: u32, seed: u64, params: &ParameterSet) {
    info!(
        mode,
        levels,
        seed,
        p0 = params.p0,
        eps = params.eps,
        k = params.k,
        alpha = params.alpha,
        eta = params.eta,
        beta = params.beta,
        "Run started"
    );
}

fn log_run_aborted(last: &SeriesPoint, error: &StepError) {
    warn!(
        last_level = last.t,
        error = %error,
        "Run aborted"
    );
}

fn log_run_end(last: &SeriesPoint) {
    info!(
        final_level = last.t,
        n_realized_centers = last.n_realized_centers,
        defects_count = last.defects_count,
        e_geom = last.e_geom,
        e_heal = last.e_heal,
        e_entropy = last.e_entropy,
        "Run completed"
    );
}
