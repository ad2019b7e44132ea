//! Growth engine and run orchestration for the sponge growth simulation.
//!
//! A unit cube is subdivided level by level into 20 of its 27 sub-cubes.
//! Each candidate sub-cube may fail (a defect) with a probability that decays
//! with level and with the energy held in the healing reservoir. Part of each
//! level's defects is paid for by the healing reservoir of the
//! [`sponge_energy`] ledger, and the conservation law is verified after
//! every step.
//!
//! # Modules
//!
//! - [`params`] -- [`ParameterSet`] and its validation.
//! - [`config`] -- Run configuration loading from YAML.
//! - [`growth`] -- The Menger offset table and child-center generation.
//! - [`defects`] -- Defect probability and the per-candidate sampler.
//! - [`step`] -- The [`StepEvolver`]: one verified `t -> t+1` transition.
//! - [`census`] -- Counts-only evolution for runs too deep for a point cloud.
//! - [`runner`] -- Seeded runs of `T` steps from the canonical initial state.
//! - [`export`] -- The persisted-result record (`meta`, `params`, `series`).
//!
//! # Example
//!
//! ```
//! use sponge_core::{ParameterSet, runner};
//!
//! let states = runner::run(3, &ParameterSet::default(), 7).ok();
//! assert_eq!(states.map(|s| s.len()), Some(4));
//! ```

pub mod census;
pub mod config;
pub mod defects;
pub mod export;
pub mod growth;
pub mod params;
pub mod runner;
pub mod step;

pub use config::{ConfigError, RunConfig};
pub use export::{RunMeta, RunRecord};
pub use params::{ConfigurationError, Constraint, ConstraintViolation, ParameterSet};
pub use runner::{NoOpObserver, RunError, StepObserver, run, run_census};
pub use step::{StepError, StepEvolver, StepReport};
