//! Optimization core for project-jury-classroom-timeslot defense
//! scheduling.
//!
//! Given a read-only [`models::InputBundle`] (projects, instructors,
//! classrooms, timeslots), resolves a named [`strategy::Strategy`] from
//! the [`factory`] and runs it under [`runner::run`]'s guarded context,
//! producing a [`runner::RunResult`] that is never an unhandled error —
//! cancellation, timeout, and internal faults all resolve to a
//! `status` field on the result rather than a propagated exception.
//!
//! # Modules
//!
//! - **`models`** — domain entities: `Instructor`, `Project`,
//!   `Classroom`, `Timeslot`, `Assignment`, plus the `InputBundle` /
//!   `ScheduleBundle` containers.
//! - **`validation`** — fatal input checks (§4.1): duplicate ids, empty
//!   collections, dangling instructor references.
//! - **`invariants`** — soft scheduling invariants (I1–I7), consumed by
//!   `scoring` rather than enforced as hard constraints.
//! - **`scoring`** — the weighted additive penalty/reward model and
//!   deterministic tie-break rule.
//! - **`constructor`** — the Paired-Consecutive Constructor every
//!   strategy bootstraps from.
//! - **`strategy`** — the seven interchangeable search strategies.
//! - **`factory`** — name/alias resolution and config validation.
//! - **`runner`** — the guarded execution context and `RunRequest`/`RunResult`.
//! - **`rng`** — the one seeded RNG recipe every strategy draws from.
//! - **`config`** — `RunConfig`, parsed and range-validated from a raw param map.
//! - **`progress`** — `ProgressSink`, `CancelToken`, and the coalescing channel sink.
//! - **`stats`** — assembles the `statistics` block from a `ScoreBreakdown`.
//! - **`error`** — the `CoreError`/`ErrorKind` taxonomy.

pub mod config;
pub mod constructor;
pub mod error;
pub mod factory;
pub mod invariants;
pub mod models;
pub mod progress;
pub mod rng;
pub mod runner;
pub mod scoring;
pub mod stats;
pub mod strategy;
pub mod validation;

pub use error::{CoreError, ErrorKind};
pub use runner::{RunRequest, RunResult};

use progress::{CancelToken, ProgressSink};
use scoring::ScoreWeights;

/// Validates the request's input bundle, resolves its strategy name
/// and config through the [`factory`], then runs it under
/// [`runner::run`]'s guarded context.
///
/// Returns `Err` only for the two failure modes the external interface
/// says surface immediately, before any strategy executes:
/// `InvalidInput` and (via the factory) `NoSuchStrategy` / `BadConfig`.
/// Everything a running strategy itself encounters — cancellation,
/// timeout, an internal fault — comes back as a `RunResult` whose
/// `status` field carries the outcome instead.
pub fn schedule(
    request: RunRequest,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<RunResult, CoreError> {
    validation::validate_input(&request.input_bundle).map_err(CoreError::InvalidInput)?;

    let (strategy, config) = factory::create(&request.strategy_name, &request.params)?;

    let weights = match &request.weights_override {
        Some(overrides) => ScoreWeights::default().with_overrides(overrides),
        None => ScoreWeights::default(),
    };

    Ok(runner::run(
        strategy.as_ref(),
        &request.input_bundle,
        &config,
        &weights,
        request.seed,
        request.time_limit_seconds,
        progress,
        cancel,
    ))
}
