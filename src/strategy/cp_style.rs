//! Constraint-Propagation SAT-Style — §4.4 table row 5.
//!
//! Variables are projects; domains are (classroom, timeslot) cells.
//! I1/I3/I4 are propagated as preferences that prune a project's
//! domain to the cells that don't conflict with what's already placed
//! — never as hard constraints, so a domain wipeout (every cell
//! conflicts) is resolved by force-assigning the least-conflicting
//! cell rather than failing the project.
//!
//! `num_search_workers` independent propagation passes run in parallel
//! (§5: one worker thread per run is the runner's concern; within a
//! run, these are the "parallel workers" the concurrency model
//! describes). Unlike Dynamic-Programming Strategic Pairing, this
//! strategy is *not* exempt from P4 (fixed-seed determinism), so each
//! worker searches from its own independently seeded stream with no
//! shared mutable state and no mid-flight resync — every worker's
//! outcome depends only on its own seed, inputs, and deadline. Once
//! `thread::scope` joins every worker, a single deterministic reduction
//! (lowest score, ties broken by [`tie_break`]) picks the final answer,
//! so the result no longer depends on how the OS interleaved the threads.

use std::thread;

use tracing::info;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::RunConfig;
use crate::constructor;
use crate::error::CoreError;
use crate::models::{Assignment, InputBundle};
use crate::progress::{CancelToken, ProgressSink};
use crate::rng::seeded_rng;
use crate::scoring::{score, tie_break, ScoreWeights};

use super::{emit_progress, random_cell, strategy_rng, Deadline, Strategy, StrategyOutcome};

#[derive(Debug, Default)]
pub struct ConstraintPropagationStrategy;

impl Strategy for ConstraintPropagationStrategy {
    fn name(&self) -> &'static str {
        "constraint_propagation"
    }

    fn run(
        &self,
        inputs: &InputBundle,
        config: &RunConfig,
        weights: &ScoreWeights,
        seed: Option<u64>,
        time_limit_seconds: Option<u64>,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<StrategyOutcome, CoreError> {
        let (_, seed_used) = strategy_rng(seed, self.name());
        let bootstrap = constructor::construct(inputs);
        let pairs = bootstrap.pairs;
        let initial = bootstrap.assignments;

        if initial.is_empty() {
            return Ok(StrategyOutcome { assignments: initial, pairs, cut_short: false, seed_used });
        }

        let deadline = Deadline::new(time_limit_seconds.or(Some(config.max_time_seconds)));
        let worker_count = config.num_search_workers.max(1);
        emit_progress(progress, 0.05, "running", &format!("dispatching {worker_count} propagation workers"));

        let worker_results: Vec<(Vec<Assignment>, f64)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..worker_count)
                .map(|worker_id| {
                    let worker_seed = seed_used.wrapping_add(worker_id as u64 * 0x9E37_79B9);
                    let mut worker_rng =
                        seeded_rng(Some(worker_seed), &format!("{}-worker-{worker_id}", self.name()));
                    let initial = initial.clone();
                    let pairs = &pairs;
                    let deadline = &deadline;
                    scope.spawn(move || propagate_worker(&mut worker_rng, initial, inputs, weights, pairs, deadline, cancel))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let cut_short = cancel.is_cancelled() || deadline.expired();

        let (assignments, best_score) = worker_results
            .into_iter()
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then_with(|| tie_break(&a.0, &b.0)))
            .unwrap();

        emit_progress(progress, 1.0, if cut_short { "cancelled" } else { "completed" }, "propagation finished");
        info!(strategy = self.name(), best_score, workers = worker_count, cut_short, "run finished");

        Ok(StrategyOutcome { assignments, pairs, cut_short, seed_used })
    }
}

/// One worker's self-contained propagation search: starts from `initial`,
/// repeatedly relocates one project to its least-conflicting domain value
/// (force-assigning if every cell conflicts), and returns its own
/// best-known assignment set and score. Touches no state shared with any
/// other worker.
fn propagate_worker(
    rng: &mut ChaCha8Rng,
    initial: Vec<Assignment>,
    inputs: &InputBundle,
    weights: &ScoreWeights,
    pairs: &[(u64, u64)],
    deadline: &Deadline,
    cancel: &CancelToken,
) -> (Vec<Assignment>, f64) {
    let mut current = initial;
    let mut best = current.clone();
    let mut best_score = score(&best, inputs, weights, pairs).total;

    let mut iterations = 0u64;
    loop {
        if cancel.is_cancelled() || deadline.expired() {
            break;
        }
        iterations += 1;
        if iterations > 5000 {
            break;
        }

        // Propagation step: for one project, try the domain value
        // (cell) with the fewest I3/I4 conflicts against the rest of
        // the current assignment set; force-assign (accept the
        // remaining conflicts) if every cell conflicts.
        let idx = rng.gen_range(0..current.len());
        let mut best_cell = (current[idx].classroom_id, current[idx].timeslot_id);
        let mut best_conflicts = conflict_count(&current, idx, best_cell.0, best_cell.1);

        for _ in 0..8 {
            let (classroom_id, timeslot_id) = random_cell(rng, inputs);
            let conflicts = conflict_count(&current, idx, classroom_id, timeslot_id);
            if conflicts < best_conflicts {
                best_conflicts = conflicts;
                best_cell = (classroom_id, timeslot_id);
            }
        }

        current[idx].classroom_id = best_cell.0;
        current[idx].timeslot_id = best_cell.1;
        let current_score = score(&current, inputs, weights, pairs).total;

        if current_score < best_score {
            best = current.clone();
            best_score = current_score;
        }
    }

    (best, best_score)
}

fn conflict_count(assignments: &[Assignment], idx: usize, classroom_id: u64, timeslot_id: u64) -> u32 {
    let target = &assignments[idx];
    assignments
        .iter()
        .enumerate()
        .filter(|(i, other)| {
            *i != idx
                && other.timeslot_id == timeslot_id
                && (other.classroom_id == classroom_id
                    || other.responsible_instructor_id == target.responsible_instructor_id
                    || other.jury_instructor_ids.contains(&target.responsible_instructor_id))
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, Instructor, Project, Rank, Timeslot};
    use crate::progress::NullProgressSink;

    fn bundle() -> InputBundle {
        InputBundle::new(
            vec![Project::new(1, 10), Project::new(2, 11)],
            vec![Instructor::new(10, "A", Rank::Full), Instructor::new(11, "B", Rank::Associate)],
            vec![Classroom::new(100, "C1")],
            vec![Timeslot::new(1000, 0, 9, 10), Timeslot::new(1001, 1, 10, 11)],
        )
    }

    #[test]
    fn test_every_project_placed() {
        let b = bundle();
        let strategy = ConstraintPropagationStrategy;
        let mut config = RunConfig::default();
        config.max_time_seconds = 1;
        config.num_search_workers = 2;
        let outcome = strategy
            .run(&b, &config, &ScoreWeights::default(), Some(1), Some(1), &NullProgressSink, &CancelToken::new())
            .unwrap();
        assert_eq!(outcome.assignments.len(), 2);
    }

    /// P4: constraint_propagation is not DP, so fixed-seed determinism
    /// must hold despite its internal worker-thread parallelism.
    #[test]
    fn test_determinism_under_fixed_seed_p4() {
        let b = bundle();
        let strategy = ConstraintPropagationStrategy;
        let mut config = RunConfig::default();
        config.max_time_seconds = 1;
        config.num_search_workers = 4;

        let run = || {
            strategy
                .run(&b, &config, &ScoreWeights::default(), Some(11), Some(1), &NullProgressSink, &CancelToken::new())
                .unwrap()
                .assignments
        };
        assert_eq!(run(), run());
    }
}
