//! Lexicographic multi-objective — §4.4 table row 7.
//!
//! Four phases, each optimizing one metric while holding every earlier
//! phase's achieved optimum as an equality constraint (within a small
//! tolerance) rather than letting later phases trade it away:
//!
//! 1. Workload balance (`workload_stddev`) — invariant under cell
//!    relocation alone, since each project's responsible instructor is
//!    fixed at construction time, so this phase's optimum is simply the
//!    bootstrap's value and every later phase automatically preserves
//!    it.
//! 2. Bi-directional pairing completeness.
//! 3. Gap-free consecutive grouping.
//! 4. Everything else (the remaining penalty/reward components),
//!    equivalent to minimizing the full score once phases 1–3 are
//!    locked in.

use tracing::{debug, info};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::RunConfig;
use crate::constructor;
use crate::error::CoreError;
use crate::models::{Assignment, InputBundle};
use crate::progress::{CancelToken, ProgressSink};
use crate::scoring::{score, ScoreBreakdown, ScoreWeights};

use super::{emit_progress, random_cell, strategy_rng, Deadline, Strategy, StrategyOutcome};

#[derive(Debug, Default)]
pub struct LexicographicStrategy;

impl Strategy for LexicographicStrategy {
    fn name(&self) -> &'static str {
        "lexicographic"
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
        let (mut rng, seed_used) = strategy_rng(seed, self.name());
        let bootstrap = constructor::construct(inputs);
        let pairs = bootstrap.pairs;
        let mut current = bootstrap.assignments;
        let deadline = Deadline::new(time_limit_seconds.or(Some(config.time_limit_seconds)));

        if current.is_empty() {
            return Ok(StrategyOutcome { assignments: current, pairs, cut_short: false, seed_used });
        }

        const PHASES: [fn(&ScoreBreakdown) -> f64; 4] =
            [phase_workload_balance, phase_pairing_completeness, phase_gap_free_grouping, phase_remaining];

        let iterations_per_phase = (config.max_iterations / 4).max(25);
        let mut locked: Vec<f64> = Vec::new();
        let mut cut_short = false;

        'phases: for (phase_index, metric_fn) in PHASES.iter().enumerate() {
            let mut current_metric = metric_fn(&score(&current, inputs, weights, &pairs));

            for step in 0..iterations_per_phase {
                if cancel.is_cancelled() || deadline.expired() {
                    cut_short = true;
                    break 'phases;
                }

                let candidate = neighbor(&current, inputs, &mut rng);
                let candidate_breakdown = score(&candidate, inputs, weights, &pairs);

                if !respects_locked_phases(&candidate_breakdown, &locked, &PHASES) {
                    continue;
                }

                let candidate_metric = metric_fn(&candidate_breakdown);
                if candidate_metric < current_metric - 1e-9 {
                    current = candidate;
                    current_metric = candidate_metric;
                }

                if step % 25 == 0 {
                    let fraction = (phase_index as f64 + step as f64 / iterations_per_phase as f64) / 4.0;
                    emit_progress(progress, fraction.min(0.99), "running", &format!("phase {phase_index} step {step}"));
                }
            }

            debug!(strategy = self.name(), phase = phase_index, locked_metric = current_metric, "phase converged");
            locked.push(current_metric);
        }

        let final_breakdown = score(&current, inputs, weights, &pairs);
        emit_progress(progress, 1.0, if cut_short { "cancelled" } else { "completed" }, "lexicographic phases finished");
        info!(strategy = self.name(), best_score = final_breakdown.total, cut_short, "run finished");

        Ok(StrategyOutcome { assignments: current, pairs, cut_short, seed_used })
    }
}

/// A candidate keeps every already-locked phase's metric within
/// tolerance of its recorded optimum — phase `k`'s search may not
/// regress phase `k-1`'s result to chase a later-phase improvement.
fn respects_locked_phases(candidate: &ScoreBreakdown, locked: &[f64], phases: &[fn(&ScoreBreakdown) -> f64; 4]) -> bool {
    const TOLERANCE: f64 = 1e-6;
    locked.iter().enumerate().all(|(i, &locked_value)| phases[i](candidate) <= locked_value + TOLERANCE)
}

fn phase_workload_balance(breakdown: &ScoreBreakdown) -> f64 {
    breakdown.workload_stddev
}

fn phase_pairing_completeness(breakdown: &ScoreBreakdown) -> f64 {
    breakdown.pairing_incomplete_penalty + breakdown.jury_pairing_reward
}

fn phase_gap_free_grouping(breakdown: &ScoreBreakdown) -> f64 {
    breakdown.gap_penalty
        + breakdown.classroom_change_penalty
        + breakdown.consecutive_reward
        + breakdown.same_classroom_reward
        + breakdown.perfect_consecutive_reward
        + breakdown.gap_free_reward
}

fn phase_remaining(breakdown: &ScoreBreakdown) -> f64 {
    breakdown.total
}

fn neighbor(assignments: &[Assignment], inputs: &InputBundle, rng: &mut ChaCha8Rng) -> Vec<Assignment> {
    let mut next = assignments.to_vec();
    let idx = rng.gen_range(0..next.len());
    let (classroom_id, timeslot_id) = random_cell(rng, inputs);
    next[idx].classroom_id = classroom_id;
    next[idx].timeslot_id = timeslot_id;
    next
}
