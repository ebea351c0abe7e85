//! Tabu Search — §4.4 table row 4.
//!
//! Local search with short-term memory: a tabu list forbids recently
//! undone moves. Aspiration overrides the tabu status when a move
//! would beat the best-known score, when its frequency is below a
//! diversification threshold, or when a stuck-counter exceeds its
//! threshold. Tenure is adaptive: grows while stuck, shrinks while
//! improving, bounded to `[5, 20]`.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, info};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::RunConfig;
use crate::constructor;
use crate::error::CoreError;
use crate::models::{Assignment, InputBundle};
use crate::progress::{CancelToken, ProgressSink};
use crate::scoring::{score, ScoreWeights};

use super::{emit_progress, random_cell, strategy_rng, Deadline, Strategy, StrategyOutcome};

const MIN_TENURE: i64 = 5;
const MAX_TENURE: i64 = 20;
const STUCK_THRESHOLD: u32 = 15;
const FREQUENCY_THRESHOLD: u32 = 2;

#[derive(Debug, Default)]
pub struct TabuSearchStrategy;

/// A move: relocate the project at `index` into `(classroom_id, timeslot_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Move {
    index: usize,
    classroom_id: u64,
    timeslot_id: u64,
}

impl Strategy for TabuSearchStrategy {
    fn name(&self) -> &'static str {
        "tabu_search"
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
        let deadline = Deadline::new(time_limit_seconds);

        if current.is_empty() {
            return Ok(StrategyOutcome { assignments: current, pairs, cut_short: false, seed_used });
        }

        let mut current_score = score(&current, inputs, weights, &pairs).total;
        let mut best = current.clone();
        let mut best_score = current_score;

        let mut tenure = config.tabu_tenure as i64;
        let mut tabu: VecDeque<(Move, i64)> = VecDeque::new();
        let mut frequency: HashMap<Move, u32> = HashMap::new();
        let mut stuck_counter: u32 = 0;
        let mut cut_short = false;

        for iteration in 0..config.max_iterations {
            if cancel.is_cancelled() || deadline.expired() {
                cut_short = true;
                break;
            }

            let iter_signed = iteration as i64;
            tabu.retain(|&(_, expires_at)| expires_at > iter_signed);

            let mv = candidate_move(&current, inputs, &mut rng);
            let is_tabu = tabu.iter().any(|&(tabu_move, _)| tabu_move == mv);

            let mut candidate = current.clone();
            candidate[mv.index].classroom_id = mv.classroom_id;
            candidate[mv.index].timeslot_id = mv.timeslot_id;
            let candidate_score = score(&candidate, inputs, weights, &pairs).total;

            let freq = *frequency.get(&mv).unwrap_or(&0);
            let aspiration = candidate_score < best_score || freq < FREQUENCY_THRESHOLD || stuck_counter > STUCK_THRESHOLD;

            if !is_tabu || aspiration {
                current = candidate;
                current_score = candidate_score;
                tabu.push_back((mv, iter_signed + tenure));
                *frequency.entry(mv).or_insert(0) += 1;

                if current_score < best_score {
                    best = current.clone();
                    best_score = current_score;
                    stuck_counter = 0;
                    tenure = (tenure - 1).max(MIN_TENURE);
                } else {
                    stuck_counter += 1;
                    tenure = (tenure + 1).min(MAX_TENURE);
                }
            } else {
                stuck_counter += 1;
            }

            if iteration % 25 == 0 {
                let fraction = (iteration as f64 / config.max_iterations.max(1) as f64).min(0.99);
                emit_progress(progress, fraction, "running", &format!("iteration {iteration}, tenure={tenure}"));
                debug!(strategy = self.name(), iteration, tenure, current_score, "tabu step");
            }
        }

        emit_progress(progress, 1.0, if cut_short { "cancelled" } else { "completed" }, "search finished");
        info!(strategy = self.name(), best_score, cut_short, "run finished");

        Ok(StrategyOutcome { assignments: best, pairs, cut_short, seed_used })
    }
}

fn candidate_move(current: &[Assignment], inputs: &InputBundle, rng: &mut ChaCha8Rng) -> Move {
    let index = rng.gen_range(0..current.len());
    let (classroom_id, timeslot_id) = random_cell(rng, inputs);
    Move { index, classroom_id, timeslot_id }
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
    fn test_determinism_under_fixed_seed_p4() {
        let b = bundle();
        let strategy = TabuSearchStrategy;
        let mut config = RunConfig::default();
        config.max_iterations = 60;
        let run = || {
            strategy
                .run(&b, &config, &ScoreWeights::default(), Some(5), None, &NullProgressSink, &CancelToken::new())
                .unwrap()
                .assignments
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_tenure_stays_bounded() {
        // Indirect: a run with many iterations should not panic or loop
        // forever regardless of tenure drift, since it's clamped.
        let b = bundle();
        let strategy = TabuSearchStrategy;
        let mut config = RunConfig::default();
        config.max_iterations = 200;
        let outcome = strategy
            .run(&b, &config, &ScoreWeights::default(), Some(9), None, &NullProgressSink, &CancelToken::new())
            .unwrap();
        assert_eq!(outcome.assignments.len(), 2);
    }
}
