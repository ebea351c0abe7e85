//! Earliest-First Construction (simplex-style) — §4.4 table row 1.
//!
//! Single-pass: runs the paired-consecutive constructor once and
//! returns its result directly. No iterative improvement loop, which
//! makes this the strategy P6 (earliest-first prefix property) is
//! checked against.

use tracing::info;

use crate::config::RunConfig;
use crate::constructor;
use crate::error::CoreError;
use crate::models::InputBundle;
use crate::progress::{CancelToken, ProgressSink};
use crate::scoring::ScoreWeights;

use super::{emit_progress, strategy_rng, Strategy, StrategyOutcome};

#[derive(Debug, Default)]
pub struct EarliestFirstStrategy;

impl Strategy for EarliestFirstStrategy {
    fn name(&self) -> &'static str {
        "earliest_first"
    }

    fn run(
        &self,
        inputs: &InputBundle,
        _config: &RunConfig,
        _weights: &ScoreWeights,
        seed: Option<u64>,
        _time_limit_seconds: Option<u64>,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<StrategyOutcome, CoreError> {
        let (_, seed_used) = strategy_rng(seed, self.name());
        info!(strategy = self.name(), "starting single-pass construction");

        emit_progress(progress, 0.1, "running", "seating pairs");
        let result = constructor::construct(inputs);
        let cut_short = cancel.is_cancelled();
        emit_progress(progress, 1.0, if cut_short { "cancelled" } else { "completed" }, "construction finished");

        info!(strategy = self.name(), placed = result.assignments.len(), "construction finished");

        Ok(StrategyOutcome {
            assignments: result.assignments,
            pairs: result.pairs,
            cut_short,
            seed_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, Instructor, Project, Rank, Timeslot};
    use crate::progress::NullProgressSink;

    #[test]
    fn test_prefix_property_p6() {
        let bundle = InputBundle::new(
            vec![Project::new(1, 10), Project::new(2, 10), Project::new(3, 10)],
            vec![Instructor::new(10, "A", Rank::Full)],
            vec![Classroom::new(100, "C1")],
            vec![
                Timeslot::new(1000, 0, 9, 10),
                Timeslot::new(1001, 1, 10, 11),
                Timeslot::new(1002, 2, 11, 12),
            ],
        );
        let strategy = EarliestFirstStrategy;
        let outcome = strategy
            .run(
                &bundle,
                &RunConfig::default(),
                &ScoreWeights::default(),
                Some(1),
                None,
                &NullProgressSink,
                &CancelToken::new(),
            )
            .unwrap();

        let ordinal_of: std::collections::HashMap<u64, u32> =
            bundle.timeslots.iter().map(|t| (t.id, t.ordinal)).collect();
        let mut used_ordinals: Vec<u32> = outcome
            .assignments
            .iter()
            .map(|a| ordinal_of[&a.timeslot_id])
            .collect();
        used_ordinals.sort_unstable();
        assert_eq!(used_ordinals, vec![0, 1, 2]);
    }
}
