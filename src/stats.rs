//! Statistics assembly (§6, §9 supplemented features).
//!
//! Builds the `statistics` block of a `RunResult` from a
//! [`ScoreBreakdown`] (which already carries the raw counts computed
//! in the same pass as the score) plus the wall-clock timer the runner
//! owns — mirroring the teacher's `ScheduleKpi::calculate` pattern: one
//! pass, one struct of computed metrics, no re-walking the assignment
//! set.

use crate::models::{Assignment, Statistics};
use crate::scoring::ScoreBreakdown;

/// Assembles the run's [`Statistics`] block.
pub fn assemble(
    assignments: &[Assignment],
    breakdown: &ScoreBreakdown,
    execution_time_seconds: f64,
) -> Statistics {
    Statistics {
        execution_time_seconds,
        schedule_count: assignments.len(),
        consecutive_instructor_count: breakdown.consecutive_instructor_count,
        avg_classroom_changes: breakdown.avg_classroom_changes,
        total_gaps: breakdown.total_gaps,
        workload_stddev: breakdown.workload_stddev,
    }
}
