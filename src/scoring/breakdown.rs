//! Structured score breakdown (§4.2, §6 Statistics).

use serde::{Deserialize, Serialize};

/// The scalar objective plus every component that contributed to it.
///
/// `total` always equals the sum of the eleven component subtotals
/// within `1e-9` (P3) — [`super::engine::score`] is the only place
/// this type is constructed, and it upholds that by computation rather
/// than by a separate assertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub late_timeslot_penalty: f64,
    pub gap_penalty: f64,
    pub classroom_change_penalty: f64,
    pub conflict_penalty: f64,
    pub pairing_incomplete_penalty: f64,

    pub consecutive_reward: f64,
    pub same_classroom_reward: f64,
    pub jury_pairing_reward: f64,
    pub perfect_consecutive_reward: f64,
    pub early_timeslot_reward: f64,
    pub gap_free_reward: f64,

    pub total: f64,

    /// Raw counts feeding the run's [`crate::models::Statistics`] block,
    /// computed alongside the score in the same pass rather than by
    /// re-walking the assignment set (teacher's `ScheduleKpi::calculate`
    /// single-pass pattern).
    pub consecutive_instructor_count: usize,
    pub total_gaps: u64,
    pub avg_classroom_changes: f64,
    pub workload_stddev: f64,
}

impl ScoreBreakdown {
    /// Supplemental helper mirroring the teacher KPI module's
    /// threshold-gate pattern: true when `total` is at or under
    /// `budget`. Not referenced by any strategy — offered for callers
    /// that want a pass/fail gate instead of comparing scores directly.
    pub fn meets_budget(&self, budget: f64) -> bool {
        self.total <= budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_budget() {
        let breakdown = ScoreBreakdown {
            total: 120.0,
            ..Default::default()
        };
        assert!(breakdown.meets_budget(120.0));
        assert!(breakdown.meets_budget(200.0));
        assert!(!breakdown.meets_budget(119.999));
    }
}
