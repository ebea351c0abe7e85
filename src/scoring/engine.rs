//! Scoring engine (§4.2): `score(assignments, inputs, weights) -> ScoreBreakdown`.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::{ScoreBreakdown, ScoreWeights};
use crate::invariants;
use crate::models::{Assignment, InputBundle};

/// Scores a candidate assignment set against the nine penalty/reward
/// components, reusing [`invariants::check`]'s violation report as the
/// shared substrate rather than re-deriving it.
///
/// `known_pairs` are the constructor's instructor pairings (empty if
/// the candidate wasn't built by the paired-consecutive constructor),
/// consumed for the I6 jury-pairing components.
pub fn score(
    assignments: &[Assignment],
    inputs: &InputBundle,
    weights: &ScoreWeights,
    known_pairs: &[(u64, u64)],
) -> ScoreBreakdown {
    let report = invariants::check(assignments, inputs, known_pairs);
    let ordinal_of: HashMap<u64, u32> = inputs.timeslots.iter().map(|t| (t.id, t.ordinal)).collect();

    let late_count = assignments
        .iter()
        .filter(|a| {
            inputs
                .timeslot(a.timeslot_id)
                .map(|t| t.is_late(weights.late_cutoff_hour))
                .unwrap_or(false)
        })
        .count();

    let lower_half_bound = (inputs.timeslots.len() as u32) / 2;
    let early_count = assignments
        .iter()
        .filter(|a| ordinal_of.get(&a.timeslot_id).copied().unwrap_or(u32::MAX) < lower_half_bound)
        .count();

    let conflict_count =
        report.instructor_slot_conflicts.len() + report.classroom_slot_conflicts.len();

    let pairing_incomplete_count = report.incomplete_pairings.len();
    let jury_pairing_satisfied_count = known_pairs.len().saturating_sub(pairing_incomplete_count);

    let total_gaps: u64 = report.instructor_runs.iter().map(|r| r.gap_count as u64).sum();
    let gap_free_count = report.instructor_runs.iter().filter(|r| r.gap_count == 0).count();
    let perfect_consecutive_count = report
        .instructor_runs
        .iter()
        .filter(|r| r.is_perfect_consecutive)
        .count();

    let (consecutive_pairs, same_classroom_pairs, classroom_change_pairs) =
        adjacent_pair_counts(assignments, &ordinal_of);

    let workload_stddev = workload_stddev(assignments, inputs);
    let instructors_with_runs = report.instructor_runs.len().max(1) as f64;
    let avg_classroom_changes = classroom_change_pairs as f64 / instructors_with_runs;

    let late_timeslot_penalty = weights.late_timeslot_penalty * late_count as f64;
    let gap_penalty = weights.gap_penalty * total_gaps as f64;
    let classroom_change_penalty = weights.classroom_change_penalty * classroom_change_pairs as f64;
    let conflict_penalty = weights.conflict_penalty * conflict_count as f64;
    let pairing_incomplete_penalty = weights.pairing_incomplete_penalty * pairing_incomplete_count as f64;

    let consecutive_reward = weights.consecutive_reward * consecutive_pairs as f64;
    let same_classroom_reward = weights.same_classroom_reward * same_classroom_pairs as f64;
    let jury_pairing_reward = weights.jury_pairing_reward * jury_pairing_satisfied_count as f64;
    let perfect_consecutive_reward = weights.perfect_consecutive_reward * perfect_consecutive_count as f64;
    let early_timeslot_reward = weights.early_timeslot_reward * early_count as f64;
    let gap_free_reward = weights.gap_free_reward * gap_free_count as f64;

    let total = late_timeslot_penalty
        + gap_penalty
        + classroom_change_penalty
        + conflict_penalty
        + pairing_incomplete_penalty
        + consecutive_reward
        + same_classroom_reward
        + jury_pairing_reward
        + perfect_consecutive_reward
        + early_timeslot_reward
        + gap_free_reward;

    ScoreBreakdown {
        late_timeslot_penalty,
        gap_penalty,
        classroom_change_penalty,
        conflict_penalty,
        pairing_incomplete_penalty,
        consecutive_reward,
        same_classroom_reward,
        jury_pairing_reward,
        perfect_consecutive_reward,
        early_timeslot_reward,
        gap_free_reward,
        total,
        consecutive_instructor_count: perfect_consecutive_count,
        total_gaps,
        avg_classroom_changes,
        workload_stddev,
    }
}

/// For each instructor, walks their responsible assignments sorted by
/// timeslot ordinal and counts adjacent-pair statistics: total
/// adjacent pairs, pairs sharing a classroom, and pairs that changed
/// classroom. `classroom_change_pairs` and `same_classroom_pairs`
/// always sum to `consecutive_pairs`.
fn adjacent_pair_counts(
    assignments: &[Assignment],
    ordinal_of: &HashMap<u64, u32>,
) -> (u64, u64, u64) {
    let mut by_instructor: HashMap<u64, Vec<&Assignment>> = HashMap::new();
    for a in assignments {
        by_instructor
            .entry(a.responsible_instructor_id)
            .or_default()
            .push(a);
    }

    let mut consecutive_pairs = 0u64;
    let mut same_classroom_pairs = 0u64;
    let mut classroom_change_pairs = 0u64;

    for own in by_instructor.values_mut() {
        own.sort_by_key(|a| ordinal_of.get(&a.timeslot_id).copied().unwrap_or(0));
        for window in own.windows(2) {
            consecutive_pairs += 1;
            if window[0].classroom_id == window[1].classroom_id {
                same_classroom_pairs += 1;
            } else {
                classroom_change_pairs += 1;
            }
        }
    }

    (consecutive_pairs, same_classroom_pairs, classroom_change_pairs)
}

fn workload_stddev(assignments: &[Assignment], inputs: &InputBundle) -> f64 {
    if inputs.instructors.is_empty() {
        return 0.0;
    }
    let loads: Vec<f64> = inputs
        .instructors
        .iter()
        .map(|i| {
            assignments
                .iter()
                .filter(|a| a.responsible_instructor_id == i.id)
                .count() as f64
        })
        .collect();
    let mean = loads.iter().sum::<f64>() / loads.len() as f64;
    let variance = loads.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / loads.len() as f64;
    variance.sqrt()
}

/// Deterministic tie-break for candidates with equal `total` score
/// (§4.2): fewer distinct classrooms, then fewer distinct timeslots,
/// then lexicographically smaller sorted assignment-id sequence.
/// `Ordering::Less` means `a` is preferred over `b`.
pub fn tie_break(a: &[Assignment], b: &[Assignment]) -> Ordering {
    let classrooms_a = distinct_count(a, |x| x.classroom_id);
    let classrooms_b = distinct_count(b, |x| x.classroom_id);
    if classrooms_a != classrooms_b {
        return classrooms_a.cmp(&classrooms_b);
    }

    let timeslots_a = distinct_count(a, |x| x.timeslot_id);
    let timeslots_b = distinct_count(b, |x| x.timeslot_id);
    if timeslots_a != timeslots_b {
        return timeslots_a.cmp(&timeslots_b);
    }

    let mut ids_a: Vec<u64> = a.iter().map(|x| x.project_id).collect();
    let mut ids_b: Vec<u64> = b.iter().map(|x| x.project_id).collect();
    ids_a.sort_unstable();
    ids_b.sort_unstable();
    ids_a.cmp(&ids_b)
}

fn distinct_count(assignments: &[Assignment], key: impl Fn(&Assignment) -> u64) -> usize {
    assignments.iter().map(key).collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, Instructor, Project, Rank, Timeslot};

    fn bundle() -> InputBundle {
        InputBundle::new(
            vec![Project::new(1, 10), Project::new(2, 11)],
            vec![
                Instructor::new(10, "A", Rank::Full),
                Instructor::new(11, "B", Rank::Associate),
            ],
            vec![Classroom::new(100, "C1")],
            vec![Timeslot::new(1000, 0, 9, 10), Timeslot::new(1001, 1, 10, 11)],
        )
    }

    #[test]
    fn test_perfect_pairing_scores_mostly_rewards() {
        let b = bundle();
        let weights = ScoreWeights::default();
        let assignments = vec![
            Assignment::new(1, 100, 1000, 10).with_jury(vec![11]),
            Assignment::new(2, 100, 1001, 11).with_jury(vec![10]),
        ];
        let breakdown = score(&assignments, &b, &weights, &[(10, 11)]);
        assert_eq!(breakdown.conflict_penalty, 0.0);
        assert_eq!(breakdown.pairing_incomplete_penalty, 0.0);
        assert!(breakdown.jury_pairing_reward < 0.0);
        assert_eq!(breakdown.consecutive_instructor_count, 2);
    }

    #[test]
    fn test_total_equals_sum_of_components() {
        let b = bundle();
        let weights = ScoreWeights::default();
        let assignments = vec![
            Assignment::new(1, 100, 1000, 10).with_jury(vec![11]),
            Assignment::new(2, 100, 1000, 11).with_jury(vec![10]),
        ];
        let breakdown = score(&assignments, &b, &weights, &[]);
        let sum = breakdown.late_timeslot_penalty
            + breakdown.gap_penalty
            + breakdown.classroom_change_penalty
            + breakdown.conflict_penalty
            + breakdown.pairing_incomplete_penalty
            + breakdown.consecutive_reward
            + breakdown.same_classroom_reward
            + breakdown.jury_pairing_reward
            + breakdown.perfect_consecutive_reward
            + breakdown.early_timeslot_reward
            + breakdown.gap_free_reward;
        assert!((sum - breakdown.total).abs() < 1e-9);
    }

    #[test]
    fn test_classroom_conflict_scored_as_soft_penalty() {
        let b = bundle();
        let weights = ScoreWeights::default();
        let assignments = vec![
            Assignment::new(1, 100, 1000, 10).with_jury(vec![11]),
            Assignment::new(2, 100, 1000, 11).with_jury(vec![10]),
        ];
        let breakdown = score(&assignments, &b, &weights, &[]);
        assert!(breakdown.conflict_penalty > 0.0);
    }

    #[test]
    fn test_tie_break_prefers_fewer_classrooms() {
        let fewer = vec![
            Assignment::new(1, 100, 1000, 10),
            Assignment::new(2, 100, 1001, 11),
        ];
        let more = vec![
            Assignment::new(1, 100, 1000, 10),
            Assignment::new(2, 200, 1001, 11),
        ];
        assert_eq!(tie_break(&fewer, &more), Ordering::Less);
    }

    #[test]
    fn test_tie_break_falls_back_to_assignment_ids() {
        let a = vec![Assignment::new(1, 100, 1000, 10)];
        let b = vec![Assignment::new(2, 100, 1000, 10)];
        assert_eq!(tie_break(&a, &b), Ordering::Less);
    }
}
