//! Soft invariant checking (§3, §4.1).
//!
//! Unlike [`crate::validation`]'s fatal checks, these seven invariants
//! (I1–I7) are never rejected outright — a violation is scored by
//! [`crate::scoring`], not refused. [`check`] produces a
//! [`ViolationReport`] with enough context (which instructor, which
//! gap, which classroom change) for the scorer to price each one.

use std::collections::HashMap;

use itertools::Itertools;

use crate::models::{Assignment, InputBundle};

/// I3: an instructor appears in more than one Assignment in the same
/// timeslot (responsible or jury).
#[derive(Debug, Clone, PartialEq)]
pub struct InstructorSlotConflict {
    pub instructor_id: u64,
    pub timeslot_id: u64,
    pub project_ids: Vec<u64>,
}

/// I4: more than one Assignment in the same (classroom, timeslot) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassroomSlotConflict {
    pub classroom_id: u64,
    pub timeslot_id: u64,
    pub project_ids: Vec<u64>,
}

/// I5 support data: one instructor's responsible runs, summarized.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructorRun {
    pub instructor_id: u64,
    /// Distinct classrooms used across this instructor's responsible
    /// assignments, in first-seen order.
    pub classrooms_used: Vec<u64>,
    /// Ordinals (sorted) of timeslots used for this instructor's
    /// responsible assignments.
    pub ordinals_used: Vec<u32>,
    /// Count of empty ordinals strictly between the min and max used
    /// ordinal (I5/gap accounting, shared with the scoring engine).
    pub gap_count: u32,
    /// Whether all responsible assignments sit in one classroom on a
    /// contiguous run of ordinals (the "perfect" I5 case).
    pub is_perfect_consecutive: bool,
}

/// I6: a paired bidirectional jury link that is missing in one or both
/// directions.
#[derive(Debug, Clone, PartialEq)]
pub struct IncompletePairing {
    pub instructor_a: u64,
    pub instructor_b: u64,
}

/// I7: a used ordinal in a classroom sits above an unused one (not a
/// prefix of the occupied set).
#[derive(Debug, Clone, PartialEq)]
pub struct EarliestFirstViolation {
    pub classroom_id: u64,
    pub used_ordinal: u32,
    pub unused_ordinal_below: u32,
}

/// The full soft-invariant report for a candidate assignment set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViolationReport {
    /// I1: project ids appearing more than once.
    pub duplicate_projects: Vec<u64>,
    /// I2: assignments where the responsible instructor is also jury.
    pub self_jury_assignments: Vec<u64>,
    pub instructor_slot_conflicts: Vec<InstructorSlotConflict>,
    pub classroom_slot_conflicts: Vec<ClassroomSlotConflict>,
    pub instructor_runs: Vec<InstructorRun>,
    pub incomplete_pairings: Vec<IncompletePairing>,
    pub earliest_first_violations: Vec<EarliestFirstViolation>,
}

/// Checks the seven soft invariants against a candidate assignment set.
///
/// `known_pairs` comes from the constructor when it ran (empty when a
/// strategy built its own assignment set without going through it) and
/// drives the I6 bidirectional-pairing check.
pub fn check(
    assignments: &[Assignment],
    inputs: &InputBundle,
    known_pairs: &[(u64, u64)],
) -> ViolationReport {
    let mut report = ViolationReport::default();

    check_unique_projects(assignments, &mut report);
    check_self_jury(assignments, &mut report);
    check_instructor_slot_uniqueness(assignments, &mut report);
    check_classroom_slot_uniqueness(assignments, &mut report);
    check_consecutive_grouping(assignments, inputs, &mut report);
    check_bidirectional_pairing(assignments, known_pairs, &mut report);
    check_earliest_first(assignments, inputs, &mut report);

    report
}

fn check_unique_projects(assignments: &[Assignment], report: &mut ViolationReport) {
    let mut seen = HashMap::new();
    for a in assignments {
        *seen.entry(a.project_id).or_insert(0u32) += 1;
    }
    report.duplicate_projects = seen
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(id, _)| id)
        .collect();
    report.duplicate_projects.sort_unstable();
}

fn check_self_jury(assignments: &[Assignment], report: &mut ViolationReport) {
    report.self_jury_assignments = assignments
        .iter()
        .filter(|a| a.has_self_jury())
        .map(|a| a.project_id)
        .collect();
}

fn check_instructor_slot_uniqueness(assignments: &[Assignment], report: &mut ViolationReport) {
    // (instructor_id, timeslot_id) -> project ids seen
    let mut by_slot: HashMap<(u64, u64), Vec<u64>> = HashMap::new();
    for a in assignments {
        by_slot
            .entry((a.responsible_instructor_id, a.timeslot_id))
            .or_default()
            .push(a.project_id);
        for &jury_id in &a.jury_instructor_ids {
            by_slot
                .entry((jury_id, a.timeslot_id))
                .or_default()
                .push(a.project_id);
        }
    }

    for ((instructor_id, timeslot_id), mut project_ids) in by_slot {
        project_ids.sort_unstable();
        project_ids.dedup();
        if project_ids.len() > 1 {
            report.instructor_slot_conflicts.push(InstructorSlotConflict {
                instructor_id,
                timeslot_id,
                project_ids,
            });
        }
    }
    report
        .instructor_slot_conflicts
        .sort_by_key(|c| (c.instructor_id, c.timeslot_id));
}

fn check_classroom_slot_uniqueness(assignments: &[Assignment], report: &mut ViolationReport) {
    let mut by_cell: HashMap<(u64, u64), Vec<u64>> = HashMap::new();
    for a in assignments {
        by_cell
            .entry((a.classroom_id, a.timeslot_id))
            .or_default()
            .push(a.project_id);
    }
    for ((classroom_id, timeslot_id), mut project_ids) in by_cell {
        if project_ids.len() > 1 {
            project_ids.sort_unstable();
            report.classroom_slot_conflicts.push(ClassroomSlotConflict {
                classroom_id,
                timeslot_id,
                project_ids,
            });
        }
    }
    report
        .classroom_slot_conflicts
        .sort_by_key(|c| (c.classroom_id, c.timeslot_id));
}

fn check_consecutive_grouping(
    assignments: &[Assignment],
    inputs: &InputBundle,
    report: &mut ViolationReport,
) {
    let ordinal_of: HashMap<u64, u32> = inputs.timeslots.iter().map(|t| (t.id, t.ordinal)).collect();

    let mut by_instructor: HashMap<u64, Vec<&Assignment>> = HashMap::new();
    for a in assignments {
        by_instructor
            .entry(a.responsible_instructor_id)
            .or_default()
            .push(a);
    }

    let mut instructor_ids: Vec<u64> = by_instructor.keys().copied().collect();
    instructor_ids.sort_unstable();

    for instructor_id in instructor_ids {
        let mut own = by_instructor.remove(&instructor_id).unwrap();
        own.sort_by_key(|a| ordinal_of.get(&a.timeslot_id).copied().unwrap_or(0));

        let classrooms_used: Vec<u64> = own.iter().map(|a| a.classroom_id).unique().collect();

        let mut ordinals_used: Vec<u32> = own
            .iter()
            .map(|a| ordinal_of.get(&a.timeslot_id).copied().unwrap_or(0))
            .collect();
        ordinals_used.sort_unstable();
        ordinals_used.dedup();

        let gap_count = if ordinals_used.len() >= 2 {
            let span = ordinals_used.last().unwrap() - ordinals_used.first().unwrap() + 1;
            span as usize - ordinals_used.len()
        } else {
            0
        } as u32;

        let is_perfect_consecutive = classrooms_used.len() == 1 && gap_count == 0;

        report.instructor_runs.push(InstructorRun {
            instructor_id,
            classrooms_used,
            ordinals_used,
            gap_count,
            is_perfect_consecutive,
        });
    }
}

fn check_bidirectional_pairing(
    assignments: &[Assignment],
    known_pairs: &[(u64, u64)],
    report: &mut ViolationReport,
) {
    for &(a_id, b_id) in known_pairs {
        let a_lists_b = assignments
            .iter()
            .filter(|asn| asn.responsible_instructor_id == a_id)
            .all(|asn| asn.jury_instructor_ids.contains(&b_id));
        let b_lists_a = assignments
            .iter()
            .filter(|asn| asn.responsible_instructor_id == b_id)
            .all(|asn| asn.jury_instructor_ids.contains(&a_id));

        if !a_lists_b || !b_lists_a {
            report.incomplete_pairings.push(IncompletePairing {
                instructor_a: a_id,
                instructor_b: b_id,
            });
        }
    }
}

fn check_earliest_first(
    assignments: &[Assignment],
    inputs: &InputBundle,
    report: &mut ViolationReport,
) {
    let ordinal_of: HashMap<u64, u32> = inputs.timeslots.iter().map(|t| (t.id, t.ordinal)).collect();
    let all_ordinals: Vec<u32> = inputs.timeslots_by_ordinal().iter().map(|t| t.ordinal).collect();

    let mut used_by_classroom: HashMap<u64, Vec<u32>> = HashMap::new();
    for a in assignments {
        if let Some(&ord) = ordinal_of.get(&a.timeslot_id) {
            used_by_classroom.entry(a.classroom_id).or_default().push(ord);
        }
    }

    let mut classroom_ids: Vec<u64> = used_by_classroom.keys().copied().collect();
    classroom_ids.sort_unstable();

    for classroom_id in classroom_ids {
        let used = used_by_classroom.get(&classroom_id).unwrap();
        let max_used = *used.iter().max().unwrap();
        for &ord in &all_ordinals {
            if ord < max_used && !used.contains(&ord) {
                report.earliest_first_violations.push(EarliestFirstViolation {
                    classroom_id,
                    used_ordinal: max_used,
                    unused_ordinal_below: ord,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, Instructor, Project, Rank, Timeslot};

    fn bundle() -> InputBundle {
        InputBundle::new(
            vec![Project::new(1, 10), Project::new(2, 11)],
            vec![Instructor::new(10, "A", Rank::Full), Instructor::new(11, "B", Rank::Associate)],
            vec![Classroom::new(100, "C1")],
            vec![Timeslot::new(1000, 0, 9, 10), Timeslot::new(1001, 1, 10, 11)],
        )
    }

    #[test]
    fn test_no_violations_happy_path() {
        let b = bundle();
        let assignments = vec![
            Assignment::new(1, 100, 1000, 10).with_jury(vec![11]),
            Assignment::new(2, 100, 1001, 11).with_jury(vec![10]),
        ];
        let report = check(&assignments, &b, &[(10, 11)]);
        assert!(report.duplicate_projects.is_empty());
        assert!(report.self_jury_assignments.is_empty());
        assert!(report.instructor_slot_conflicts.is_empty());
        assert!(report.classroom_slot_conflicts.is_empty());
        assert!(report.incomplete_pairings.is_empty());
        assert!(report.earliest_first_violations.is_empty());

        let a_run = report
            .instructor_runs
            .iter()
            .find(|r| r.instructor_id == 10)
            .unwrap();
        assert!(a_run.is_perfect_consecutive);
    }

    #[test]
    fn test_duplicate_project_detected() {
        let b = bundle();
        let assignments = vec![
            Assignment::new(1, 100, 1000, 10).with_jury(vec![11]),
            Assignment::new(1, 100, 1001, 10).with_jury(vec![11]),
        ];
        let report = check(&assignments, &b, &[]);
        assert_eq!(report.duplicate_projects, vec![1]);
    }

    #[test]
    fn test_self_jury_detected() {
        let b = bundle();
        let assignments = vec![Assignment::new(1, 100, 1000, 10).with_jury(vec![10])];
        let report = check(&assignments, &b, &[]);
        assert_eq!(report.self_jury_assignments, vec![1]);
    }

    #[test]
    fn test_classroom_conflict_detected() {
        let b = bundle();
        let assignments = vec![
            Assignment::new(1, 100, 1000, 10).with_jury(vec![11]),
            Assignment::new(2, 100, 1000, 11).with_jury(vec![10]),
        ];
        let report = check(&assignments, &b, &[]);
        assert_eq!(report.classroom_slot_conflicts.len(), 1);
        assert_eq!(report.classroom_slot_conflicts[0].project_ids, vec![1, 2]);
    }

    #[test]
    fn test_incomplete_pairing_detected() {
        let b = bundle();
        let assignments = vec![
            Assignment::new(1, 100, 1000, 10).with_jury(vec![]), // missing B in jury
            Assignment::new(2, 100, 1001, 11).with_jury(vec![10]),
        ];
        let report = check(&assignments, &b, &[(10, 11)]);
        assert_eq!(report.incomplete_pairings.len(), 1);
    }

    #[test]
    fn test_gap_detected() {
        let mut b = bundle();
        b.timeslots.push(Timeslot::new(1002, 2, 11, 12));
        let assignments = vec![
            Assignment::new(1, 100, 1000, 10).with_jury(vec![11]),
            Assignment::new(2, 100, 1002, 10).with_jury(vec![11]),
        ];
        let report = check(&assignments, &b, &[]);
        let run = report
            .instructor_runs
            .iter()
            .find(|r| r.instructor_id == 10)
            .unwrap();
        assert_eq!(run.gap_count, 1);
        assert!(!run.is_perfect_consecutive);
    }

    #[test]
    fn test_earliest_first_violation_detected() {
        let mut b = bundle();
        b.timeslots.push(Timeslot::new(1002, 2, 11, 12));
        // project at ordinal 2 while ordinal 1 is unused → violation
        let assignments = vec![Assignment::new(1, 100, 1002, 10).with_jury(vec![11])];
        let report = check(&assignments, &b, &[]);
        assert_eq!(report.earliest_first_violations.len(), 1);
    }
}
