//! Input and output bundles.
//!
//! `InputBundle` is read-only and freely shared across a run (§5);
//! `ScheduleBundle` is the final, owned result a strategy hands back
//! to the runner on completion.

use serde::{Deserialize, Serialize};

use super::{Assignment, Classroom, Instructor, Project, Timeslot};
use crate::scoring::ScoreBreakdown;

/// The read-only input to a scheduling run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputBundle {
    pub projects: Vec<Project>,
    pub instructors: Vec<Instructor>,
    pub classrooms: Vec<Classroom>,
    pub timeslots: Vec<Timeslot>,
}

impl InputBundle {
    pub fn new(
        projects: Vec<Project>,
        instructors: Vec<Instructor>,
        classrooms: Vec<Classroom>,
        timeslots: Vec<Timeslot>,
    ) -> Self {
        Self {
            projects,
            instructors,
            classrooms,
            timeslots,
        }
    }

    pub fn instructor(&self, id: u64) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.id == id)
    }

    pub fn project(&self, id: u64) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn classroom(&self, id: u64) -> Option<&Classroom> {
        self.classrooms.iter().find(|c| c.id == id)
    }

    pub fn timeslot(&self, id: u64) -> Option<&Timeslot> {
        self.timeslots.iter().find(|t| t.id == id)
    }

    /// Timeslots sorted by ascending ordinal — the order the
    /// earliest-first family of rules iterates in.
    pub fn timeslots_by_ordinal(&self) -> Vec<&Timeslot> {
        let mut ts: Vec<&Timeslot> = self.timeslots.iter().collect();
        ts.sort_by_key(|t| t.ordinal);
        ts
    }

    /// Number of projects for which `instructor_id` is responsible.
    pub fn responsibility_count(&self, instructor_id: u64) -> usize {
        self.projects
            .iter()
            .filter(|p| p.responsible_instructor_id == instructor_id)
            .count()
    }
}

/// The final, owned output of a scheduling run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleBundle {
    pub assignments: Vec<Assignment>,
    pub statistics: Statistics,
    pub score_breakdown: ScoreBreakdown,
}

/// Aggregate statistics reported alongside a run result (§6).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub execution_time_seconds: f64,
    pub schedule_count: usize,
    pub consecutive_instructor_count: usize,
    pub avg_classroom_changes: f64,
    pub total_gaps: u64,
    pub workload_stddev: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Instructor, Rank};

    #[test]
    fn test_lookup_helpers() {
        let bundle = InputBundle::new(
            vec![],
            vec![Instructor::new(1, "A", Rank::Full)],
            vec![],
            vec![],
        );
        assert!(bundle.instructor(1).is_some());
        assert!(bundle.instructor(2).is_none());
    }

    #[test]
    fn test_timeslots_by_ordinal() {
        use crate::models::Timeslot;
        let bundle = InputBundle::new(
            vec![],
            vec![],
            vec![],
            vec![Timeslot::new(2, 1, 9, 10), Timeslot::new(1, 0, 8, 9)],
        );
        let sorted = bundle.timeslots_by_ordinal();
        assert_eq!(sorted[0].id, 1);
        assert_eq!(sorted[1].id, 2);
    }
}
