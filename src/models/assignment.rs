//! Assignment model — the output unit of the scheduling core.

use serde::{Deserialize, Serialize};

/// A single project's placement: cell (classroom, timeslot) plus team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub project_id: u64,
    pub classroom_id: u64,
    pub timeslot_id: u64,
    pub responsible_instructor_id: u64,
    /// Ordered jury member ids (order is meaningful for I6's
    /// bidirectional-pairing check: the partner is expected to appear,
    /// not at a particular position).
    pub jury_instructor_ids: Vec<u64>,
    pub is_makeup: bool,
}

impl Assignment {
    pub fn new(
        project_id: u64,
        classroom_id: u64,
        timeslot_id: u64,
        responsible_instructor_id: u64,
    ) -> Self {
        Self {
            project_id,
            classroom_id,
            timeslot_id,
            responsible_instructor_id,
            jury_instructor_ids: Vec::new(),
            is_makeup: false,
        }
    }

    pub fn with_jury(mut self, jury: Vec<u64>) -> Self {
        self.jury_instructor_ids = jury;
        self
    }

    pub fn with_makeup(mut self, is_makeup: bool) -> Self {
        self.is_makeup = is_makeup;
        self
    }

    /// I2: the responsible instructor must never also be jury.
    pub fn has_self_jury(&self) -> bool {
        self.jury_instructor_ids
            .contains(&self.responsible_instructor_id)
    }
}
