//! Timeslot model.
//!
//! Timeslots carry an explicit `ordinal` independent of their clock
//! time: ordinal ascending means chronologically later (I7's
//! earliest-first rule is expressed purely in terms of ordinals).

use serde::{Deserialize, Serialize};

/// Hour-of-day past which a timeslot is considered "late" by default
/// (see [`Timeslot::is_late_default`]).
pub const DEFAULT_LATE_CUTOFF_HOUR: u32 = 16;

/// A scheduling timeslot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeslot {
    pub id: u64,
    pub ordinal: u32,
    /// Start hour of day, 0-23 (clock-time granularity is hour-level for
    /// the purposes of the late-slot rule; sub-hour scheduling is a
    /// caller concern and does not affect this core).
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Timeslot {
    pub fn new(id: u64, ordinal: u32, start_hour: u32, end_hour: u32) -> Self {
        Self {
            id,
            ordinal,
            start_hour,
            end_hour,
        }
    }

    /// Whether this timeslot is "late" under the default cutoff (start
    /// hour strictly greater than [`DEFAULT_LATE_CUTOFF_HOUR`]). The
    /// scoring engine accepts a caller-supplied cutoff instead of this
    /// default when one is configured (see `ScoreWeights::late_cutoff_hour`).
    pub fn is_late_default(&self) -> bool {
        self.is_late(DEFAULT_LATE_CUTOFF_HOUR)
    }

    pub fn is_late(&self, cutoff_hour: u32) -> bool {
        self.start_hour > cutoff_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_late_default() {
        assert!(!Timeslot::new(1, 0, 16, 17).is_late_default());
        assert!(Timeslot::new(1, 0, 17, 18).is_late_default());
    }

    #[test]
    fn test_late_custom_cutoff() {
        let t = Timeslot::new(1, 0, 15, 16);
        assert!(t.is_late(14));
        assert!(!t.is_late(16));
    }
}
