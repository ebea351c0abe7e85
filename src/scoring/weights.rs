//! Score weights (§4.2).
//!
//! Every component weight is a field here so a caller's
//! `weights_override` can replace any subset without touching the
//! others. Defaults are the distilled spec's documented snapshot —
//! see §10 REDESIGN FLAGS in `SPEC_FULL.md` for why these are treated
//! as overridable rather than fixed constants.

use std::collections::HashMap;

use crate::models::DEFAULT_LATE_CUTOFF_HOUR;

/// Weights for every penalty and reward component the scoring engine
/// computes, plus the hour cutoff that decides "late".
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
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

    /// Hour-of-day past which a timeslot counts as late. Not itself a
    /// penalty weight, but it is part of the same `weights_override`
    /// surface, so it lives here rather than in `RunConfig`.
    pub late_cutoff_hour: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            late_timeslot_penalty: 200.0,
            gap_penalty: 300.0,
            classroom_change_penalty: 50.0,
            conflict_penalty: 5.0,
            pairing_incomplete_penalty: 100.0,

            consecutive_reward: -50.0,
            same_classroom_reward: -30.0,
            jury_pairing_reward: -100.0,
            perfect_consecutive_reward: -500.0,
            early_timeslot_reward: -150.0,
            gap_free_reward: -200.0,

            late_cutoff_hour: DEFAULT_LATE_CUTOFF_HOUR,
        }
    }
}

impl ScoreWeights {
    /// Applies a `weights_override: map<penalty_name, float>` (§6) on
    /// top of the defaults. Unknown keys are ignored — the caller may
    /// be forward-compatible with a newer weight set than this build
    /// knows about.
    pub fn with_overrides(mut self, overrides: &HashMap<String, f64>) -> Self {
        for (name, value) in overrides {
            match name.as_str() {
                "late_timeslot_penalty" => self.late_timeslot_penalty = *value,
                "gap_penalty" => self.gap_penalty = *value,
                "classroom_change_penalty" => self.classroom_change_penalty = *value,
                "conflict_penalty" => self.conflict_penalty = *value,
                "pairing_incomplete_penalty" => self.pairing_incomplete_penalty = *value,
                "consecutive_reward" => self.consecutive_reward = *value,
                "same_classroom_reward" => self.same_classroom_reward = *value,
                "jury_pairing_reward" => self.jury_pairing_reward = *value,
                "perfect_consecutive_reward" => self.perfect_consecutive_reward = *value,
                "early_timeslot_reward" => self.early_timeslot_reward = *value,
                "gap_free_reward" => self.gap_free_reward = *value,
                "late_cutoff_hour" => self.late_cutoff_hour = *value as u32,
                _ => {}
            }
        }
        self
    }
}
