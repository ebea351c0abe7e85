//! Run invocation and the guarded execution context (§4.5, §6, §7).
//!
//! [`RunRequest`] is what a caller hands the core; [`RunResult`] is
//! what comes back — always, even when the strategy panics or is
//! cancelled mid-run. A strategy never propagates infeasibility or
//! cancellation as an error; this module is the single place that
//! translates a caught panic into the `failed` status the external
//! interface promises.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::{ParamValue, RunConfig};
use crate::models::{Assignment, InputBundle, ScheduleBundle, Statistics};
use crate::progress::{CancelToken, ProgressSink};
use crate::scoring::{score, ScoreBreakdown, ScoreWeights};
use crate::stats;
use crate::strategy::Strategy;

/// Everything a caller supplies for one scheduling run (§6 "Run invocation").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRequest {
    pub strategy_name: String,
    #[serde(default)]
    pub params: HashMap<String, ParamValue>,
    pub input_bundle: InputBundle,
    #[serde(default)]
    pub weights_override: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub time_limit_seconds: Option<u64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// `ParamValue` has no default `Deserialize` tag discriminator in the
/// wire format the teacher's JSON examples use, so it's written out by
/// hand to accept either a bare integer or float.
impl Serialize for ParamValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ParamValue::Int(v) => serializer.serialize_i64(*v),
            ParamValue::Float(v) => serializer.serialize_f64(*v),
        }
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(v) => ParamValue::Int(v),
            Raw::Float(v) => ParamValue::Float(v),
        })
    }
}

/// The shape every run returns (§6 "Run result"), regardless of
/// whether the strategy finished, was cancelled, timed out, or faulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub status: String,
    pub assignments: Vec<Assignment>,
    pub statistics: Statistics,
    pub score_breakdown: ScoreBreakdown,
    pub strategy: String,
    pub seed: u64,
}

/// Runs `strategy` to completion inside a guarded context: starts the
/// wall-clock timer the `statistics` block needs, catches any panic at
/// the strategy boundary and converts it into a `failed` result instead
/// of unwinding into the caller, and always emits the terminal
/// `complete`/`error` event on `progress` exactly once before returning.
#[allow(clippy::too_many_arguments)]
pub fn run(
    strategy: &dyn Strategy,
    inputs: &InputBundle,
    config: &RunConfig,
    weights: &ScoreWeights,
    seed: Option<u64>,
    time_limit_seconds: Option<u64>,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> RunResult {
    let strategy_name = strategy.name();
    let started = Instant::now();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        strategy.run(inputs, config, weights, seed, time_limit_seconds, progress, cancel)
    }));

    let execution_time_seconds = started.elapsed().as_secs_f64();

    let result = match outcome {
        Ok(Ok(outcome)) => {
            let breakdown = score(&outcome.assignments, inputs, weights, &outcome.pairs);
            let statistics = stats::assemble(&outcome.assignments, &breakdown, execution_time_seconds);
            let status = if outcome.cut_short { "cancelled" } else { "completed" };
            info!(strategy = strategy_name, status, seed = outcome.seed_used, "run finished");
            RunResult {
                status: status.to_string(),
                assignments: outcome.assignments,
                statistics,
                score_breakdown: breakdown,
                strategy: strategy_name.to_string(),
                seed: outcome.seed_used,
            }
        }
        Ok(Err(core_error)) => {
            error!(strategy = strategy_name, error = %core_error, "strategy returned an error");
            let status = match core_error.kind() {
                crate::error::ErrorKind::Timeout | crate::error::ErrorKind::Cancelled => "cancelled",
                _ => "failed",
            };
            RunResult {
                status: status.to_string(),
                assignments: Vec::new(),
                statistics: Statistics {
                    execution_time_seconds,
                    ..Statistics::default()
                },
                score_breakdown: ScoreBreakdown::default(),
                strategy: strategy_name.to_string(),
                seed: seed.unwrap_or(0),
            }
        }
        Err(panic_payload) => {
            let message = panic_message(&panic_payload);
            error!(strategy = strategy_name, message, "strategy panicked");
            RunResult {
                status: "failed".to_string(),
                assignments: Vec::new(),
                statistics: Statistics {
                    execution_time_seconds,
                    ..Statistics::default()
                },
                score_breakdown: ScoreBreakdown::default(),
                strategy: strategy_name.to_string(),
                seed: seed.unwrap_or(0),
            }
        }
    };

    if result.status == "failed" {
        progress.error(crate::error::ErrorKind::Internal, &format!("strategy '{strategy_name}' failed"));
    } else {
        progress.complete(ScheduleBundle {
            assignments: result.assignments.clone(),
            statistics: result.statistics.clone(),
            score_breakdown: result.score_breakdown.clone(),
        });
    }

    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
