//! Strategy factory (§6 "Recognized configuration options" /
//! strategy-name resolution).
//!
//! Resolves a caller-supplied strategy name (plus its common
//! abbreviation) and a raw `params` map into a boxed [`Strategy`] and a
//! validated [`RunConfig`], failing fast on either an unknown name or
//! an out-of-range parameter before anything runs.

use std::collections::HashMap;

use crate::config::{ParamValue, RunConfig};
use crate::error::CoreError;
use crate::strategy::{
    ConstraintPropagationStrategy, DynamicProgrammingPairingStrategy, EarliestFirstStrategy, GeneticStrategy,
    LexicographicStrategy, SimulatedAnnealingStrategy, Strategy, TabuSearchStrategy,
};

/// Resolves `name` (after alias lookup) and `params`, returning a ready
/// strategy plus its validated configuration. Validates config before
/// the unknown-name check would matter downstream — but an unknown
/// name is itself checked first, since there's no strategy to hand a
/// config to otherwise.
pub fn create(name: &str, params: &HashMap<String, ParamValue>) -> Result<(Box<dyn Strategy>, RunConfig), CoreError> {
    let strategy = resolve(name)?;
    let config = RunConfig::from_params(params)?;
    Ok((strategy, config))
}

fn resolve(name: &str) -> Result<Box<dyn Strategy>, CoreError> {
    let canonical = canonicalize(name);
    match canonical.as_str() {
        "earliest_first" => Ok(Box::new(EarliestFirstStrategy)),
        "genetic" => Ok(Box::new(GeneticStrategy)),
        "simulated_annealing" => Ok(Box::new(SimulatedAnnealingStrategy)),
        "tabu_search" => Ok(Box::new(TabuSearchStrategy)),
        "constraint_propagation" => Ok(Box::new(ConstraintPropagationStrategy)),
        "dynamic_programming_pairing" => Ok(Box::new(DynamicProgrammingPairingStrategy)),
        "lexicographic" => Ok(Box::new(LexicographicStrategy)),
        _ => Err(CoreError::NoSuchStrategy(name.to_string())),
    }
}

/// Maps recognized abbreviations onto their canonical strategy name.
/// Unknown input passes through unchanged so `resolve` can report it.
fn canonicalize(name: &str) -> String {
    match name {
        "ga" => "genetic",
        "sa" => "simulated_annealing",
        "ts" | "tabu" => "tabu_search",
        "cp" => "constraint_propagation",
        "dp" => "dynamic_programming_pairing",
        "lex" => "lexicographic",
        "ef" => "earliest_first",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_canonical_names() {
        for name in [
            "earliest_first",
            "genetic",
            "simulated_annealing",
            "tabu_search",
            "constraint_propagation",
            "dynamic_programming_pairing",
            "lexicographic",
        ] {
            assert!(create(name, &HashMap::new()).is_ok(), "expected {name} to resolve");
        }
    }

    #[test]
    fn test_resolves_aliases() {
        assert_eq!(resolve("ga").unwrap().name(), "genetic");
        assert_eq!(resolve("sa").unwrap().name(), "simulated_annealing");
        assert_eq!(resolve("dp").unwrap().name(), "dynamic_programming_pairing");
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = create("not_a_strategy", &HashMap::new()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NoSuchStrategy);
    }

    #[test]
    fn test_bad_config_rejected_before_strategy_runs() {
        let mut params = HashMap::new();
        params.insert("population_size".to_string(), ParamValue::Int(1));
        let err = create("genetic", &params).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::BadConfig);
    }
}
