//! Run configuration (§6).
//!
//! Parses the caller's `params: map<string, scalar>` into a strongly
//! typed, range-validated [`RunConfig`], surfacing `CoreError::BadConfig`
//! on the first out-of-range value rather than letting a strategy
//! discover it mid-run.

use std::collections::HashMap;

use crate::error::CoreError;

/// A scalar config value as received from a caller (`map<string, scalar>`).
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    fn as_f64(&self) -> f64 {
        match self {
            ParamValue::Int(v) => *v as f64,
            ParamValue::Float(v) => *v,
        }
    }

    fn as_positive_usize(&self, name: &str) -> Result<usize, CoreError> {
        let v = self.as_f64();
        if v <= 0.0 || v.fract() != 0.0 {
            return Err(CoreError::BadConfig(format!("{name} must be a positive integer, got {v}")));
        }
        Ok(v as usize)
    }
}

/// Per-strategy configuration, range-validated at construction time.
///
/// Every field keeps the distilled spec's documented default so a
/// strategy can be run with an empty `params` map.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub max_iterations: usize,
    pub generations: usize,
    pub population_size: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub tabu_tenure: usize,
    pub max_time_seconds: u64,
    pub num_search_workers: usize,
    pub time_limit_seconds: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            generations: 100,
            population_size: 50,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            initial_temperature: 100.0,
            cooling_rate: 0.01,
            tabu_tenure: 10,
            max_time_seconds: 60,
            num_search_workers: 4,
            time_limit_seconds: 180,
        }
    }
}

impl RunConfig {
    /// Parses and range-validates `params` on top of the documented
    /// defaults. Unknown keys are ignored (forward compatibility);
    /// a known key with an out-of-range value fails fast with
    /// `BadConfig` before returning.
    pub fn from_params(params: &HashMap<String, ParamValue>) -> Result<Self, CoreError> {
        let mut config = Self::default();

        if let Some(v) = params.get("max_iterations") {
            // §6 exposes a single `max_iterations` knob shared by GA, TS,
            // and SA; GA calls its own default "generations" (§4.4), so an
            // explicit override moves both unless "generations" is also set.
            let n = v.as_positive_usize("max_iterations")?;
            config.max_iterations = n;
            config.generations = n;
        }
        if let Some(v) = params.get("generations") {
            config.generations = v.as_positive_usize("generations")?;
        }
        if let Some(v) = params.get("population_size") {
            let n = v.as_positive_usize("population_size")?;
            if n < 10 {
                return Err(CoreError::BadConfig(format!("population_size must be >= 10, got {n}")));
            }
            config.population_size = n;
        }
        if let Some(v) = params.get("mutation_rate") {
            let rate = v.as_f64();
            if !(0.0..=1.0).contains(&rate) {
                return Err(CoreError::BadConfig(format!("mutation_rate must be in [0, 1], got {rate}")));
            }
            config.mutation_rate = rate;
        }
        if let Some(v) = params.get("crossover_rate") {
            let rate = v.as_f64();
            if !(0.0..=1.0).contains(&rate) {
                return Err(CoreError::BadConfig(format!("crossover_rate must be in [0, 1], got {rate}")));
            }
            config.crossover_rate = rate;
        }
        if let Some(v) = params.get("initial_temperature") {
            let t = v.as_f64();
            if t <= 0.0 {
                return Err(CoreError::BadConfig(format!("initial_temperature must be > 0, got {t}")));
            }
            config.initial_temperature = t;
        }
        if let Some(v) = params.get("cooling_rate") {
            let r = v.as_f64();
            if !(r > 0.0 && r < 1.0) {
                return Err(CoreError::BadConfig(format!("cooling_rate must be in (0, 1), got {r}")));
            }
            config.cooling_rate = r;
        }
        if let Some(v) = params.get("tabu_tenure") {
            config.tabu_tenure = v.as_positive_usize("tabu_tenure")?;
        }
        if let Some(v) = params.get("max_time_seconds") {
            config.max_time_seconds = v.as_positive_usize("max_time_seconds")? as u64;
        }
        if let Some(v) = params.get("num_search_workers") {
            let n = v.as_positive_usize("num_search_workers")?;
            if n < 1 {
                return Err(CoreError::BadConfig(format!("num_search_workers must be >= 1, got {n}")));
            }
            config.num_search_workers = n;
        }
        if let Some(v) = params.get("time_limit_seconds") {
            config.time_limit_seconds = v.as_positive_usize("time_limit_seconds")? as u64;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_no_params() {
        let config = RunConfig::from_params(&HashMap::new()).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_valid_override() {
        let mut params = HashMap::new();
        params.insert("population_size".to_string(), ParamValue::Int(100));
        let config = RunConfig::from_params(&params).unwrap();
        assert_eq!(config.population_size, 100);
    }

    #[test]
    fn test_max_iterations_override_mirrors_into_generations() {
        let mut params = HashMap::new();
        params.insert("max_iterations".to_string(), ParamValue::Int(250));
        let config = RunConfig::from_params(&params).unwrap();
        assert_eq!(config.max_iterations, 250);
        assert_eq!(config.generations, 250);
    }

    #[test]
    fn test_generations_override_independent_of_max_iterations() {
        let mut params = HashMap::new();
        params.insert("max_iterations".to_string(), ParamValue::Int(250));
        params.insert("generations".to_string(), ParamValue::Int(40));
        let config = RunConfig::from_params(&params).unwrap();
        assert_eq!(config.max_iterations, 250);
        assert_eq!(config.generations, 40);
    }

    #[test]
    fn test_population_size_below_minimum_rejected() {
        let mut params = HashMap::new();
        params.insert("population_size".to_string(), ParamValue::Int(5));
        let err = RunConfig::from_params(&params).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::BadConfig);
    }

    #[test]
    fn test_mutation_rate_out_of_range_rejected() {
        let mut params = HashMap::new();
        params.insert("mutation_rate".to_string(), ParamValue::Float(1.5));
        assert!(RunConfig::from_params(&params).is_err());
    }

    #[test]
    fn test_cooling_rate_boundary_rejected() {
        let mut params = HashMap::new();
        params.insert("cooling_rate".to_string(), ParamValue::Float(1.0));
        assert!(RunConfig::from_params(&params).is_err());
    }
}
