//! Genetic strategy — §4.4 table row 2.
//!
//! Population of candidate assignment sets; per-generation tournament
//! selection, crossover, mutation; elitism keeps the best individual.
//!
//! # Encoding
//!
//! The chromosome is a direct per-project cell encoding: each
//! individual is a `Vec<(classroom_id, timeslot_id)>` positioned
//! against a fixed `base` assignment set (the constructor's bootstrap,
//! which also fixes each project's responsible instructor and jury).
//! Only the cell moves during evolution — there is no
//! operation-sequencing precedence in this domain for a permutation
//! encoding to express, so crossover and mutation both act directly on
//! cells rather than on an operation order.

use tracing::{debug, info};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::RunConfig;
use crate::constructor;
use crate::error::CoreError;
use crate::models::{Assignment, InputBundle};
use crate::progress::{CancelToken, ProgressSink};
use crate::scoring::{score, ScoreWeights};

use super::{emit_progress, random_cell, strategy_rng, Deadline, Strategy, StrategyOutcome};

#[derive(Debug, Default)]
pub struct GeneticStrategy;

#[derive(Debug, Clone)]
struct Individual {
    cells: Vec<(u64, u64)>,
    fitness: f64,
}

impl Individual {
    fn decode(&self, base: &[Assignment]) -> Vec<Assignment> {
        base.iter()
            .zip(&self.cells)
            .map(|(template, &(classroom_id, timeslot_id))| Assignment {
                classroom_id,
                timeslot_id,
                ..template.clone()
            })
            .collect()
    }
}

impl Strategy for GeneticStrategy {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn run(
        &self,
        inputs: &InputBundle,
        config: &RunConfig,
        weights: &ScoreWeights,
        seed: Option<u64>,
        time_limit_seconds: Option<u64>,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<StrategyOutcome, CoreError> {
        let (mut rng, seed_used) = strategy_rng(seed, self.name());
        let bootstrap = constructor::construct(inputs);
        let base = bootstrap.assignments;
        let pairs = bootstrap.pairs;
        let deadline = Deadline::new(time_limit_seconds);

        if base.is_empty() {
            return Ok(StrategyOutcome { assignments: base, pairs, cut_short: false, seed_used });
        }

        let mut population = initial_population(&base, inputs, config.population_size, &mut rng, weights, &pairs);
        let mut cut_short = false;

        for generation in 0..generations(config) {
            if cancel.is_cancelled() || deadline.expired() {
                cut_short = true;
                break;
            }

            population.sort_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap());
            let elite = population[0].clone();

            let mut next_generation = vec![elite];
            while next_generation.len() < population.len() {
                let parent_a = tournament(&population, &mut rng);
                let parent_b = tournament(&population, &mut rng);

                let mut child_cells = if rng.gen::<f64>() < config.crossover_rate {
                    crossover(&parent_a.cells, &parent_b.cells, &mut rng)
                } else {
                    parent_a.cells.clone()
                };

                if rng.gen::<f64>() < config.mutation_rate {
                    mutate(&mut child_cells, inputs, &mut rng);
                }

                let fitness = score(&Individual { cells: child_cells.clone(), fitness: 0.0 }.decode(&base), inputs, weights, &pairs).total;
                next_generation.push(Individual { cells: child_cells, fitness });
            }

            population = next_generation;

            if generation % 10 == 0 {
                let fraction = (generation as f64 / generations(config) as f64).min(0.99);
                emit_progress(progress, fraction, "running", &format!("generation {generation}"));
                debug!(strategy = self.name(), generation, best = population[0].fitness, "generation complete");
            }
        }

        population.sort_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap());
        let best = population.into_iter().next().unwrap();

        emit_progress(progress, 1.0, if cut_short { "cancelled" } else { "completed" }, "evolution finished");
        info!(strategy = self.name(), best_score = best.fitness, cut_short, "run finished");

        Ok(StrategyOutcome {
            assignments: best.decode(&base),
            pairs,
            cut_short,
            seed_used,
        })
    }
}

fn generations(config: &RunConfig) -> usize {
    config.generations.min(1000).max(1)
}

fn initial_population(
    base: &[Assignment],
    inputs: &InputBundle,
    population_size: usize,
    rng: &mut ChaCha8Rng,
    weights: &ScoreWeights,
    pairs: &[(u64, u64)],
) -> Vec<Individual> {
    let base_cells: Vec<(u64, u64)> = base.iter().map(|a| (a.classroom_id, a.timeslot_id)).collect();
    let mut population = Vec::with_capacity(population_size.max(1));

    let seed_individual = Individual {
        cells: base_cells.clone(),
        fitness: score(base, inputs, weights, pairs).total,
    };
    population.push(seed_individual);

    while population.len() < population_size.max(1) {
        let mut cells = base_cells.clone();
        mutate(&mut cells, inputs, rng);
        let decoded = Individual { cells: cells.clone(), fitness: 0.0 }.decode(base);
        let fitness = score(&decoded, inputs, weights, pairs).total;
        population.push(Individual { cells, fitness });
    }

    population
}

fn tournament<'a>(population: &'a [Individual], rng: &mut ChaCha8Rng) -> &'a Individual {
    let a = &population[rng.gen_range(0..population.len())];
    let b = &population[rng.gen_range(0..population.len())];
    if a.fitness <= b.fitness {
        a
    } else {
        b
    }
}

/// Swaps the assigned cells for a random subset of projects between
/// the two parents (distilled spec's literal crossover description).
fn crossover(a: &[(u64, u64)], b: &[(u64, u64)], rng: &mut ChaCha8Rng) -> Vec<(u64, u64)> {
    a.iter()
        .zip(b.iter())
        .map(|(&cell_a, &cell_b)| if rng.gen_bool(0.5) { cell_a } else { cell_b })
        .collect()
}

/// Reassigns one project to a random free (or least-penalized) cell.
fn mutate(cells: &mut [(u64, u64)], inputs: &InputBundle, rng: &mut ChaCha8Rng) {
    if cells.is_empty() {
        return;
    }
    let idx = rng.gen_range(0..cells.len());
    cells[idx] = random_cell(rng, inputs);
}
