//! # Evolution Driver
//!
//! Orchestrates an evolution run: builds the initial population, scores it
//! on a fixed-size worker pool, then loops generation by generation through
//! selection, recombination, and re-scoring until the generation budget is
//! spent or an external cancellation is requested.
//!
//! Only fitness evaluation is parallel. Workers receive individuals by
//! value and hand them back with their fitness and level caches populated;
//! the coordinator adopts the returned vector as the new population.
//! Cancellation is checked only at generation boundaries, so an in-flight
//! scoring batch always completes and the current population is still
//! returned.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{GeneticError, Result};
use crate::fitness::{FitnessFunction, LevelEvaluator};
use crate::genome::{Genome, Individual};
use crate::rng::RandomNumberGenerator;
use crate::selection::generate_successors;

/// Manages the evolution of one genome representation against one
/// evaluator.
///
/// The driver depends on the representation only through the [`Genome`]
/// trait; grid and design-element populations evolve through identical
/// machinery.
#[derive(Debug)]
pub struct EvolutionDriver<G, E>
where
    G: Genome,
    E: LevelEvaluator,
{
    config: Config,
    options: super::EvolutionOptions,
    fitness: FitnessFunction<E>,
    pool: rayon::ThreadPool,
    cancel: Arc<AtomicBool>,
    _marker: PhantomData<G>,
}

impl<G, E> EvolutionDriver<G, E>
where
    G: Genome,
    E: LevelEvaluator,
{
    /// Creates a driver, validating the configuration and building the
    /// worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] for invalid options or
    /// parameter tables, or when the worker pool cannot be built.
    pub fn new(
        config: Config,
        options: super::EvolutionOptions,
        fitness: FitnessFunction<E>,
    ) -> Result<Self> {
        options.validate()?;
        config.validate()?;

        let workers = options.num_workers().unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        });
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| {
                GeneticError::Configuration(format!("failed to build worker pool: {e}"))
            })?;

        Ok(Self {
            config,
            options,
            fitness,
            pool,
            cancel: Arc::new(AtomicBool::new(false)),
            _marker: PhantomData,
        })
    }

    /// Returns a handle that cancels the run when set.
    ///
    /// The flag is checked at generation boundaries only; the generation in
    /// progress completes and the current population is still returned.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Runs the evolution and returns the final population, scored and
    /// sorted by descending fitness.
    ///
    /// # Errors
    ///
    /// Propagates evaluator failures and selection errors; cancellation is
    /// not an error.
    pub fn run(&self, rng: &mut RandomNumberGenerator) -> Result<Vec<Individual<G>>> {
        let mut population = self.initial_population(rng);
        population = self.score_population(population)?;
        sort_by_fitness(&mut population);
        info!(
            size = population.len(),
            best = best_fitness(&population),
            "initial population scored"
        );

        for generation in 1..=self.options.num_generations() {
            if self.cancel.load(Ordering::Relaxed) {
                info!(generation, "cancellation requested, stopping evolution");
                break;
            }
            let successors = generate_successors(&population, &self.config, rng)?;
            population = self.score_population(successors)?;
            sort_by_fitness(&mut population);
            info!(
                generation,
                best = best_fitness(&population),
                "generation complete"
            );
        }

        Ok(population)
    }

    fn initial_population(&self, rng: &mut RandomNumberGenerator) -> Vec<Individual<G>> {
        (0..self.options.population_size())
            .map(|_| {
                if rng.chance(self.options.random_ratio()) {
                    Individual::random(&self.config, rng)
                } else {
                    Individual::empty(&self.config)
                }
            })
            .collect()
    }

    /// Scores a population across the worker pool in equal-sized batches.
    ///
    /// Individuals move into the pool and come back with caches populated;
    /// the returned vector replaces the input as the source of truth.
    fn score_population(&self, population: Vec<Individual<G>>) -> Result<Vec<Individual<G>>> {
        let workers = self.pool.current_num_threads().max(1);
        let batch_size = ((population.len() + workers - 1) / workers).max(1);
        debug!(
            individuals = population.len(),
            workers, batch_size, "scoring population"
        );

        let fitness = &self.fitness;
        let config = &self.config;
        self.pool.install(|| {
            population
                .into_par_iter()
                .with_min_len(batch_size)
                .map(|individual| {
                    fitness.score(&individual, config)?;
                    Ok(individual)
                })
                .collect()
        })
    }
}

fn sort_by_fitness<G: Genome>(population: &mut [Individual<G>]) {
    population.sort_by(|a, b| {
        b.fitness()
            .unwrap_or(f64::NEG_INFINITY)
            .total_cmp(&a.fitness().unwrap_or(f64::NEG_INFINITY))
    });
}

fn best_fitness<G: Genome>(population: &[Individual<G>]) -> f64 {
    population
        .first()
        .and_then(Individual::fitness)
        .unwrap_or(f64::NAN)
}
