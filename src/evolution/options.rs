//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct represents the run-shaping knobs of the
//! evolution driver: population size, generation budget, worker pool size,
//! and the random/empty split of the initial population.
//!
//! ## Example
//!
//! ```rust
//! use levolve::evolution::EvolutionOptions;
//!
//! let options = EvolutionOptions::builder()
//!     .population_size(120)
//!     .num_generations(10)
//!     .num_workers(4)
//!     .build();
//! assert_eq!(options.population_size(), 120);
//!
//! let default_options = EvolutionOptions::default();
//! assert_eq!(default_options.population_size(), 480);
//! ```

use crate::error::{GeneticError, Result};

/// Configuration options for an evolution run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct EvolutionOptions {
    population_size: usize,
    num_generations: usize,
    /// Worker pool size; `None` uses the available parallelism.
    num_workers: Option<usize>,
    /// Fraction of the initial population built from random genomes; the
    /// rest start as empty baseline individuals.
    random_ratio: f64,
}

impl EvolutionOptions {
    /// Creates options with the given parameters.
    pub fn new(
        population_size: usize,
        num_generations: usize,
        num_workers: Option<usize>,
        random_ratio: f64,
    ) -> Self {
        Self {
            population_size,
            num_generations,
            num_workers,
            random_ratio,
        }
    }

    /// The population size of every generation.
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// The fixed generation budget.
    pub fn num_generations(&self) -> usize {
        self.num_generations
    }

    /// The configured worker pool size, if any.
    pub fn num_workers(&self) -> Option<usize> {
        self.num_workers
    }

    /// The random fraction of the initial population.
    pub fn random_ratio(&self) -> f64 {
        self.random_ratio
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] for a population below two,
    /// an explicit zero-sized worker pool, or a random ratio outside
    /// `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(GeneticError::Configuration(format!(
                "population size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.num_workers == Some(0) {
            return Err(GeneticError::Configuration(
                "worker pool size cannot be zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.random_ratio) {
            return Err(GeneticError::Configuration(format!(
                "random ratio must be within [0, 1], got {}",
                self.random_ratio
            )));
        }
        Ok(())
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            population_size: 480,
            num_generations: 6,
            num_workers: None,
            random_ratio: 0.9,
        }
    }
}

/// Builder for [`EvolutionOptions`].
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    population_size: Option<usize>,
    num_generations: Option<usize>,
    num_workers: Option<usize>,
    random_ratio: Option<f64>,
}

impl EvolutionOptionsBuilder {
    /// Sets the population size.
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    /// Sets the generation budget.
    pub fn num_generations(mut self, value: usize) -> Self {
        self.num_generations = Some(value);
        self
    }

    /// Sets the worker pool size.
    pub fn num_workers(mut self, value: usize) -> Self {
        self.num_workers = Some(value);
        self
    }

    /// Sets the random fraction of the initial population.
    pub fn random_ratio(mut self, value: f64) -> Self {
        self.random_ratio = Some(value);
        self
    }

    /// Builds the `EvolutionOptions` instance.
    pub fn build(self) -> EvolutionOptions {
        let defaults = EvolutionOptions::default();
        EvolutionOptions {
            population_size: self.population_size.unwrap_or(defaults.population_size),
            num_generations: self.num_generations.unwrap_or(defaults.num_generations),
            num_workers: self.num_workers.or(defaults.num_workers),
            random_ratio: self.random_ratio.unwrap_or(defaults.random_ratio),
        }
    }
}
