//! # Genomes and Individuals
//!
//! The `Genome` trait is the polymorphic contract behind which the two level
//! representations live: the dense tile grid ([`Level`] itself) and the
//! sparse design-element multiset ([`design::DesignGenome`]). The driver,
//! selection, and fitness caching depend only on this trait and work
//! identically for either representation.
//!
//! An [`Individual`] wraps exactly one genome together with two lazily
//! computed, write-once caches: the scalar fitness and the materialized
//! level. Transformations (mutation, crossover) always construct new
//! individuals; once computed, an individual's caches are immutable for its
//! lifetime.

pub mod design;
pub mod grid;

use std::fmt::Debug;
use std::sync::OnceLock;

use crate::config::Config;
use crate::error::Result;
use crate::level::Level;
use crate::rng::RandomNumberGenerator;

pub use design::{DesignElement, DesignGenome};

/// The capability contract shared by both level representations.
///
/// Types implementing this trait must also implement `Clone`, `Debug`,
/// `Send`, and `Sync` so populations can be scored on a worker pool.
pub trait Genome: Clone + Debug + Send + Sync + Sized {
    /// Builds a stochastic genome.
    fn random(config: &Config, rng: &mut RandomNumberGenerator) -> Self;

    /// Builds the deterministic baseline genome containing only the
    /// structural markers.
    fn empty(config: &Config) -> Self;

    /// Whether the genome carries no evolvable content.
    ///
    /// Only the design-element representation can be empty; a grid genome
    /// always has a full tile matrix.
    fn is_empty(&self) -> bool;

    /// Applies the representation-specific mutation operator and returns
    /// the mutated genome.
    fn mutate(self, config: &Config, rng: &mut RandomNumberGenerator) -> Self;

    /// Recombines `self` with `other` into one or two offspring genomes,
    /// mutation included.
    ///
    /// `fitness` carries both parents' cached fitness values in order
    /// (`self`, `other`). The grid operator biases pipe donation by parent
    /// fitness and therefore requires both values.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::UnscoredIndividual`] when a required parent
    /// fitness is missing.
    ///
    /// [`GeneticError::UnscoredIndividual`]: crate::error::GeneticError::UnscoredIndividual
    fn generate_children(
        &self,
        other: &Self,
        fitness: (Option<f64>, Option<f64>),
        config: &Config,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Self>>;

    /// Compiles the genome into a concrete level.
    fn materialize(&self, config: &Config) -> Level;

    /// Representation-specific fitness penalty, added to the weighted
    /// evaluator measurements.
    fn penalty(&self, _config: &Config) -> f64 {
        0.0
    }
}

/// One candidate level: a genome plus write-once caches for its fitness and
/// its materialized level.
#[derive(Debug, Clone)]
pub struct Individual<G: Genome> {
    genome: G,
    fitness: OnceLock<f64>,
    level: OnceLock<Level>,
}

impl<G: Genome> Individual<G> {
    /// Wraps a genome with empty caches.
    pub fn new(genome: G) -> Self {
        Self {
            genome,
            fitness: OnceLock::new(),
            level: OnceLock::new(),
        }
    }

    /// Creates an individual with a stochastic genome.
    pub fn random(config: &Config, rng: &mut RandomNumberGenerator) -> Self {
        Self::new(G::random(config, rng))
    }

    /// Creates the deterministic baseline individual.
    pub fn empty(config: &Config) -> Self {
        Self::new(G::empty(config))
    }

    /// Returns the genome.
    pub fn genome(&self) -> &G {
        &self.genome
    }

    /// Returns the cached fitness, if this individual has been scored.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness.get().copied()
    }

    /// Stores the fitness. The first stored value wins; later calls return
    /// it unchanged.
    pub(crate) fn cache_fitness(&self, value: f64) -> f64 {
        *self.fitness.get_or_init(|| value)
    }

    /// Returns the materialized level, compiling and caching it on first
    /// access.
    pub fn level(&self, config: &Config) -> &Level {
        self.level.get_or_init(|| self.genome.materialize(config))
    }

    /// Recombines two parents into new individuals with fresh caches.
    ///
    /// # Errors
    ///
    /// Propagates [`GeneticError::UnscoredIndividual`] from representations
    /// whose crossover requires scored parents.
    ///
    /// [`GeneticError::UnscoredIndividual`]: crate::error::GeneticError::UnscoredIndividual
    pub fn generate_children(
        &self,
        other: &Self,
        config: &Config,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Self>> {
        let children = self.genome.generate_children(
            &other.genome,
            (self.fitness(), other.fitness()),
            config,
            rng,
        )?;
        Ok(children.into_iter().map(Self::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Tile;

    #[test]
    fn test_level_cache_computed_once() {
        let config = Config::default();
        let mut rng = RandomNumberGenerator::from_seed(3);
        let individual: Individual<DesignGenome> = Individual::random(&config, &mut rng);

        let first = individual.level(&config) as *const Level;
        let second = individual.level(&config) as *const Level;
        assert_eq!(first, second);
    }

    #[test]
    fn test_fitness_cache_write_once() {
        let config = Config::default();
        let individual: Individual<DesignGenome> = Individual::empty(&config);

        assert_eq!(individual.fitness(), None);
        assert_eq!(individual.cache_fitness(1.25), 1.25);
        // The first stored value is immutable
        assert_eq!(individual.cache_fitness(9.0), 1.25);
        assert_eq!(individual.fitness(), Some(1.25));
    }

    #[test]
    fn test_children_have_fresh_caches() {
        let config = Config::default();
        let mut rng = RandomNumberGenerator::from_seed(4);
        let a: Individual<DesignGenome> = Individual::random(&config, &mut rng);
        let b: Individual<DesignGenome> = Individual::random(&config, &mut rng);
        a.cache_fitness(2.0);
        b.cache_fitness(3.0);

        let children = a.generate_children(&b, &config, &mut rng).unwrap();
        assert_eq!(children.len(), 2);
        for child in &children {
            assert_eq!(child.fitness(), None);
        }
    }

    #[test]
    fn test_empty_individual_materializes_baseline() {
        let config = Config::default();
        let individual: Individual<DesignGenome> = Individual::empty(&config);
        let level = individual.level(&config);

        assert_eq!(level.count(Tile::Start), 1);
        assert_eq!(level.count(Tile::Flagpole), 1);
        for x in 0..level.width() {
            assert_eq!(level.tile(x, config.level.ground_row()), Tile::Wall);
        }
    }
}
