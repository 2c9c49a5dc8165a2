//! # levolve
//!
//! A genetic algorithm that evolves playable 2D platformer levels.
//!
//! A population of candidate levels is repeatedly scored by an external
//! level-quality evaluator, selected, recombined, and mutated across
//! generations. Two interchangeable genome representations live behind one
//! polymorphic contract: a dense tile grid ([`level::Level`]) and a sparse
//! multiset of placed design elements ([`genome::DesignGenome`]). The
//! driver, selection, and fitness caching work identically for either.
//!
//! ```rust
//! use levolve::config::Config;
//! use levolve::evolution::{EvolutionDriver, EvolutionOptions};
//! use levolve::fitness::{FitnessFunction, LevelEvaluator, Metrics, METRIC_NAMES};
//! use levolve::genome::DesignGenome;
//! use levolve::level::Level;
//! use levolve::rng::RandomNumberGenerator;
//!
//! // Stand-in for the real solvability/shape evaluator
//! struct ConstantEvaluator;
//!
//! impl LevelEvaluator for ConstantEvaluator {
//!     fn evaluate(&self, _level: &Level) -> levolve::Result<Metrics> {
//!         Ok(METRIC_NAMES
//!             .iter()
//!             .map(|name| (name.to_string(), 1.0))
//!             .collect())
//!     }
//! }
//!
//! fn main() -> levolve::Result<()> {
//!     let options = EvolutionOptions::builder()
//!         .population_size(8)
//!         .num_generations(2)
//!         .num_workers(2)
//!         .build();
//!     let driver: EvolutionDriver<DesignGenome, _> = EvolutionDriver::new(
//!         Config::default(),
//!         options,
//!         FitnessFunction::new(ConstantEvaluator),
//!     )?;
//!
//!     let mut rng = RandomNumberGenerator::from_seed(7);
//!     let population = driver.run(&mut rng)?;
//!     let best = &population[0];
//!     println!("best fitness: {:?}", best.fitness());
//!     print!("{}", best.level(&Config::default()));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod genome;
pub mod level;
pub mod rng;
pub mod selection;

// Re-export commonly used types for convenience
pub use error::{GeneticError, Result};
