//! # Error Types
//!
//! This module defines the error types for the level-evolution library.
//! It provides specific error variants for the failure scenarios that may
//! occur while configuring and running the genetic algorithm.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use levolve::error::{GeneticError, Result};
//!
//! fn some_function() -> Result<()> {
//!     // Function implementation
//!     Ok(())
//! }
//!
//! fn caller() {
//!     match some_function() {
//!         Ok(_) => println!("Success!"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

use thiserror::Error;

/// Represents errors that can occur while evolving levels.
///
/// This enum provides specific error variants for different failure
/// scenarios that may occur during the evolution process.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// Error that occurs when an invalid configuration is provided.
    ///
    /// Raised at driver startup for out-of-range level dimensions,
    /// degenerate population sizes, or an unbuildable worker pool. Fatal.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when the external level evaluator fails.
    ///
    /// The evaluator is assumed total on any syntactically valid level; if
    /// it is not, its failure is surfaced unmodified and terminates the run.
    #[error("Evaluator error: {0}")]
    Evaluator(String),

    /// Error that occurs when a fitness score cannot be computed from the
    /// evaluator's measurements (for example a missing metric key).
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// Error that occurs when a crossover operator requires a parent's
    /// cached fitness and the parent was never scored.
    ///
    /// Fitness must be computed for both parents before grid crossover is
    /// invoked; this surfaces that precondition instead of recomputing
    /// silently.
    #[error("Unscored individual: fitness must be computed before crossover")]
    UnscoredIndividual,
}

/// A specialized Result type for level-evolution operations.
///
/// This type is a convenience wrapper around `std::result::Result` with the
/// error type fixed to `GeneticError`.
pub type Result<T> = std::result::Result<T, GeneticError>;
