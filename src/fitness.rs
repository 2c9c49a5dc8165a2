//! # Fitness Evaluation
//!
//! The seam to the external level-quality evaluator, and the adapter that
//! folds its named measurements into one scalar fitness per individual.
//!
//! The evaluator is a pure function from a materialized level to a mapping
//! of named measurements; this crate never inspects how the measurements
//! are produced. The adapter combines them with fixed linear weights, adds
//! the representation-specific penalty, and memoizes the scalar on the
//! individual so the evaluator runs at most once per individual.
//!
//! ## Example
//!
//! ```rust
//! use levolve::config::Config;
//! use levolve::fitness::{FitnessFunction, LevelEvaluator, Metrics, METRIC_NAMES};
//! use levolve::genome::{DesignGenome, Individual};
//! use levolve::level::Level;
//!
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
//! let config = Config::default();
//! let fitness = FitnessFunction::new(ConstantEvaluator);
//! let individual: Individual<DesignGenome> = Individual::empty(&config);
//! let score = fitness.score(&individual, &config).unwrap();
//! assert!((score - 3.7).abs() < 1e-9);
//! ```

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{GeneticError, Result};
use crate::genome::{Genome, Individual};
use crate::level::Level;

/// Named scalar measurements reported by the external evaluator.
pub type Metrics = HashMap<String, f64>;

/// The metric keys every evaluator must report.
pub const METRIC_NAMES: [&str; 6] = [
    "meaningfulJumpVariance",
    "negativeSpace",
    "pathPercentage",
    "emptyPercentage",
    "linearity",
    "solvability",
];

/// The external level-quality evaluator.
///
/// Implementations must report at least the keys in [`METRIC_NAMES`];
/// behavior on malformed levels is evaluator-defined and any failure is
/// treated as fatal by the evolution driver.
pub trait LevelEvaluator: Send + Sync {
    /// Measures a materialized level.
    fn evaluate(&self, level: &Level) -> Result<Metrics>;
}

/// The fixed linear weighting applied to the evaluator's measurements.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessWeights {
    pub meaningful_jump_variance: f64,
    pub negative_space: f64,
    pub path_percentage: f64,
    pub empty_percentage: f64,
    pub linearity: f64,
    pub solvability: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            meaningful_jump_variance: 0.5,
            negative_space: 0.6,
            path_percentage: 0.5,
            empty_percentage: 0.6,
            linearity: -0.5,
            solvability: 2.0,
        }
    }
}

impl FitnessWeights {
    fn pairs(&self) -> [(&'static str, f64); 6] {
        [
            ("meaningfulJumpVariance", self.meaningful_jump_variance),
            ("negativeSpace", self.negative_space),
            ("pathPercentage", self.path_percentage),
            ("emptyPercentage", self.empty_percentage),
            ("linearity", self.linearity),
            ("solvability", self.solvability),
        ]
    }

    /// Reduces a measurement map to the weighted sum.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::FitnessCalculation`] when a weighted metric
    /// is missing from the map.
    pub fn combine(&self, metrics: &Metrics) -> Result<f64> {
        self.pairs().iter().try_fold(0.0, |sum, (name, weight)| {
            metrics
                .get(*name)
                .map(|measurement| sum + weight * measurement)
                .ok_or_else(|| {
                    GeneticError::FitnessCalculation(format!(
                        "evaluator did not report metric `{name}`"
                    ))
                })
        })
    }
}

/// Memoizing adapter between individuals and the external evaluator.
///
/// Scoring materializes the individual's level (cached), invokes the
/// evaluator, folds the measurements through the weights, and adds the
/// genome's representation-specific penalty. Both the materialized level
/// and the scalar fitness are cached on the individual, so repeated calls
/// return the identical value without re-invoking the evaluator.
#[derive(Debug, Clone)]
pub struct FitnessFunction<E> {
    evaluator: E,
    weights: FitnessWeights,
}

impl<E: LevelEvaluator> FitnessFunction<E> {
    /// Wraps an evaluator with the default weights.
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            weights: FitnessWeights::default(),
        }
    }

    /// Wraps an evaluator with custom weights.
    pub fn with_weights(evaluator: E, weights: FitnessWeights) -> Self {
        Self { evaluator, weights }
    }

    /// Returns the wrapped evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Scores an individual, caching the result on it.
    ///
    /// # Errors
    ///
    /// Propagates evaluator failures and missing-metric errors; neither is
    /// retried.
    pub fn score<G: Genome>(&self, individual: &Individual<G>, config: &Config) -> Result<f64> {
        if let Some(cached) = individual.fitness() {
            return Ok(cached);
        }
        let measurements = self.evaluator.evaluate(individual.level(config))?;
        let weighted = self.weights.combine(&measurements)?;
        let score = weighted + individual.genome().penalty(config);
        Ok(individual.cache_fitness(score))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::genome::design::{DesignElement, StairDirection};
    use crate::genome::DesignGenome;
    use crate::level::Level as GridGenome;
    use crate::rng::RandomNumberGenerator;

    // Evaluator returning 1.0 for every metric and counting its invocations
    #[derive(Clone)]
    struct CountingEvaluator {
        evaluations: Arc<AtomicUsize>,
    }

    impl CountingEvaluator {
        fn new() -> Self {
            Self {
                evaluations: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn evaluations(&self) -> usize {
            self.evaluations.load(Ordering::SeqCst)
        }
    }

    impl LevelEvaluator for CountingEvaluator {
        fn evaluate(&self, _level: &Level) -> Result<Metrics> {
            self.evaluations.fetch_add(1, Ordering::SeqCst);
            Ok(METRIC_NAMES
                .iter()
                .map(|name| (name.to_string(), 1.0))
                .collect())
        }
    }

    struct FailingEvaluator;

    impl LevelEvaluator for FailingEvaluator {
        fn evaluate(&self, _level: &Level) -> Result<Metrics> {
            Err(GeneticError::Evaluator("solver crashed".to_string()))
        }
    }

    #[test]
    fn test_weighted_sum_of_unit_metrics() {
        let metrics: Metrics = METRIC_NAMES
            .iter()
            .map(|name| (name.to_string(), 1.0))
            .collect();
        let combined = FitnessWeights::default().combine(&metrics).unwrap();
        assert!((combined - 3.7).abs() < 1e-9);
    }

    #[test]
    fn test_missing_metric_is_an_error() {
        let mut metrics: Metrics = METRIC_NAMES
            .iter()
            .map(|name| (name.to_string(), 1.0))
            .collect();
        metrics.remove("solvability");

        let result = FitnessWeights::default().combine(&metrics);
        assert!(matches!(result, Err(GeneticError::FitnessCalculation(_))));
    }

    #[test]
    fn test_evaluator_invoked_at_most_once_per_individual() {
        let config = Config::default();
        let evaluator = CountingEvaluator::new();
        let fitness = FitnessFunction::new(evaluator.clone());
        let individual: Individual<DesignGenome> = Individual::empty(&config);

        let first = fitness.score(&individual, &config).unwrap();
        let second = fitness.score(&individual, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(individual.fitness(), Some(first));
        assert_eq!(evaluator.evaluations(), 1);
    }

    #[test]
    fn test_grid_individual_scores_without_penalty() {
        let config = Config::default();
        let mut rng = RandomNumberGenerator::from_seed(31);
        let fitness = FitnessFunction::new(CountingEvaluator::new());
        let individual: Individual<GridGenome> = Individual::random(&config, &mut rng);

        let score = fitness.score(&individual, &config).unwrap();
        assert!((score - 3.7).abs() < 1e-9);
    }

    #[test]
    fn test_stair_penalty_applies_to_design_individuals() {
        let config = Config::default();
        let fitness = FitnessFunction::new(CountingEvaluator::new());
        let stairs: Vec<DesignElement> = (0..6)
            .map(|i| DesignElement::Stairs {
                x: 10 + 5 * i,
                height: 3,
                direction: StairDirection::Ascending,
            })
            .collect();
        let individual = Individual::new(DesignGenome::new(stairs));

        let score = fitness.score(&individual, &config).unwrap();
        assert!((score - 1.7).abs() < 1e-9);
    }

    #[test]
    fn test_evaluator_failure_propagates() {
        let config = Config::default();
        let fitness = FitnessFunction::new(FailingEvaluator);
        let individual: Individual<DesignGenome> = Individual::empty(&config);

        let result = fitness.score(&individual, &config);
        assert!(matches!(result, Err(GeneticError::Evaluator(_))));
        // A failed evaluation leaves the individual unscored
        assert_eq!(individual.fitness(), None);
    }
}
