//! # Successor Generation
//!
//! Turns a scored population into the next generation's population of the
//! same size, composing three mechanisms: elitist pairing across the sorted
//! halves, fitness-proportional (roulette wheel) sampling, and a repair pass
//! that tops the result off with crossovers of random top-half pairs.
//!
//! The input population must already be sorted by descending fitness; the
//! evolution driver establishes that ordering after every scoring phase.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::debug;

use crate::config::Config;
use crate::error::{GeneticError, Result};
use crate::genome::{Genome, Individual};
use crate::rng::RandomNumberGenerator;

/// Produces the next population from a scored, descending-sorted one.
///
/// The returned population has exactly the input's size. When fewer than
/// half the input genomes are non-empty, fresh random individuals are
/// appended to the breeding pool first, preventing runaway genome collapse;
/// the injected individuals carry no fitness and only enter through uniform
/// mate choice and repair pairs, never through the wheel.
///
/// # Errors
///
/// Returns [`GeneticError::EmptyPopulation`] for an empty input and
/// propagates crossover failures.
pub fn generate_successors<G: Genome>(
    population: &[Individual<G>],
    config: &Config,
    rng: &mut RandomNumberGenerator,
) -> Result<Vec<Individual<G>>> {
    if population.is_empty() {
        return Err(GeneticError::EmptyPopulation);
    }
    let size = population.len();
    let num_parents = size / 2;

    let mut pool: Vec<Individual<G>> = population.to_vec();
    let non_empty = pool
        .iter()
        .filter(|individual| !individual.genome().is_empty())
        .count();
    if non_empty < num_parents {
        debug!(
            non_empty,
            injected = num_parents - non_empty,
            "population degenerating, injecting random individuals"
        );
        for _ in non_empty..num_parents {
            pool.push(Individual::random(config, rng));
        }
    }

    let mut successors: Vec<Individual<G>> = Vec::with_capacity(size + 1);

    // Elitist pairing: the best of the top half crossed with their
    // counterparts in the bottom half.
    let elite_pairs = num_parents - num_parents / 10;
    for i in 0..elite_pairs {
        let children = pool[i].generate_children(&pool[num_parents + i], config, rng)?;
        successors.extend(children);
    }

    // Roulette wheel: fill the remaining slots proportionally to fitness.
    let total: f64 = population
        .iter()
        .filter_map(Individual::fitness)
        .sum();
    if total > 0.0 && successors.len() < size {
        let weights: Vec<f64> = pool[..size]
            .iter()
            .map(|individual| individual.fitness().unwrap_or(0.0).max(0.0))
            .collect();
        if let Ok(wheel) = WeightedIndex::new(&weights) {
            for _ in 0..size - successors.len() {
                let parent = &pool[wheel.sample(&mut rng.rng)];
                let mate = &pool[rng.rng.gen_range(0..pool.len())];
                successors.extend(parent.generate_children(mate, config, rng)?);
            }
        }
    }

    // Repair: top off with random top-half pairs, then trim to size.
    while successors.len() < size {
        let a = rng.rng.gen_range(0..num_parents.max(1));
        let b = rng.rng.gen_range(0..num_parents.max(1));
        let children = pool[a].generate_children(&pool[b], config, rng)?;
        successors.extend(children);
    }
    successors.truncate(size);
    Ok(successors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::{FitnessFunction, LevelEvaluator, Metrics, METRIC_NAMES};
    use crate::genome::DesignGenome;
    use crate::level::Level;

    struct ConstantEvaluator;

    impl LevelEvaluator for ConstantEvaluator {
        fn evaluate(&self, _level: &Level) -> Result<Metrics> {
            Ok(METRIC_NAMES
                .iter()
                .map(|name| (name.to_string(), 1.0))
                .collect())
        }
    }

    fn scored_population<G: Genome>(
        size: usize,
        empties: usize,
        config: &Config,
        rng: &mut RandomNumberGenerator,
    ) -> Vec<Individual<G>> {
        let fitness = FitnessFunction::new(ConstantEvaluator);
        let mut population: Vec<Individual<G>> = (0..size)
            .map(|i| {
                if i < empties {
                    Individual::empty(config)
                } else {
                    Individual::random(config, rng)
                }
            })
            .collect();
        for individual in &population {
            fitness.score(individual, config).unwrap();
        }
        population.sort_by(|a, b| {
            b.fitness()
                .unwrap_or(f64::NEG_INFINITY)
                .total_cmp(&a.fitness().unwrap_or(f64::NEG_INFINITY))
        });
        population
    }

    #[test]
    fn test_successors_preserve_size_for_design_genomes() {
        let config = Config::default();
        let mut rng = RandomNumberGenerator::from_seed(41);
        for size in 2..=12 {
            let population = scored_population::<DesignGenome>(size, 0, &config, &mut rng);
            let successors = generate_successors(&population, &config, &mut rng).unwrap();
            assert_eq!(successors.len(), size);
        }
    }

    #[test]
    fn test_successors_preserve_size_for_grid_genomes() {
        let config = Config::default();
        let mut rng = RandomNumberGenerator::from_seed(42);
        for size in 2..=8 {
            let population = scored_population::<Level>(size, 0, &config, &mut rng);
            let successors = generate_successors(&population, &config, &mut rng).unwrap();
            assert_eq!(successors.len(), size);
        }
    }

    #[test]
    fn test_majority_empty_population_recovers() {
        let config = Config::default();
        let mut rng = RandomNumberGenerator::from_seed(43);
        // Far more than half the genomes are empty
        let population = scored_population::<DesignGenome>(10, 8, &config, &mut rng);

        let successors = generate_successors(&population, &config, &mut rng).unwrap();
        assert_eq!(successors.len(), 10);
    }

    #[test]
    fn test_empty_population_is_an_error() {
        let config = Config::default();
        let mut rng = RandomNumberGenerator::from_seed(44);
        let population: Vec<Individual<DesignGenome>> = Vec::new();

        let result = generate_successors(&population, &config, &mut rng);
        assert!(matches!(result, Err(GeneticError::EmptyPopulation)));
    }

    #[test]
    fn test_successor_individuals_are_unscored() {
        let config = Config::default();
        let mut rng = RandomNumberGenerator::from_seed(45);
        let population = scored_population::<DesignGenome>(6, 0, &config, &mut rng);

        let successors = generate_successors(&population, &config, &mut rng).unwrap();
        for individual in &successors {
            assert_eq!(individual.fitness(), None);
        }
    }
}
