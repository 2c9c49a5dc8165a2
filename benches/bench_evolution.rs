use criterion::{criterion_group, criterion_main, Criterion};
use levolve::config::Config;
use levolve::evolution::{EvolutionDriver, EvolutionOptions};
use levolve::fitness::{FitnessFunction, LevelEvaluator, Metrics, METRIC_NAMES};
use levolve::genome::DesignGenome;
use levolve::level::Level;
use levolve::rng::RandomNumberGenerator;

// Cheap stand-in for the real evaluator so the benchmark measures the
// engine, not the solver
struct ConstantEvaluator;

impl LevelEvaluator for ConstantEvaluator {
    fn evaluate(&self, _level: &Level) -> levolve::Result<Metrics> {
        Ok(METRIC_NAMES
            .iter()
            .map(|name| (name.to_string(), 1.0))
            .collect())
    }
}

fn bench_design_evolution(c: &mut Criterion) {
    let options = EvolutionOptions::builder()
        .population_size(32)
        .num_generations(2)
        .num_workers(2)
        .build();

    c.bench_function("design_evolution_32x2", |b| {
        b.iter(|| {
            let driver: EvolutionDriver<DesignGenome, _> = EvolutionDriver::new(
                Config::default(),
                options.clone(),
                FitnessFunction::new(ConstantEvaluator),
            )
            .unwrap();
            let mut rng = RandomNumberGenerator::from_seed(1);
            driver.run(&mut rng).unwrap()
        })
    });
}

fn bench_grid_evolution(c: &mut Criterion) {
    let options = EvolutionOptions::builder()
        .population_size(16)
        .num_generations(2)
        .num_workers(2)
        .build();

    c.bench_function("grid_evolution_16x2", |b| {
        b.iter(|| {
            let driver: EvolutionDriver<Level, _> = EvolutionDriver::new(
                Config::default(),
                options.clone(),
                FitnessFunction::new(ConstantEvaluator),
            )
            .unwrap();
            let mut rng = RandomNumberGenerator::from_seed(2);
            driver.run(&mut rng).unwrap()
        })
    });
}

criterion_group!(benches, bench_design_evolution, bench_grid_evolution);
criterion_main!(benches);
