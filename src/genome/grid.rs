//! # Grid Genome
//!
//! The dense representation: the genome *is* the level, a full tile matrix.
//! Mutation rewrites cells in place under spatial constraints that keep
//! levels traversable; crossover grafts pipes and brick clusters from the
//! fitter parent onto a copy of the first parent's grid.
//!
//! Probabilities scale with height so structures erode near the top of the
//! level and stay stable near the ground.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::Config;
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::level::{Level, Tile};
use crate::rng::RandomNumberGenerator;

/// Probability and weight tables for the grid representation.
///
/// The defaults reproduce the tuned values the operators were designed
/// around; every knob is part of the recognized configuration surface.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct GridParams {
    /// Chance to re-roll a block tile among the block kinds.
    pub block_reroll_chance: f64,
    /// Re-roll weights for breakable / coin-block / powerup-block.
    pub block_reroll_weights: [f64; 3],
    /// Chance to decorate an empty tile sitting on a wall or breakable.
    pub decorate_chance: f64,
    /// Decoration weights for coin / enemy.
    pub decorate_weights: [f64; 2],
    /// Chance to remove an existing coin or enemy.
    pub clear_decoration_chance: f64,
    /// Scale of the height-dependent chance to float a breakable into
    /// clear air (`scale - scale * (H - y) / H`).
    pub float_block_scale: f64,
    /// Chance to extend an existing breakable sideways into clear air.
    pub spread_block_chance: f64,
    /// Base chance to erode a breakable back to empty.
    pub erode_block_base: f64,
    /// Height-dependent part of the erosion chance
    /// (`base + scale * (H - y) / H`).
    pub erode_block_scale: f64,
    /// Chance to knock out a wall tile with nothing above it.
    pub knockout_chance: f64,
    /// Chance to also clear both flanking walls after a knockout.
    pub widen_knockout_chance: f64,
    /// Chance per eligible cell to attempt a pipe graft during crossover.
    pub pipe_chance: f64,
    /// Chance to take the lower-fitness parent's pipe instead of the
    /// higher-fitness parent's.
    pub pipe_steal_chance: f64,
    /// Maximum number of pipe caps a graft may grow the level to.
    pub pipe_max: usize,
    /// Height band (rows above ground) in which crossover grafts pipes and
    /// bricks.
    pub crossover_threshold: usize,
    /// Base chance to add a breakable at the threshold row; decays with the
    /// column's existing breakable density.
    pub brick_chance: f64,
    /// Chance to follow a placed brick with a satellite block 3-5 rows up.
    pub satellite_chance: f64,
    /// Chance to instead place a block laterally beside the brick.
    pub lateral_chance: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            block_reroll_chance: 0.2,
            block_reroll_weights: [0.7, 0.2, 0.1],
            decorate_chance: 0.03,
            decorate_weights: [0.7, 0.3],
            clear_decoration_chance: 0.01,
            float_block_scale: 0.01,
            spread_block_chance: 0.01,
            erode_block_base: 0.01,
            erode_block_scale: 0.04,
            knockout_chance: 0.02,
            widen_knockout_chance: 0.25,
            pipe_chance: 0.05,
            pipe_steal_chance: 0.20,
            pipe_max: 10,
            crossover_threshold: 5,
            brick_chance: 0.15,
            satellite_chance: 0.3,
            lateral_chance: 0.3,
        }
    }
}

impl GridParams {
    /// Checks that the weight tables can drive a weighted choice.
    pub fn validate(&self) -> Result<()> {
        for (name, weights) in [
            ("block_reroll_weights", &self.block_reroll_weights[..]),
            ("decorate_weights", &self.decorate_weights[..]),
        ] {
            let usable = weights.iter().all(|w| w.is_finite() && *w >= 0.0)
                && weights.iter().sum::<f64>() > 0.0;
            if !usable {
                return Err(GeneticError::Configuration(format!(
                    "{name} must be non-negative with a positive sum"
                )));
            }
        }
        Ok(())
    }
}

/// Mutates a grid genome cell by cell.
///
/// Columns `0` and `W - 1`, structural markers, and pipe tiles are never
/// touched. Cells are visited in a single top-to-bottom, left-to-right scan;
/// per cell, at most one rule of the rewrite group fires, then the erosion
/// group keys on whatever the cell now holds.
pub fn mutate(mut level: Level, config: &Config, rng: &mut RandomNumberGenerator) -> Level {
    let params = &config.grid;
    let width = level.width();
    let height = level.height();

    for y in 0..height {
        for x in 1..width - 1 {
            let tile = level.tile(x, y);
            if tile.is_structural() || matches!(tile, Tile::PipeTop | Tile::PipeBody) {
                continue;
            }
            // 0 at the ground row's depth, 1 at the top of the level
            let altitude = (height - y) as f64 / height as f64;

            if matches!(tile, Tile::Breakable | Tile::CoinBlock | Tile::PowerupBlock)
                && rng.chance(params.block_reroll_chance)
            {
                let choices = [
                    (Tile::Breakable, params.block_reroll_weights[0]),
                    (Tile::CoinBlock, params.block_reroll_weights[1]),
                    (Tile::PowerupBlock, params.block_reroll_weights[2]),
                ];
                level.set(x, y, weighted_pick(&choices, rng));
            } else if tile == Tile::Empty && rng.chance(params.decorate_chance) {
                if y + 1 < height && matches!(level.tile(x, y + 1), Tile::Breakable | Tile::Wall) {
                    let choices = [
                        (Tile::Coin, params.decorate_weights[0]),
                        (Tile::Enemy, params.decorate_weights[1]),
                    ];
                    level.set(x, y, weighted_pick(&choices, rng));
                }
            } else if matches!(tile, Tile::Coin | Tile::Enemy)
                && rng.chance(params.clear_decoration_chance)
            {
                level.set(x, y, Tile::Empty);
            } else if tile == Tile::Empty
                && rng.chance(params.float_block_scale - params.float_block_scale * altitude)
                && height - y > 4
                && clear_below(&level, x, y)
            {
                level.set(x, y, Tile::Breakable);
            } else if tile == Tile::Empty
                && rng.chance(params.spread_block_chance)
                && (level.tile(x + 1, y) == Tile::Breakable
                    || level.tile(x - 1, y) == Tile::Breakable)
                && clear_below(&level, x, y)
            {
                level.set(x, y, Tile::Breakable);
            }

            let tile = level.tile(x, y);
            if tile == Tile::Breakable
                && rng.chance(params.erode_block_base + params.erode_block_scale * altitude)
            {
                level.set(x, y, Tile::Empty);
            } else if tile == Tile::Wall
                && y > 0
                && level.tile(x, y - 1) == Tile::Empty
                && rng.chance(params.knockout_chance)
            {
                level.set(x, y, Tile::Empty);
                // Knock out the whole ledge when both flanks are interior walls
                if rng.chance(params.widen_knockout_chance)
                    && x > 1
                    && x + 1 < width - 1
                    && level.tile(x - 1, y) == Tile::Wall
                    && level.tile(x + 1, y) == Tile::Wall
                {
                    level.set(x - 1, y, Tile::Empty);
                    level.set(x + 1, y, Tile::Empty);
                }
            }
        }
    }
    level
}

/// Builds one child on a copy of `parent_a`'s grid, grafting pipes and
/// bricks from both parents, then mutates the result.
///
/// Both parents' fitness must already be known: the pipe rule donates from
/// the higher-fitness parent (with a configured chance to steal from the
/// lower one instead).
pub fn generate_child(
    parent_a: &Level,
    parent_b: &Level,
    fitness_a: f64,
    fitness_b: f64,
    config: &Config,
    rng: &mut RandomNumberGenerator,
) -> Level {
    let params = &config.grid;
    let width = parent_a.width();
    let height = parent_a.height();
    let mut child = parent_a.clone();

    for y in (1..height).rev() {
        for x in 1..width - 1 {
            let rows_above_ground = height - y;

            if rows_above_ground < params.crossover_threshold && rng.chance(params.pipe_chance) {
                let (high, low) = if fitness_a >= fitness_b {
                    (parent_a, parent_b)
                } else {
                    (parent_b, parent_a)
                };
                let donor = if rng.chance(params.pipe_steal_chance) {
                    low
                } else {
                    high
                };
                if donor.tile(x, y) == Tile::PipeTop
                    && shaft_clear(&child, x, y)
                    && child.count(Tile::PipeTop) < params.pipe_max
                {
                    child.set(x, y, Tile::PipeTop);
                    for dy in y + 1..height - 1 {
                        child.set(x, dy, Tile::PipeBody);
                    }
                }
            }

            if rows_above_ground == params.crossover_threshold
                && (parent_a.tile(x, y) == Tile::Breakable
                    || parent_b.tile(x, y) == Tile::Breakable)
            {
                let existing = child.count_in_column(x, Tile::Breakable) as f64;
                let chance =
                    params.brick_chance - params.brick_chance * (2.0 * existing / width as f64);
                if rng.chance(chance) {
                    child.set(x, y, Tile::Breakable);
                    if rng.chance(params.satellite_chance) {
                        let dx = random_side(rng);
                        let dy = rng.rng.gen_range(3..=5);
                        let nx = clamp_index(x as i32 + dx, 1, width as i32 - 2);
                        let ny = clamp_index(y as i32 - dy, 0, height as i32 - 1);
                        if child.tile(nx, ny) == Tile::Empty {
                            child.set(nx, ny, Tile::Breakable);
                        }
                    } else if rng.chance(params.lateral_chance) {
                        let nx = clamp_index(x as i32 + random_side(rng), 1, width as i32 - 2);
                        if child.tile(nx, y) == Tile::Empty {
                            child.set(nx, y, Tile::Breakable);
                        }
                    }
                }
            }

            // Structural markers always come through verbatim
            let own = parent_a.tile(x, y);
            if own.is_structural() {
                child.set(x, y, own);
            }
        }
    }

    mutate(child, config, rng)
}

impl Genome for Level {
    fn random(config: &Config, rng: &mut RandomNumberGenerator) -> Self {
        let mut level = Level::filled(&config.level, Tile::Empty);
        for y in 0..level.height() {
            for x in 0..level.width() {
                if let Some(&tile) = Tile::GENERATABLE.choose(&mut rng.rng) {
                    level.set(x, y, tile);
                }
            }
        }
        level.stamp_structure(&config.level);
        level
    }

    fn empty(config: &Config) -> Self {
        Level::base(&config.level)
    }

    fn is_empty(&self) -> bool {
        // A grid genome always carries a full tile matrix
        false
    }

    fn mutate(self, config: &Config, rng: &mut RandomNumberGenerator) -> Self {
        mutate(self, config, rng)
    }

    fn generate_children(
        &self,
        other: &Self,
        fitness: (Option<f64>, Option<f64>),
        config: &Config,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Self>> {
        let fitness_a = fitness.0.ok_or(GeneticError::UnscoredIndividual)?;
        let fitness_b = fitness.1.ok_or(GeneticError::UnscoredIndividual)?;
        Ok(vec![generate_child(
            self, other, fitness_a, fitness_b, config, rng,
        )])
    }

    fn materialize(&self, _config: &Config) -> Level {
        self.clone()
    }
}

/// True when the cell below `(x, y)` and its diagonal neighbors are empty,
/// leaving headroom for a floated block.
fn clear_below(level: &Level, x: usize, y: usize) -> bool {
    y + 1 < level.height()
        && level.tile(x, y + 1) == Tile::Empty
        && level.tile(x - 1, y + 1) == Tile::Empty
        && level.tile(x + 1, y + 1) == Tile::Empty
}

/// True when the destination shaft below a prospective pipe cap is empty
/// across the cap column and both flanks, down to the row above ground.
fn shaft_clear(level: &Level, x: usize, y: usize) -> bool {
    let height = level.height();
    (y + 2..height - 1).all(|dy| {
        level.tile(x, dy) == Tile::Empty
            && level.tile(x - 1, dy) == Tile::Empty
            && level.tile(x + 1, dy) == Tile::Empty
    })
}

fn weighted_pick(choices: &[(Tile, f64)], rng: &mut RandomNumberGenerator) -> Tile {
    match choices.choose_weighted(&mut rng.rng, |&(_, weight)| weight) {
        Ok(&(tile, _)) => tile,
        // Unusable weight tables degrade to the first option
        Err(_) => choices[0].0,
    }
}

fn random_side(rng: &mut RandomNumberGenerator) -> i32 {
    if rng.rng.gen_bool(0.5) {
        -1
    } else {
        1
    }
}

fn clamp_index(value: i32, min: i32, max: i32) -> usize {
    value.clamp(min, max) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::Individual;

    fn config() -> Config {
        Config::default()
    }

    fn protected_cells(level: &Level) -> Vec<(usize, usize, Tile)> {
        let mut cells = Vec::new();
        for y in 0..level.height() {
            for x in 0..level.width() {
                let tile = level.tile(x, y);
                if tile.is_structural() || x == 0 || x == level.width() - 1 {
                    cells.push((x, y, tile));
                }
            }
        }
        cells
    }

    #[test]
    fn test_mutation_preserves_protected_cells() {
        let config = config();
        let mut rng = RandomNumberGenerator::from_seed(11);
        let mut level = Level::random(&config, &mut rng);
        let protected = protected_cells(&level);

        for _ in 0..10 {
            level = mutate(level, &config, &mut rng);
        }
        for (x, y, tile) in protected {
            assert_eq!(level.tile(x, y), tile, "cell ({x}, {y}) was altered");
        }
    }

    #[test]
    fn test_mutation_is_deterministic_for_a_seed() {
        let config = config();
        let mut rng1 = RandomNumberGenerator::from_seed(12);
        let mut rng2 = RandomNumberGenerator::from_seed(12);
        let level1 = Level::random(&config, &mut rng1);
        let level2 = Level::random(&config, &mut rng2);

        assert_eq!(
            mutate(level1, &config, &mut rng1),
            mutate(level2, &config, &mut rng2)
        );
    }

    #[test]
    fn test_crossover_preserves_protected_cells() {
        let config = config();
        let mut rng = RandomNumberGenerator::from_seed(13);
        let parent_a = Level::random(&config, &mut rng);
        let parent_b = Level::random(&config, &mut rng);
        let protected = protected_cells(&parent_a);

        let child = generate_child(&parent_a, &parent_b, 2.0, 1.0, &config, &mut rng);
        for (x, y, tile) in protected {
            if tile.is_structural() || x == 0 || x == parent_a.width() - 1 {
                assert_eq!(child.tile(x, y), tile, "cell ({x}, {y}) was altered");
            }
        }
    }

    #[test]
    fn test_pipe_graft_contiguous_and_capped() {
        let config = config();
        let mut rng = RandomNumberGenerator::from_seed(14);
        let height = config.level.height();

        // Base child plus a donor parent bristling with eligible pipe caps
        let parent_a = Level::base(&config.level);
        let mut parent_b = Level::base(&config.level);
        let cap_row = height - 4;
        for x in 1..parent_b.width() - 1 {
            parent_b.set(x, cap_row, Tile::PipeTop);
        }

        let child = generate_child(&parent_a, &parent_b, 1.0, 5.0, &config, &mut rng);

        let caps = child.count(Tile::PipeTop);
        assert!(caps > 0, "expected at least one grafted pipe");
        assert!(caps <= config.grid.pipe_max);

        for x in 0..child.width() {
            for y in 0..child.height() {
                if child.tile(x, y) == Tile::PipeTop {
                    // Full body from the cap down to one row above ground
                    for dy in y + 1..height - 1 {
                        assert_eq!(child.tile(x, dy), Tile::PipeBody);
                    }
                }
            }
        }
    }

    #[test]
    fn test_crossover_requires_scored_parents() {
        let config = config();
        let mut rng = RandomNumberGenerator::from_seed(15);
        let a: Individual<Level> = Individual::random(&config, &mut rng);
        let b: Individual<Level> = Individual::random(&config, &mut rng);

        let result = a.generate_children(&b, &config, &mut rng);
        assert!(matches!(result, Err(GeneticError::UnscoredIndividual)));

        a.cache_fitness(1.0);
        b.cache_fitness(2.0);
        let children = a.generate_children(&b, &config, &mut rng).unwrap();
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn test_random_grid_keeps_structure() {
        let config = config();
        let mut rng = RandomNumberGenerator::from_seed(16);
        let level = Level::random(&config, &mut rng);

        assert_eq!(level.count(Tile::Start), 1);
        assert_eq!(level.count(Tile::Flagpole), 1);
        for x in 0..level.width() {
            assert_eq!(level.tile(x, config.level.ground_row()), Tile::Wall);
        }
    }
}
