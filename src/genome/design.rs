//! # Design-Element Genome
//!
//! The sparse representation: an ordered multiset of typed, parameterized
//! placement records (holes, platforms, enemies, coins, blocks,
//! question-blocks, stairs, pipes) compiled into a level on demand.
//!
//! The multiset is kept sorted by the composite key `(x, type tag, remaining
//! parameters)` so that compilation order, and therefore the compiled level,
//! is deterministic for a given multiset regardless of insertion order.
//! Later elements in that order win at overlapping cells.
//!
//! Element coordinates are signed: mutation jitter may push a record past
//! the playfield, and compilation clamps every write back into bounds
//! instead of rejecting the record.

use rand::Rng;

use crate::config::Config;
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::level::{Level, Tile};
use crate::rng::RandomNumberGenerator;

/// Material a platform is built from.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Material {
    /// Question-mark coin blocks (`?`).
    CoinBlock,
    /// Solid walls (`X`).
    Wall,
    /// Breakable blocks (`B`).
    Breakable,
}

impl Material {
    const ALL: [Material; 3] = [Material::CoinBlock, Material::Wall, Material::Breakable];

    fn tile(self) -> Tile {
        match self {
            Material::CoinBlock => Tile::CoinBlock,
            Material::Wall => Tile::Wall,
            Material::Breakable => Tile::Breakable,
        }
    }
}

/// Slope direction of a staircase.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StairDirection {
    /// Columns shrink left to right (direction `-1`).
    Descending,
    /// Columns grow left to right (direction `+1`).
    Ascending,
}

impl StairDirection {
    fn flipped(self) -> Self {
        match self {
            StairDirection::Descending => StairDirection::Ascending,
            StairDirection::Ascending => StairDirection::Descending,
        }
    }
}

/// One typed, parameterized level feature.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignElement {
    /// A gap punched into the ground at columns `[x, x + width)`.
    Hole { x: i32, width: i32 },
    /// A horizontal strip of one material at `height` rows above ground.
    Platform {
        x: i32,
        width: i32,
        height: i32,
        material: Material,
    },
    /// A single enemy walking the ground.
    Enemy { x: i32 },
    /// A single free-standing coin.
    Coin { x: i32, y: i32 },
    /// A wall or breakable block.
    Block { x: i32, y: i32, breakable: bool },
    /// A question-block, with or without a powerup.
    QuestionBlock { x: i32, y: i32, powerup: bool },
    /// An ascending or descending staircase of wall blocks.
    Stairs {
        x: i32,
        height: i32,
        direction: StairDirection,
    },
    /// A vertical pipe with a top cap.
    Pipe { x: i32, height: i32 },
}

impl DesignElement {
    /// The element's column anchor.
    pub fn x(&self) -> i32 {
        match *self {
            DesignElement::Hole { x, .. }
            | DesignElement::Platform { x, .. }
            | DesignElement::Enemy { x }
            | DesignElement::Coin { x, .. }
            | DesignElement::Block { x, .. }
            | DesignElement::QuestionBlock { x, .. }
            | DesignElement::Stairs { x, .. }
            | DesignElement::Pipe { x, .. } => x,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            DesignElement::Hole { .. } => 0,
            DesignElement::Platform { .. } => 1,
            DesignElement::Enemy { .. } => 2,
            DesignElement::Coin { .. } => 3,
            DesignElement::Block { .. } => 4,
            DesignElement::QuestionBlock { .. } => 5,
            DesignElement::Stairs { .. } => 6,
            DesignElement::Pipe { .. } => 7,
        }
    }

    /// The composite ordering key: x, then type tag, then the remaining
    /// parameters.
    fn sort_key(&self) -> (i32, u8, i32, i32, i32) {
        let (a, b, c) = match *self {
            DesignElement::Hole { width, .. } => (width, 0, 0),
            DesignElement::Platform {
                width,
                height,
                material,
                ..
            } => (width, height, material as i32),
            DesignElement::Enemy { .. } => (0, 0, 0),
            DesignElement::Coin { y, .. } => (y, 0, 0),
            DesignElement::Block { y, breakable, .. } => (y, i32::from(breakable), 0),
            DesignElement::QuestionBlock { y, powerup, .. } => (y, i32::from(powerup), 0),
            DesignElement::Stairs {
                height, direction, ..
            } => (height, direction as i32, 0),
            DesignElement::Pipe { height, .. } => (height, 0, 0),
        };
        (self.x(), self.tag(), a, b, c)
    }

    /// Draws a uniformly random element with parameters in their generation
    /// ranges.
    pub fn random(config: &Config, rng: &mut RandomNumberGenerator) -> Self {
        let width = config.level.width() as i32;
        let height = config.level.height() as i32;
        let x = rng.rng.gen_range(1..=width - 2);
        match rng.rng.gen_range(0..8) {
            0 => DesignElement::Hole {
                x,
                width: rng.rng.gen_range(1..=3),
            },
            1 => DesignElement::Platform {
                x,
                width: rng.rng.gen_range(2..=6),
                height: rng.rng.gen_range(0..=height - 4),
                material: random_material(rng),
            },
            2 => DesignElement::Enemy { x },
            3 => DesignElement::Coin {
                x,
                y: rng.rng.gen_range(4..=height - 4),
            },
            4 => DesignElement::Block {
                x,
                y: rng.rng.gen_range(4..=height - 5),
                breakable: true,
            },
            5 => DesignElement::QuestionBlock {
                x,
                y: rng.rng.gen_range(4..=height - 5),
                powerup: rng.rng.gen_bool(0.5),
            },
            6 => DesignElement::Stairs {
                x,
                height: rng.rng.gen_range(3..=6),
                direction: random_direction(rng),
            },
            _ => DesignElement::Pipe {
                x,
                height: rng.rng.gen_range(1..=4),
            },
        }
    }
}

impl Ord for DesignElement {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for DesignElement {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Probability tables for the design-element representation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct DesignParams {
    /// Chance that mutation perturbs one element (else the genome passes
    /// through unchanged).
    pub mutation_chance: f64,
    /// Minimum element count of a random genome.
    pub min_elements: usize,
    /// Maximum element count of a random genome.
    pub max_elements: usize,
    /// Stair elements beyond this count incur the aesthetic penalty.
    pub max_stairs: usize,
    /// Fitness penalty subtracted when the stair budget is exceeded.
    pub stair_penalty: f64,
}

impl Default for DesignParams {
    fn default() -> Self {
        Self {
            mutation_chance: 0.1,
            min_elements: 20,
            max_elements: 60,
            max_stairs: 5,
            stair_penalty: 2.0,
        }
    }
}

impl DesignParams {
    /// Checks the element-count bounds.
    pub fn validate(&self) -> Result<()> {
        if self.min_elements == 0 || self.min_elements > self.max_elements {
            return Err(GeneticError::Configuration(format!(
                "element count bounds {}..={} are unusable",
                self.min_elements, self.max_elements
            )));
        }
        Ok(())
    }
}

/// The sparse genome: a sorted multiset of design elements.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignGenome {
    elements: Vec<DesignElement>,
}

impl DesignGenome {
    /// Builds a genome from elements in any order; the sorted invariant is
    /// established here.
    pub fn new(mut elements: Vec<DesignElement>) -> Self {
        elements.sort();
        Self { elements }
    }

    /// The elements in compilation order.
    pub fn elements(&self) -> &[DesignElement] {
        &self.elements
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the genome has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn compile(&self, config: &Config) -> Level {
        let mut level = Level::base(&config.level);
        let width = config.level.width() as i32;
        let height = config.level.height() as i32;
        let col = |x: i32| x.clamp(1, width - 2) as usize;
        let row = |y: i32| y.clamp(0, height - 1) as usize;

        for element in &self.elements {
            match *element {
                DesignElement::Hole { x, width: w } => {
                    for dx in 0..w {
                        level.set(col(x + dx), (height - 1) as usize, Tile::Empty);
                    }
                }
                DesignElement::Platform {
                    x,
                    width: w,
                    height: h,
                    material,
                } => {
                    for dx in 0..w {
                        level.set(col(x + dx), row(height - h - 1), material.tile());
                    }
                }
                DesignElement::Enemy { x } => {
                    level.set(col(x), (height - 2) as usize, Tile::Enemy);
                }
                DesignElement::Coin { x, y } => {
                    level.set(col(x), row(y), Tile::Coin);
                }
                DesignElement::Block { x, y, breakable } => {
                    let tile = if breakable { Tile::Breakable } else { Tile::Wall };
                    level.set(col(x), row(y), tile);
                }
                DesignElement::QuestionBlock { x, y, powerup } => {
                    let tile = if powerup {
                        Tile::PowerupBlock
                    } else {
                        Tile::CoinBlock
                    };
                    level.set(col(x), row(y), tile);
                }
                DesignElement::Stairs {
                    x,
                    height: h,
                    direction,
                } => {
                    for dx in 1..=h {
                        let column_height = match direction {
                            StairDirection::Ascending => dx,
                            StairDirection::Descending => h - dx,
                        };
                        for dy in 0..column_height {
                            level.set(col(x + dx), row(height - dy - 1), Tile::Wall);
                        }
                    }
                }
                DesignElement::Pipe { x, height: h } => {
                    level.set(col(x), row(height - h - 1), Tile::PipeTop);
                    for y in (height - h).max(0)..height {
                        level.set(col(x), row(y), Tile::PipeBody);
                    }
                }
            }
        }
        level
    }
}

/// Perturbs one element of `elements` with the configured chance, then
/// restores the sorted invariant.
///
/// Exactly one parameter of the chosen element changes, picked by a single
/// uniform draw split across per-type buckets; positions jitter by a
/// Gaussian offset clamped to their valid ranges.
pub fn mutate_elements(
    elements: &mut Vec<DesignElement>,
    config: &Config,
    rng: &mut RandomNumberGenerator,
) {
    if elements.is_empty() || !rng.chance(config.design.mutation_chance) {
        return;
    }
    let index = rng.rng.gen_range(0..elements.len());
    let element = elements.remove(index);
    elements.push(perturb(element, config, rng));
    elements.sort();
}

fn perturb(
    element: DesignElement,
    config: &Config,
    rng: &mut RandomNumberGenerator,
) -> DesignElement {
    let width = config.level.width() as f64;
    let height = config.level.height() as f64;
    let max_col = config.level.width() as i32 - 2;
    let max_row = |offset: i32| config.level.height() as i32 - offset;
    let choice = rng.uniform();

    match element {
        DesignElement::Block {
            mut x,
            mut y,
            mut breakable,
        } => {
            if choice < 0.3 {
                x = offset_by_upto(rng, x, width / 8.0, 1, max_col);
            } else if choice < 0.6 {
                y = offset_by_upto(rng, y, 2.0, 5, max_row(6));
            } else {
                breakable = !breakable;
            }
            // Extra nudge to spread block clusters out
            if rng.chance(0.5) {
                x += random_side(rng);
            }
            DesignElement::Block { x, y, breakable }
        }
        DesignElement::QuestionBlock {
            mut x,
            mut y,
            mut powerup,
        } => {
            if choice < 0.4 {
                x = offset_by_upto(rng, x, width / 8.0, 1, max_col);
            } else if choice < 0.7 {
                y = offset_by_upto(rng, y, height / 5.0, 2, max_row(6));
            } else {
                powerup = !powerup;
            }
            DesignElement::QuestionBlock { x, y, powerup }
        }
        DesignElement::Coin { mut x, mut y } => {
            if choice < 0.5 {
                x = offset_by_upto(rng, x, width / 8.0, 1, max_col);
            } else {
                y = offset_by_upto(rng, y, height / 2.0, 2, max_row(3));
            }
            DesignElement::Coin { x, y }
        }
        DesignElement::Pipe { mut x, mut height } => {
            if choice < 0.5 {
                x = offset_by_upto(rng, x, width / 8.0, 1, max_col);
            } else {
                height = offset_by_upto(rng, height, 1.0, 2, 4);
            }
            DesignElement::Pipe { x, height }
        }
        DesignElement::Hole { mut x, width: mut w } => {
            if choice < 0.5 {
                x = offset_by_upto(rng, x, width / 3.0, 1, max_col);
            } else {
                w = offset_by_upto(rng, w, 1.0, 1, 3);
            }
            // Keep gaps from clustering into one long pit
            if rng.chance(0.5) {
                x += 3 * random_side(rng);
            }
            DesignElement::Hole { x, width: w }
        }
        DesignElement::Stairs {
            mut x,
            mut height,
            mut direction,
        } => {
            if choice < 0.3 {
                x = offset_by_upto(rng, x, width / 8.0, 1, max_col);
            } else if choice < 0.6 {
                height = offset_by_upto(rng, height, 3.0, 3, max_row(4));
            } else {
                direction = direction.flipped();
            }
            DesignElement::Stairs {
                x,
                height,
                direction,
            }
        }
        DesignElement::Platform {
            mut x,
            width: mut w,
            height: mut h,
            mut material,
        } => {
            if choice < 0.25 {
                x = offset_by_upto(rng, x, width / 8.0, 1, max_col);
            } else if choice < 0.5 {
                w = offset_by_upto(rng, w, 8.0, 2, config.level.width() as i32 / 6);
            } else if choice < 0.75 {
                h = offset_by_upto(rng, h, height / 3.0, 3, max_row(4));
            } else {
                material = random_material(rng);
            }
            DesignElement::Platform {
                x,
                width: w,
                height: h,
                material,
            }
        }
        DesignElement::Enemy { x } => DesignElement::Enemy {
            x: offset_by_upto(rng, x, width / 8.0, 1, max_col),
        },
    }
}

impl Genome for DesignGenome {
    fn random(config: &Config, rng: &mut RandomNumberGenerator) -> Self {
        let count = rng
            .rng
            .gen_range(config.design.min_elements..=config.design.max_elements);
        Self::new(
            (0..count)
                .map(|_| DesignElement::random(config, rng))
                .collect(),
        )
    }

    fn empty(_config: &Config) -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn mutate(mut self, config: &Config, rng: &mut RandomNumberGenerator) -> Self {
        mutate_elements(&mut self.elements, config, rng);
        self
    }

    fn generate_children(
        &self,
        other: &Self,
        _fitness: (Option<f64>, Option<f64>),
        config: &Config,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Self>> {
        // Crossover with an empty genome is meaningless; replace it
        if self.is_empty() || other.is_empty() {
            return Ok(vec![Self::random(config, rng)]);
        }

        let cut_a = rng.rng.gen_range(0..self.elements.len());
        let cut_b = rng.rng.gen_range(0..other.elements.len());

        let mut child_a: Vec<DesignElement> = self.elements[..cut_a]
            .iter()
            .chain(&other.elements[cut_b..])
            .copied()
            .collect();
        let mut child_b: Vec<DesignElement> = other.elements[..cut_b]
            .iter()
            .chain(&self.elements[cut_a..])
            .copied()
            .collect();

        mutate_elements(&mut child_a, config, rng);
        mutate_elements(&mut child_b, config, rng);
        Ok(vec![Self::new(child_a), Self::new(child_b)])
    }

    fn materialize(&self, config: &Config) -> Level {
        self.compile(config)
    }

    fn penalty(&self, config: &Config) -> f64 {
        let stairs = self
            .elements
            .iter()
            .filter(|element| matches!(element, DesignElement::Stairs { .. }))
            .count();
        if stairs > config.design.max_stairs {
            -config.design.stair_penalty
        } else {
            0.0
        }
    }
}

/// Jitters `value` by a Gaussian offset with the given variance, clamps into
/// `[min, max]`, and truncates toward zero.
fn offset_by_upto(
    rng: &mut RandomNumberGenerator,
    value: i32,
    variance: f64,
    min: i32,
    max: i32,
) -> i32 {
    let jittered = f64::from(value) + rng.standard_normal() * variance.sqrt();
    jittered.clamp(f64::from(min), f64::from(max)) as i32
}

fn random_material(rng: &mut RandomNumberGenerator) -> Material {
    Material::ALL[rng.rng.gen_range(0..Material::ALL.len())]
}

fn random_direction(rng: &mut RandomNumberGenerator) -> StairDirection {
    if rng.rng.gen_bool(0.5) {
        StairDirection::Descending
    } else {
        StairDirection::Ascending
    }
}

fn random_side(rng: &mut RandomNumberGenerator) -> i32 {
    if rng.rng.gen_bool(0.5) {
        -1
    } else {
        1
    }
}
