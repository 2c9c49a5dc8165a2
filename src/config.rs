//! # Configuration
//!
//! One immutable configuration value shared by every component. Components
//! receive it explicitly at their call sites instead of reading ambient
//! globals, so two evolutions with different footprints can coexist in one
//! process.
//!
//! ## Example
//!
//! ```rust
//! use levolve::config::{Config, LevelConfig};
//!
//! let config = Config {
//!     level: LevelConfig::new(200, 16).unwrap(),
//!     ..Config::default()
//! };
//! assert_eq!(config.level.ground_row(), 15);
//! ```

use crate::error::{GeneticError, Result};
use crate::genome::design::DesignParams;
use crate::genome::grid::GridParams;

/// The fixed level footprint plus the structural rows and columns derived
/// from it.
///
/// Construction validates the dimensions so every derived index is
/// guaranteed to land on the grid; undersized footprints are a fatal
/// [`GeneticError::Configuration`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelConfig {
    width: usize,
    height: usize,
}

impl LevelConfig {
    /// Minimum supported level width in columns.
    pub const MIN_WIDTH: usize = 16;
    /// Minimum supported level height in rows.
    pub const MIN_HEIGHT: usize = 12;

    /// Creates a validated level footprint.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] when either dimension is
    /// below the supported minimum.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width < Self::MIN_WIDTH || height < Self::MIN_HEIGHT {
            return Err(GeneticError::Configuration(format!(
                "level footprint {}x{} is below the minimum {}x{}",
                width,
                height,
                Self::MIN_WIDTH,
                Self::MIN_HEIGHT
            )));
        }
        Ok(Self { width, height })
    }

    /// Level width in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Level height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The ground row (bottom of the grid).
    pub fn ground_row(&self) -> usize {
        self.height - 1
    }

    /// Column of the player start marker.
    pub fn start_col(&self) -> usize {
        0
    }

    /// Row of the player start marker, just above the ground.
    pub fn start_row(&self) -> usize {
        self.height - 2
    }

    /// Column of the goal flag and flagpole, one in from the right edge.
    pub fn flag_col(&self) -> usize {
        self.width - 2
    }

    /// Row of the flagpole top.
    pub fn pole_row(&self) -> usize {
        self.height - 9
    }

    /// Row of the wall block the flag run stands on.
    pub fn flag_base_row(&self) -> usize {
        self.height - 2
    }
}

impl Default for LevelConfig {
    /// The classic 200x16 footprint.
    fn default() -> Self {
        Self {
            width: 200,
            height: 16,
        }
    }
}

/// Aggregate configuration for an evolution run: the level footprint plus
/// the probability/weight tables of both genome representations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Level footprint and structural geometry.
    pub level: LevelConfig,
    /// Grid-representation mutation and crossover tables.
    pub grid: GridParams,
    /// Design-element-representation tables.
    pub design: DesignParams,
}

impl Config {
    /// Validates the parameter tables.
    ///
    /// The level footprint is validated at construction; this checks the
    /// pieces that can be freely edited after the fact.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] for weight tables that cannot
    /// drive a weighted choice or inverted element-count bounds.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.design.validate()
    }
}
