//! # Tiles and Levels
//!
//! The closed tile vocabulary shared by both genome representations, and the
//! `Level` grid those genomes materialize into. A `Level` is a fixed
//! `height x width` matrix of tiles, serializable as newline-terminated rows
//! of single-character symbols in top-to-bottom order.

use crate::config::LevelConfig;

/// One symbolic tile kind.
///
/// The first nine variants are generatable: random grid genomes may place
/// them anywhere and mutation may rewrite them. The last three are
/// structural markers (start position, goal flag, flagpole) that are stamped
/// by [`Level::base`] and never produced or touched by the genetic
/// operators.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    /// An empty space (`-`).
    Empty,
    /// A solid wall (`X`).
    Wall,
    /// A question-mark block holding a coin (`?`).
    CoinBlock,
    /// A question-mark block holding a powerup (`M`).
    PowerupBlock,
    /// A breakable block (`B`).
    Breakable,
    /// A free-standing coin (`o`).
    Coin,
    /// A pipe body segment (`|`).
    PipeBody,
    /// A pipe top cap (`T`).
    PipeTop,
    /// An enemy (`E`).
    Enemy,
    /// A goal flag tile (`f`). Structural, never generated.
    Flag,
    /// The flagpole top (`v`). Structural, never generated.
    Flagpole,
    /// The player start position (`m`). Structural, never generated.
    Start,
}

impl Tile {
    /// Tiles that random generation and mutation are allowed to place.
    pub const GENERATABLE: [Tile; 9] = [
        Tile::Empty,
        Tile::Wall,
        Tile::CoinBlock,
        Tile::PowerupBlock,
        Tile::Breakable,
        Tile::Coin,
        Tile::PipeBody,
        Tile::PipeTop,
        Tile::Enemy,
    ];

    /// Returns the single-character symbol used in the textual level format.
    pub fn symbol(self) -> char {
        match self {
            Tile::Empty => '-',
            Tile::Wall => 'X',
            Tile::CoinBlock => '?',
            Tile::PowerupBlock => 'M',
            Tile::Breakable => 'B',
            Tile::Coin => 'o',
            Tile::PipeBody => '|',
            Tile::PipeTop => 'T',
            Tile::Enemy => 'E',
            Tile::Flag => 'f',
            Tile::Flagpole => 'v',
            Tile::Start => 'm',
        }
    }

    /// Parses a tile from its symbol.
    pub fn from_symbol(symbol: char) -> Option<Tile> {
        let tile = match symbol {
            '-' => Tile::Empty,
            'X' => Tile::Wall,
            '?' => Tile::CoinBlock,
            'M' => Tile::PowerupBlock,
            'B' => Tile::Breakable,
            'o' => Tile::Coin,
            '|' => Tile::PipeBody,
            'T' => Tile::PipeTop,
            'E' => Tile::Enemy,
            'f' => Tile::Flag,
            'v' => Tile::Flagpole,
            'm' => Tile::Start,
            _ => return None,
        };
        Some(tile)
    }

    /// Returns true for the start/goal/flagpole markers that no operator may
    /// alter.
    pub fn is_structural(self) -> bool {
        matches!(self, Tile::Flag | Tile::Flagpole | Tile::Start)
    }
}

/// A rectangular grid of tiles.
///
/// Coordinates are `(x, y)` with `x` growing rightward across columns and
/// `y` growing downward across rows; row `height - 1` is the ground.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    width: usize,
    height: usize,
    rows: Vec<Vec<Tile>>,
}

impl Level {
    /// Creates a level with every cell set to `tile`.
    pub fn filled(config: &LevelConfig, tile: Tile) -> Self {
        Self {
            width: config.width(),
            height: config.height(),
            rows: vec![vec![tile; config.width()]; config.height()],
        }
    }

    /// Creates the structural baseline level: a solid ground row, the start
    /// marker, and the flagpole/goal column near the right edge. Everything
    /// both representations build on starts from this.
    pub fn base(config: &LevelConfig) -> Self {
        let mut level = Self::filled(config, Tile::Empty);
        level.stamp_structure(config);
        level
    }

    /// Writes the immutable structure (ground, start, goal column) over
    /// whatever is currently in the grid.
    pub(crate) fn stamp_structure(&mut self, config: &LevelConfig) {
        for x in 0..self.width {
            self.set(x, config.ground_row(), Tile::Wall);
        }
        self.set(config.start_col(), config.start_row(), Tile::Start);
        let flag_col = config.flag_col();
        self.set(flag_col, config.pole_row(), Tile::Flagpole);
        for y in config.pole_row() + 1..config.flag_base_row() {
            self.set(flag_col, y, Tile::Flag);
        }
        self.set(flag_col, config.flag_base_row(), Tile::Wall);
    }

    /// Returns the level width in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the level height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the tile at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    pub fn tile(&self, x: usize, y: usize) -> Tile {
        self.rows[y][x]
    }

    /// Sets the tile at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        self.rows[y][x] = tile;
    }

    /// Returns the rows in top-to-bottom order.
    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.rows
    }

    /// Counts occurrences of `tile` in the whole grid.
    pub fn count(&self, tile: Tile) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|&&t| t == tile).count())
            .sum()
    }

    /// Counts occurrences of `tile` in column `x`.
    pub fn count_in_column(&self, x: usize, tile: Tile) -> usize {
        self.rows.iter().filter(|row| row[x] == tile).count()
    }
}

impl std::fmt::Display for Level {
    /// Renders the level as `height` newline-terminated rows of `width`
    /// symbol characters each.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.rows {
            for tile in row {
                write!(f, "{}", tile.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LevelConfig {
        LevelConfig::new(200, 16).unwrap()
    }

    #[test]
    fn test_symbol_round_trip() {
        let all = [
            Tile::Empty,
            Tile::Wall,
            Tile::CoinBlock,
            Tile::PowerupBlock,
            Tile::Breakable,
            Tile::Coin,
            Tile::PipeBody,
            Tile::PipeTop,
            Tile::Enemy,
            Tile::Flag,
            Tile::Flagpole,
            Tile::Start,
        ];
        for tile in all {
            assert_eq!(Tile::from_symbol(tile.symbol()), Some(tile));
        }
        assert_eq!(Tile::from_symbol('z'), None);
    }

    #[test]
    fn test_base_structure() {
        let config = config();
        let level = Level::base(&config);

        // Unbroken ground row
        for x in 0..level.width() {
            assert_eq!(level.tile(x, config.ground_row()), Tile::Wall);
        }
        // Exactly one start marker, just above the ground in the first column
        assert_eq!(level.count(Tile::Start), 1);
        assert_eq!(level.tile(config.start_col(), config.start_row()), Tile::Start);
        // Flagpole top with a contiguous flag run below it
        assert_eq!(level.tile(config.flag_col(), config.pole_row()), Tile::Flagpole);
        for y in config.pole_row() + 1..config.flag_base_row() {
            assert_eq!(level.tile(config.flag_col(), y), Tile::Flag);
        }
        assert_eq!(level.tile(config.flag_col(), config.flag_base_row()), Tile::Wall);
    }

    #[test]
    fn test_display_shape() {
        let config = config();
        let rendered = Level::base(&config).to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), config.height());
        for line in &lines {
            assert_eq!(line.len(), config.width());
        }
        assert!(rendered.ends_with('\n'));
        // Ground row renders as a solid run of walls
        assert_eq!(lines[config.ground_row()], "X".repeat(config.width()));
    }

    #[test]
    fn test_counting() {
        let config = config();
        let mut level = Level::base(&config);
        assert_eq!(level.count(Tile::PipeTop), 0);

        level.set(5, 5, Tile::PipeTop);
        level.set(5, 6, Tile::PipeBody);
        level.set(9, 5, Tile::PipeTop);
        assert_eq!(level.count(Tile::PipeTop), 2);
        assert_eq!(level.count_in_column(5, Tile::PipeTop), 1);
        assert_eq!(level.count_in_column(5, Tile::PipeBody), 1);
    }
}
