//! # Evolution
//!
//! The generational driver and its configuration options.

pub mod driver;
pub mod options;

pub use driver::EvolutionDriver;
pub use options::{EvolutionOptions, EvolutionOptionsBuilder};
