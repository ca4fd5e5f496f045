//! Genetic Algorithm framework.
//!
//! A generic GA built on trait-based abstractions. A problem implements
//! [`GaProblem`] to say how individuals are created, evaluated, recombined
//! and mutated; [`GaRunner`] owns the loop.
//!
//! Each generation keeps `elite_count` individuals unchanged and fills the
//! rest with children of parents drawn by [`Selection`].
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
pub mod operators;
mod runner;
mod selection;
mod types;

pub use config::GaConfig;
pub use runner::{GaResult, GaRunner};
pub use selection::Selection;
pub use types::{Fitness, GaProblem, Individual};
