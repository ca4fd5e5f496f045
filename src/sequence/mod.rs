//! SequenceOptimizer: visiting order for one load.
//!
//! A load's stops plus the depot form a closed tour. The default strategy
//! searches tours with the [`ga`](crate::ga) engine: random initial
//! permutations, two elites per generation, parents drawn from the ten best,
//! order crossover and swap mutation. A deterministic nearest-neighbour +
//! 2-opt strategy is available for quick answers.
//!
//! The search draws every random decision from a caller-supplied `Rng`;
//! independent loads can be sequenced concurrently, each with its own
//! generator.

mod config;
pub mod local_search;
mod problem;
mod runner;

pub use config::{SequenceConfig, SequenceStrategy};
pub use problem::{Tour, TourProblem};
pub use runner::{LoadSequence, SequenceOptimizer, SequenceResult};
