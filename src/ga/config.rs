//! GA configuration.

use super::selection::Selection;
use crate::error::{PlanError, Result};

/// Parameters of the evolutionary loop.
///
/// # Defaults
///
/// ```
/// use u_routeplan::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.elite_count, 2);
/// assert_eq!(config.selection, Selection::Truncation(10));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_routeplan::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(60)
///     .with_max_generations(250)
///     .with_mutation_rate(0.2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals per generation.
    pub population_size: usize,

    /// Number of generations to run.
    pub max_generations: usize,

    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,

    /// Probability of mutating each child (0.0–1.0).
    pub mutation_rate: f64,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Evaluate children in parallel (requires feature `parallel`).
    pub parallel: bool,

    /// Optional wall-clock limit in milliseconds, checked between generations.
    pub time_limit_ms: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            elite_count: 2,
            mutation_rate: 0.1,
            selection: Selection::default(),
            parallel: false,
            time_limit_ms: None,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the mutation rate, clamped into `[0, 1]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(PlanError::InvalidConfig("population_size must be at least 2".into()));
        }
        if self.elite_count > self.population_size {
            return Err(PlanError::InvalidConfig(
                "elite_count cannot exceed population_size".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(PlanError::InvalidConfig("mutation_rate must be within [0, 1]".into()));
        }
        if self.time_limit_ms == Some(0) {
            return Err(PlanError::InvalidConfig("time_limit_ms must be positive or None".into()));
        }
        self.selection.validate()
    }
}
