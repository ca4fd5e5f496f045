//! SequenceOptimizer configuration.

use crate::error::{PlanError, Result};
use crate::ga::{GaConfig, Selection};

/// How a load's visiting order is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SequenceStrategy {
    /// Genetic search over closed tours.
    #[default]
    Genetic,
    /// Nearest-neighbour construction from the depot, then 2-opt.
    /// Deterministic and ignores the GA parameters.
    NearestNeighborTwoOpt,
}

/// Parameters for [`SequenceOptimizer`](super::SequenceOptimizer).
///
/// # Presets
///
/// ```
/// use u_routeplan::sequence::SequenceConfig;
///
/// let fast = SequenceConfig::fast();
/// let quality = SequenceConfig::quality();
/// assert!(fast.generations < quality.generations);
///
/// // sized for a 40-stop load
/// let auto = SequenceConfig::auto_select(40);
/// assert!(auto.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceConfig {
    pub strategy: SequenceStrategy,

    /// Population size `N`.
    pub population_size: usize,

    /// Generation count `G`.
    pub generations: usize,

    /// Probability `m` of a swap mutation per child.
    pub mutation_rate: f64,

    /// Tours copied unchanged into each generation.
    pub elite_count: usize,

    /// Parents are drawn uniformly from this many best tours.
    pub parent_pool: usize,

    /// Evaluate children in parallel (feature `parallel`).
    pub parallel: bool,

    /// Optional wall-clock limit per load, in milliseconds.
    pub time_limit_ms: Option<u64>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self::balanced()
    }
}

impl SequenceConfig {
    /// Small population, few generations. For previews.
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            generations: 150,
            ..Self::balanced()
        }
    }

    pub fn balanced() -> Self {
        Self {
            strategy: SequenceStrategy::Genetic,
            population_size: 100,
            generations: 500,
            mutation_rate: 0.1,
            elite_count: 2,
            parent_pool: 10,
            parallel: false,
            time_limit_ms: None,
        }
    }

    pub fn quality() -> Self {
        Self {
            population_size: 200,
            generations: 1500,
            mutation_rate: 0.15,
            ..Self::balanced()
        }
    }

    /// Picks a preset from the number of stops.
    pub fn auto_select(stops: usize) -> Self {
        match stops {
            0..=15 => Self::fast(),
            16..=60 => Self::balanced(),
            _ => Self::quality(),
        }
    }

    pub fn with_strategy(mut self, strategy: SequenceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the mutation rate, clamped into `[0, 1]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets how many of the fittest tours parents are drawn from.
    pub fn with_parent_pool(mut self, n: usize) -> Self {
        self.parent_pool = n;
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

    /// GA parameters for the genetic strategy.
    pub fn ga_config(&self) -> GaConfig {
        GaConfig {
            population_size: self.population_size,
            max_generations: self.generations,
            elite_count: self.elite_count,
            mutation_rate: self.mutation_rate,
            selection: Selection::Truncation(self.parent_pool),
            parallel: self.parallel,
            time_limit_ms: self.time_limit_ms,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let checked = match self.strategy {
            SequenceStrategy::Genetic => self.ga_config().validate(),
            SequenceStrategy::NearestNeighborTwoOpt => Ok(()),
        };
        checked.map_err(|e| match e {
            PlanError::InvalidConfig(msg) => PlanError::InvalidConfig(format!("sequencing: {msg}")),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_balanced() {
        let config = SequenceConfig::default();
        assert_eq!(config, SequenceConfig::balanced());
        assert_eq!(config.population_size, 100);
        assert_eq!(config.elite_count, 2);
        assert_eq!(config.parent_pool, 10);
    }

    #[test]
    fn test_ga_config_uses_truncation_pool() {
        let ga = SequenceConfig::default().ga_config();
        assert_eq!(ga.selection, Selection::Truncation(10));
        assert_eq!(ga.max_generations, 500);
    }

    #[test]
    fn test_elite_and_pool_builders() {
        let ga = SequenceConfig::default().with_elite_count(4).with_parent_pool(20).ga_config();
        assert_eq!(ga.elite_count, 4);
        assert_eq!(ga.selection, Selection::Truncation(20));
        assert!(SequenceConfig::default().with_parent_pool(0).validate().is_err());
    }

    #[test]
    fn test_invalid_population_reported() {
        let err = SequenceConfig::default().with_population_size(1).validate().unwrap_err();
        assert!(matches!(err, PlanError::InvalidConfig(msg) if msg.starts_with("sequencing")));
    }

    #[test]
    fn test_heuristic_ignores_ga_parameters() {
        let config = SequenceConfig::default()
            .with_population_size(0)
            .with_strategy(SequenceStrategy::NearestNeighborTwoOpt);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auto_select_scales() {
        assert_eq!(SequenceConfig::auto_select(5), SequenceConfig::fast());
        assert_eq!(SequenceConfig::auto_select(100), SequenceConfig::quality());
    }
}
