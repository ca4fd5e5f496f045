//! GeoClusterer configuration.

use crate::error::{PlanError, Result};

/// How orders are partitioned before spatial clustering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Grouping {
    /// One partition holding every order.
    #[default]
    None,
    /// One partition per region value.
    Region,
    /// One partition per region value; orders of the designated `region`
    /// are split further by sub-region.
    RegionThenSubRegion { region: String },
}

/// Parameters for [`GeoClusterer`](super::GeoClusterer).
///
/// ```
/// use u_routeplan::cluster::{ClusterConfig, Grouping};
///
/// let config = ClusterConfig::default()
///     .with_clusters(5)
///     .with_grouping(Grouping::Region);
/// assert_eq!(config.seed, 42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterConfig {
    /// Desired clusters per partition (`k`).
    pub clusters: usize,

    pub grouping: Grouping,

    /// Seed for k-means initialization. Identical input and seed give
    /// identical clusters.
    pub seed: u64,

    /// Lloyd iterations per run.
    pub max_iterations: usize,

    /// Convergence threshold on centroid movement, in meters. Must be positive.
    pub tolerance: f64,

    /// Independent k-means++ runs; the lowest inertia wins.
    pub restarts: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            clusters: 3,
            grouping: Grouping::None,
            seed: 42,
            max_iterations: 300,
            tolerance: 1e-4,
            restarts: 4,
        }
    }
}

impl ClusterConfig {
    pub fn with_clusters(mut self, k: usize) -> Self {
        self.clusters = k;
        self
    }

    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n.max(1);
        self
    }

    pub fn with_restarts(mut self, n: usize) -> Self {
        self.restarts = n.max(1);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.clusters == 0 {
            return Err(PlanError::InvalidConfig("clusters must be at least 1".into()));
        }
        if self.max_iterations == 0 || self.restarts == 0 {
            return Err(PlanError::InvalidConfig(
                "max_iterations and restarts must be at least 1".into(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(PlanError::InvalidConfig("tolerance must be a positive number".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_clusters_rejected() {
        let config = ClusterConfig::default().with_clusters(0);
        assert!(matches!(config.validate(), Err(PlanError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_tolerance_rejected() {
        let mut config = ClusterConfig::default();
        config.tolerance = 0.0;
        assert!(matches!(config.validate(), Err(PlanError::InvalidConfig(_))));
    }

    #[test]
    fn test_builders_clamp_counts() {
        let config = ClusterConfig::default().with_restarts(0).with_max_iterations(0);
        assert_eq!(config.restarts, 1);
        assert_eq!(config.max_iterations, 1);
        assert!(config.validate().is_ok());
    }
}
