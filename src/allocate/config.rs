//! CapacityAllocator configuration.

use crate::error::{PlanError, Result};

/// Parameters for [`CapacityAllocator`](super::CapacityAllocator).
///
/// ```
/// use u_routeplan::allocate::AllocationConfig;
///
/// let config = AllocationConfig::default()
///     .with_utilization_percent(90.0)
///     .with_max_per_load(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationConfig {
    /// Share of each vehicle's raw capacity that may be used, `[0, 100]`.
    pub utilization_percent: f64,

    /// Maximum number of orders in one load.
    pub max_per_load: usize,

    /// Trips a vehicle may make. `None` lets a vehicle start a fresh trip
    /// whenever no vehicle has room left; `Some(1)` keeps every vehicle to a
    /// single trip.
    pub max_trips_per_vehicle: Option<usize>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            utilization_percent: 100.0,
            max_per_load: 12,
            max_trips_per_vehicle: None,
        }
    }
}

impl AllocationConfig {
    /// Sets the utilization percentage, clamped into `[0, 100]`.
    pub fn with_utilization_percent(mut self, percent: f64) -> Self {
        self.utilization_percent = percent.clamp(0.0, 100.0);
        self
    }

    pub fn with_max_per_load(mut self, n: usize) -> Self {
        self.max_per_load = n;
        self
    }

    pub fn with_max_trips_per_vehicle(mut self, trips: usize) -> Self {
        self.max_trips_per_vehicle = Some(trips);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.utilization_percent) {
            return Err(PlanError::InvalidConfig(format!(
                "utilization_percent {} is outside [0, 100]",
                self.utilization_percent
            )));
        }
        if self.max_per_load == 0 {
            return Err(PlanError::InvalidConfig("max_per_load must be at least 1".into()));
        }
        if self.max_trips_per_vehicle == Some(0) {
            return Err(PlanError::InvalidConfig(
                "max_trips_per_vehicle must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_clamped() {
        let config = AllocationConfig::default().with_utilization_percent(140.0);
        assert_eq!(config.utilization_percent, 100.0);
    }

    #[test]
    fn test_nan_percent_rejected() {
        let config = AllocationConfig {
            utilization_percent: f64::NAN,
            ..AllocationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_per_load_rejected() {
        assert!(AllocationConfig::default().with_max_per_load(0).validate().is_err());
        assert!(AllocationConfig::default().with_max_trips_per_vehicle(0).validate().is_err());
    }
}
