//! Capacitated routing model.

use crate::distance::DistanceMatrix;
use crate::error::{PlanError, Result};

/// A single-depot routing problem with one capacity dimension.
///
/// Node 0 of the matrix is the depot; nodes `1..n` are stops. Vehicles are
/// numbered by their position in `capacities`.
///
/// ```
/// use u_routeplan::distance::DistanceMatrix;
/// use u_routeplan::fleet::RoutingModel;
///
/// let matrix = DistanceMatrix::from_raw(2, vec![0.0, 5.0, 5.0, 0.0]).unwrap();
/// let model = RoutingModel::new(matrix, vec![0.0, 3.0], vec![10.0]).unwrap();
/// assert_eq!(model.stop_count(), 1);
/// assert_eq!(model.vehicle_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RoutingModel {
    matrix: DistanceMatrix,
    demands: Vec<f64>,
    capacities: Vec<f64>,
}

impl RoutingModel {
    /// # Errors
    ///
    /// [`PlanError::InvalidValue`] if `demands` does not have one entry per
    /// node, the depot has a demand, or any demand or capacity is negative
    /// or not finite.
    pub fn new(matrix: DistanceMatrix, demands: Vec<f64>, capacities: Vec<f64>) -> Result<Self> {
        let invalid = |field: &'static str, reason: String| PlanError::InvalidValue {
            record: "routing model".into(),
            field,
            reason,
        };
        if matrix.is_empty() {
            return Err(invalid("matrix", "the depot node is missing".into()));
        }
        if demands.len() != matrix.len() {
            return Err(invalid(
                "demands",
                format!("{} demands for {} nodes", demands.len(), matrix.len()),
            ));
        }
        if demands[0] != 0.0 {
            return Err(invalid("demands", "the depot must have zero demand".into()));
        }
        if let Some(d) = demands.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(invalid("demands", format!("{d} is not a valid demand")));
        }
        if let Some(c) = capacities.iter().find(|c| !c.is_finite() || **c < 0.0) {
            return Err(invalid("capacities", format!("{c} is not a valid capacity")));
        }
        Ok(Self {
            matrix,
            demands,
            capacities,
        })
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    /// Nodes including the depot.
    pub fn node_count(&self) -> usize {
        self.matrix.len()
    }

    pub fn stop_count(&self) -> usize {
        self.matrix.len() - 1
    }

    pub fn vehicle_count(&self) -> usize {
        self.capacities.len()
    }

    #[inline]
    pub fn demand(&self, node: usize) -> f64 {
        self.demands[node]
    }

    #[inline]
    pub fn capacity(&self, vehicle: usize) -> f64 {
        self.capacities[vehicle]
    }

    pub fn total_demand(&self) -> f64 {
        self.demands.iter().sum()
    }

    pub fn total_capacity(&self) -> f64 {
        self.capacities.iter().sum()
    }
}
