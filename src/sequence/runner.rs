//! SequenceOptimizer execution.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use super::config::{SequenceConfig, SequenceStrategy};
use super::local_search::{nearest_neighbor, two_opt};
use super::problem::TourProblem;
use crate::distance::DistanceMatrix;
use crate::error::{PlanError, Result};
use crate::ga::GaRunner;
use crate::models::{Coordinate, Load, LoadId, Order, OrderId};

/// A closed tour over depot (node 0) and stops (nodes `1..=n`).
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceResult {
    /// Permutation of every node, as found by the search.
    pub tour: Vec<usize>,
    /// Closed-tour length in meters, recomputable from `tour`.
    pub length: f64,
    pub generations: usize,
    pub cancelled: bool,
    /// Best length after each generation (GA strategy only).
    pub history: Vec<f64>,
}

impl SequenceResult {
    fn trivial(tour: Vec<usize>, matrix: &DistanceMatrix) -> Self {
        let length = matrix.tour_length(&tour);
        Self {
            tour,
            length,
            generations: 0,
            cancelled: false,
            history: vec![length],
        }
    }

    /// Stop indices (0-based into the input stops) in visiting order,
    /// leaving the depot.
    pub fn stop_order(&self) -> Vec<usize> {
        let start = self.tour.iter().position(|&n| n == 0).unwrap_or(0);
        self.tour[start..]
            .iter()
            .chain(&self.tour[..start])
            .filter(|&&n| n != 0)
            .map(|&n| n - 1)
            .collect()
    }
}

/// Visiting order computed for one load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSequence {
    pub load: LoadId,
    /// Orders in visiting order, depot excluded.
    pub stops: Vec<OrderId>,
    /// Closed-tour length from the depot and back, in meters.
    pub length: f64,
    pub cancelled: bool,
}

impl LoadSequence {
    /// Writes 1-based sequence positions into the matching orders.
    pub fn apply(&self, orders: &mut [Order]) {
        for (pos, id) in self.stops.iter().enumerate() {
            if let Some(order) = orders.iter_mut().find(|o| o.id() == *id) {
                order.set_sequence(Some(pos + 1));
            }
        }
    }
}

/// Finds short closed tours through a depot and a set of stops.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use u_routeplan::models::Coordinate;
/// use u_routeplan::sequence::{SequenceConfig, SequenceOptimizer};
///
/// let depot = Coordinate::new(-23.0838, -47.1336).unwrap();
/// let stops = [
///     Coordinate::new(-23.10, -47.20).unwrap(),
///     Coordinate::new(-23.05, -47.15).unwrap(),
///     Coordinate::new(-23.12, -47.10).unwrap(),
///     Coordinate::new(-23.00, -47.00).unwrap(),
/// ];
/// let config = SequenceConfig::fast();
/// let mut rng = StdRng::seed_from_u64(42);
/// let result = SequenceOptimizer::optimize(depot, &stops, &config, &mut rng).unwrap();
/// assert_eq!(result.tour.len(), 5);
/// assert_eq!(result.stop_order().len(), 4);
/// ```
pub struct SequenceOptimizer;

impl SequenceOptimizer {
    pub fn optimize<R: Rng>(
        depot: Coordinate,
        stops: &[Coordinate],
        config: &SequenceConfig,
        rng: &mut R,
    ) -> Result<SequenceResult> {
        Self::optimize_with_cancel(depot, stops, config, rng, None)
    }

    /// Like [`optimize`](Self::optimize), stopping between generations once
    /// `cancel` is set. The best tour so far is returned.
    pub fn optimize_with_cancel<R: Rng>(
        depot: Coordinate,
        stops: &[Coordinate],
        config: &SequenceConfig,
        rng: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SequenceResult> {
        let matrix = DistanceMatrix::with_depot(depot, stops);
        Self::optimize_matrix(&matrix, config, rng, cancel)
    }

    /// Optimizes a closed tour over every node of `matrix`.
    ///
    /// # Errors
    /// [`PlanError::InvalidConfig`] if `config` does not validate.
    pub fn optimize_matrix<R: Rng>(
        matrix: &DistanceMatrix,
        config: &SequenceConfig,
        rng: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SequenceResult> {
        config.validate()?;

        // with three nodes or fewer every closed tour has the same length
        if matrix.len() <= 3 {
            return Ok(SequenceResult::trivial((0..matrix.len()).collect(), matrix));
        }

        match config.strategy {
            SequenceStrategy::NearestNeighborTwoOpt => {
                let mut tour = nearest_neighbor(matrix, 0);
                let moves = two_opt(matrix, &mut tour);
                debug!(nodes = matrix.len(), moves, "nearest neighbour tour improved");
                Ok(SequenceResult::trivial(tour, matrix))
            }
            SequenceStrategy::Genetic => {
                let problem = TourProblem::new(matrix);
                let result = GaRunner::run_with_cancel(&problem, &config.ga_config(), rng, cancel)?;
                Ok(SequenceResult {
                    length: result.best_fitness,
                    tour: result.best.nodes,
                    generations: result.generations,
                    cancelled: result.cancelled,
                    history: result.fitness_history,
                })
            }
        }
    }

    /// Sequences the orders of one load, starting and ending at `depot`.
    ///
    /// Orders are not modified; apply the result with
    /// [`LoadSequence::apply`].
    ///
    /// # Errors
    ///
    /// - [`PlanError::MissingRequiredField`] if a load member has no
    ///   coordinate or is not in `orders`
    /// - [`PlanError::InvalidConfig`] if `config` does not validate
    pub fn sequence_load<R: Rng>(
        orders: &[Order],
        load: &Load,
        depot: Coordinate,
        config: &SequenceConfig,
        rng: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<LoadSequence> {
        let stops = load
            .orders
            .iter()
            .map(|id| {
                orders
                    .iter()
                    .find(|o| o.id() == *id)
                    .and_then(Order::coordinate)
                    .ok_or_else(|| PlanError::MissingRequiredField {
                        record: id.to_string(),
                        field: "coordinate",
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let result = Self::optimize_with_cancel(depot, &stops, config, rng, cancel)?;
        debug!(
            load = load.id.0,
            stops = stops.len(),
            length = result.length,
            generations = result.generations,
            "load sequenced"
        );

        Ok(LoadSequence {
            load: load.id,
            stops: result.stop_order().into_iter().map(|i| load.orders[i]).collect(),
            length: result.length,
            cancelled: result.cancelled,
        })
    }
}
