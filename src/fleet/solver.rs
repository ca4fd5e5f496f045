//! Routing solver interface.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::model::RoutingModel;
use crate::error::{PlanError, Result};

/// Outcome of a solver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Every stop is routed within capacity.
    Feasible,
    /// Proven that no capacity-respecting assignment exists.
    Infeasible,
    /// The time or node budget ran out first.
    Timeout,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Construction heuristic for the first solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FirstSolutionStrategy {
    /// Fill vehicles one by one, always extending the route to the closest
    /// stop that still fits.
    #[default]
    PathCheapestArc,
    /// Repeatedly insert the stop with the cheapest feasible insertion over
    /// every route and position.
    CheapestInsertion,
}

/// Solver budget and strategy.
///
/// ```
/// use u_routeplan::fleet::{FirstSolutionStrategy, SolverConfig};
///
/// let config = SolverConfig::default()
///     .with_time_limit_ms(2_000)
///     .with_first_solution(FirstSolutionStrategy::CheapestInsertion);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: u64,
    /// Maximum search nodes explored when construction fails.
    pub node_limit: usize,
    pub first_solution: FirstSolutionStrategy,
    /// Polish each route with 2-opt.
    pub improve_routes: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 10_000,
            node_limit: 200_000,
            first_solution: FirstSolutionStrategy::default(),
            improve_routes: true,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_node_limit(mut self, n: usize) -> Self {
        self.node_limit = n;
        self
    }

    pub fn with_first_solution(mut self, strategy: FirstSolutionStrategy) -> Self {
        self.first_solution = strategy;
        self
    }

    pub fn with_improve_routes(mut self, improve: bool) -> Self {
        self.improve_routes = improve;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_limit_ms == 0 {
            return Err(PlanError::InvalidConfig("time_limit_ms must be positive".into()));
        }
        if self.node_limit == 0 {
            return Err(PlanError::InvalidConfig("node_limit must be positive".into()));
        }
        Ok(())
    }
}

/// Solution returned by a [`RoutingSolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingSolution {
    pub status: SolverStatus,
    /// Stop nodes per vehicle in visiting order, depot excluded.
    /// Empty unless the status is [`SolverStatus::Feasible`].
    pub routes: Vec<Vec<usize>>,
    /// Summed demand per vehicle.
    pub loads: Vec<f64>,
    /// Sum of depot → stops → depot lengths.
    pub total_distance: f64,
    /// Search nodes explored by the fallback search.
    pub explored: usize,
    pub solve_time_ms: u64,
}

impl RoutingSolution {
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            routes: Vec::new(),
            loads: Vec::new(),
            total_distance: 0.0,
            explored: 0,
            solve_time_ms: 0,
        }
    }

    pub fn is_solution_found(&self) -> bool {
        self.status == SolverStatus::Feasible
    }
}

/// A capacitated routing search.
///
/// Implementations must honor `config`'s budget and return instead of
/// blocking once it is spent or `cancel` is raised.
pub trait RoutingSolver {
    fn solve(
        &self,
        model: &RoutingModel,
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> RoutingSolution;
}
