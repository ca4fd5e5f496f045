//! FleetRouteSolver: capacitated vehicle routing.
//!
//! The modeling layer ([`RoutingModel`]) is separate from the search
//! ([`RoutingSolver`]), so another backend can be plugged in through
//! [`FleetRouteSolver::with_solver`]. The bundled [`CheapestArcSearch`]
//! builds a first solution with a construction heuristic, falls back to a
//! bounded depth-first packing search when construction strands a stop, and
//! accepts the first feasible answer.
//!
//! Every call runs under an explicit time and node budget; a spent budget is
//! reported as [`PlanError::NoFeasibleRoute`](crate::error::PlanError::NoFeasibleRoute).
//!
//! # References
//!
//! - Toth & Vigo (2014), *Vehicle Routing: Problems, Methods, and Applications*

mod model;
mod runner;
mod search;
mod solver;

pub use model::RoutingModel;
pub use runner::{FleetPlan, FleetRouteSolver, VehicleRoute};
pub use search::CheapestArcSearch;
pub use solver::{FirstSolutionStrategy, RoutingSolution, RoutingSolver, SolverConfig, SolverStatus};
