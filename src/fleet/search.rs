//! Bounded cheapest-arc search for capacitated routing.
//!
//! 1. Build a first solution with the configured construction heuristic.
//! 2. If construction strands a stop, run a depth-first search over
//!    stop → vehicle assignments (largest demand first) until a feasible
//!    packing is found or the node/time budget runs out.
//! 3. Optionally polish each route with 2-opt.
//!
//! The budget is checked after every constructed stop, every packing node
//! batch and every 2-opt sweep. A spent budget discards the partial work.
//! The first feasible solution is accepted; no optimality is claimed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::model::RoutingModel;
use super::solver::{FirstSolutionStrategy, RoutingSolution, RoutingSolver, SolverConfig, SolverStatus};
use crate::sequence::local_search::two_opt_until;

const CAPACITY_EPS: f64 = 1e-9;

/// Budget checks (time, cancellation) run every this many search nodes.
const CHECK_INTERVAL: usize = 256;

/// Default [`RoutingSolver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CheapestArcSearch;

impl CheapestArcSearch {
    pub fn new() -> Self {
        Self
    }
}

impl RoutingSolver for CheapestArcSearch {
    fn solve(
        &self,
        model: &RoutingModel,
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> RoutingSolution {
        let started = Instant::now();
        let budget = Budget {
            started,
            time_limit_ms: config.time_limit_ms,
            node_limit: config.node_limit,
            cancel: cancel.as_deref(),
        };

        if let Some(status) = budget.interrupted() {
            return RoutingSolution::empty(status);
        }
        if let Some(stop) = (1..model.node_count()).find(|&s| !fits_any_vehicle(model, s)) {
            debug!(stop, demand = model.demand(stop), "stop exceeds every vehicle capacity");
            return finish(RoutingSolution::empty(SolverStatus::Infeasible), started);
        }
        if model.total_demand() > model.total_capacity() + CAPACITY_EPS {
            debug!(
                demand = model.total_demand(),
                capacity = model.total_capacity(),
                "fleet capacity too small"
            );
            return finish(RoutingSolution::empty(SolverStatus::Infeasible), started);
        }

        let constructed = match config.first_solution {
            FirstSolutionStrategy::PathCheapestArc => path_cheapest_arc(model, &budget),
            FirstSolutionStrategy::CheapestInsertion => cheapest_insertion(model, &budget),
        };

        let (mut routes, explored) = match constructed {
            Ok(Some(routes)) => (routes, 0),
            Err(status) => {
                warn!(?status, "routing budget spent during construction");
                return finish(RoutingSolution::empty(status), started);
            }
            Ok(None) => {
                debug!("construction stranded stops, falling back to bounded search");
                let mut search = PackingSearch::new(model, &budget);
                match search.run() {
                    Ok(assignment) => {
                        let routes = assignment
                            .iter()
                            .map(|stops| chain_from_depot(model, stops))
                            .collect();
                        (routes, search.explored)
                    }
                    Err(status) => {
                        if status != SolverStatus::Infeasible {
                            warn!(?status, explored = search.explored, "routing search budget spent");
                        }
                        let mut solution = RoutingSolution::empty(status);
                        solution.explored = search.explored;
                        return finish(solution, started);
                    }
                }
            }
        };

        if config.improve_routes {
            for route in &mut routes {
                if let Err(status) = polish(model, route, &budget) {
                    warn!(?status, explored, "routing budget spent while polishing");
                    let mut solution = RoutingSolution::empty(status);
                    solution.explored = explored;
                    return finish(solution, started);
                }
            }
        }

        let loads: Vec<f64> = routes
            .iter()
            .map(|r| r.iter().map(|&s| model.demand(s)).sum())
            .collect();
        let total_distance: f64 = routes
            .iter()
            .map(|r| model.matrix().route_length(0, r))
            .sum();

        finish(
            RoutingSolution {
                status: SolverStatus::Feasible,
                routes,
                loads,
                total_distance,
                explored,
                solve_time_ms: 0,
            },
            started,
        )
    }
}

fn finish(mut solution: RoutingSolution, started: Instant) -> RoutingSolution {
    solution.solve_time_ms = started.elapsed().as_millis() as u64;
    solution
}

fn fits_any_vehicle(model: &RoutingModel, stop: usize) -> bool {
    (0..model.vehicle_count()).any(|v| model.demand(stop) <= model.capacity(v) + CAPACITY_EPS)
}

/// Fills vehicles in order, each time extending the route to the closest
/// unrouted stop that fits. `None` if a stop is left over.
fn path_cheapest_arc(model: &RoutingModel, budget: &Budget<'_>) -> Result<Option<Vec<Vec<usize>>>, SolverStatus> {
    let matrix = model.matrix();
    let mut routed = vec![false; model.node_count()];
    routed[0] = true;
    let mut left = model.stop_count();
    let mut routes = Vec::with_capacity(model.vehicle_count());

    for v in 0..model.vehicle_count() {
        let mut route = Vec::new();
        let mut load = 0.0;
        let mut last = 0;
        while left > 0 {
            let next = (1..model.node_count())
                .filter(|&s| !routed[s] && load + model.demand(s) <= model.capacity(v) + CAPACITY_EPS)
                .min_by(|&a, &b| matrix.get(last, a).total_cmp(&matrix.get(last, b)));
            let Some(next) = next else { break };
            routed[next] = true;
            left -= 1;
            load += model.demand(next);
            route.push(next);
            last = next;
            if let Some(status) = budget.interrupted() {
                return Err(status);
            }
        }
        routes.push(route);
    }

    Ok((left == 0).then_some(routes))
}

/// Global cheapest feasible insertion. `None` if a stop is left over.
fn cheapest_insertion(model: &RoutingModel, budget: &Budget<'_>) -> Result<Option<Vec<Vec<usize>>>, SolverStatus> {
    let matrix = model.matrix();
    let mut routes: Vec<Vec<usize>> = vec![Vec::new(); model.vehicle_count()];
    let mut loads = vec![0.0; model.vehicle_count()];
    let mut pending: Vec<usize> = (1..model.node_count()).collect();

    while !pending.is_empty() {
        if let Some(status) = budget.interrupted() {
            return Err(status);
        }
        // (cost, pending index, vehicle, position)
        let mut best: Option<(f64, usize, usize, usize)> = None;
        for (pi, &s) in pending.iter().enumerate() {
            for (v, route) in routes.iter().enumerate() {
                if loads[v] + model.demand(s) > model.capacity(v) + CAPACITY_EPS {
                    continue;
                }
                for pos in 0..=route.len() {
                    let prev = if pos == 0 { 0 } else { route[pos - 1] };
                    let next = route.get(pos).copied().unwrap_or(0);
                    let cost = matrix.get(prev, s) + matrix.get(s, next) - matrix.get(prev, next);
                    if best.map_or(true, |(b, ..)| cost < b) {
                        best = Some((cost, pi, v, pos));
                    }
                }
            }
        }
        let Some((_, pi, v, pos)) = best else {
            return Ok(None);
        };
        let s = pending.remove(pi);
        routes[v].insert(pos, s);
        loads[v] += model.demand(s);
    }
    Ok(Some(routes))
}

/// Orders a fixed set of stops by repeatedly moving to the closest one,
/// starting from the depot.
fn chain_from_depot(model: &RoutingModel, stops: &[usize]) -> Vec<usize> {
    let matrix = model.matrix();
    let mut left: Vec<usize> = stops.to_vec();
    let mut route = Vec::with_capacity(stops.len());
    let mut last = 0;
    while !left.is_empty() {
        let mut pick = 0;
        for i in 1..left.len() {
            if matrix.get(last, left[i]) < matrix.get(last, left[pick]) {
                pick = i;
            }
        }
        last = left.remove(pick);
        route.push(last);
    }
    route
}

fn polish(model: &RoutingModel, route: &mut Vec<usize>, budget: &Budget<'_>) -> Result<(), SolverStatus> {
    let mut tour = Vec::with_capacity(route.len() + 1);
    tour.push(0);
    tour.extend_from_slice(route);
    let mut spent = None;
    let moves = two_opt_until(model.matrix(), &mut tour, || {
        spent = budget.interrupted();
        spent.is_some()
    });
    if let Some(status) = spent {
        return Err(status);
    }
    if moves > 0 {
        route.clear();
        route.extend_from_slice(&tour[1..]);
    }
    Ok(())
}

struct Budget<'a> {
    started: Instant,
    time_limit_ms: u64,
    node_limit: usize,
    cancel: Option<&'a AtomicBool>,
}

impl Budget<'_> {
    fn interrupted(&self) -> Option<SolverStatus> {
        if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Some(SolverStatus::Cancelled);
        }
        if self.started.elapsed().as_millis() >= u128::from(self.time_limit_ms) {
            return Some(SolverStatus::Timeout);
        }
        None
    }
}

/// Depth-first stop → vehicle assignment with capacity pruning.
struct PackingSearch<'a> {
    model: &'a RoutingModel,
    budget: &'a Budget<'a>,
    /// Stops, largest demand first.
    order: Vec<usize>,
    remaining: Vec<f64>,
    assignment: Vec<Vec<usize>>,
    explored: usize,
}

impl<'a> PackingSearch<'a> {
    fn new(model: &'a RoutingModel, budget: &'a Budget<'a>) -> Self {
        let mut order: Vec<usize> = (1..model.node_count()).collect();
        order.sort_by(|&a, &b| model.demand(b).total_cmp(&model.demand(a)).then(a.cmp(&b)));
        Self {
            model,
            budget,
            order,
            remaining: (0..model.vehicle_count()).map(|v| model.capacity(v)).collect(),
            assignment: vec![Vec::new(); model.vehicle_count()],
            explored: 0,
        }
    }

    fn run(&mut self) -> Result<Vec<Vec<usize>>, SolverStatus> {
        self.descend(0)?;
        Ok(std::mem::take(&mut self.assignment))
    }

    /// `Ok(())` once every stop from `depth` on is placed. `Err(Infeasible)`
    /// means this branch is exhausted; any other status aborts the search.
    fn descend(&mut self, depth: usize) -> Result<(), SolverStatus> {
        if depth == self.order.len() {
            return Ok(());
        }
        self.explored += 1;
        if self.explored > self.budget.node_limit {
            return Err(SolverStatus::Timeout);
        }
        if self.explored % CHECK_INTERVAL == 0 {
            if let Some(status) = self.budget.interrupted() {
                return Err(status);
            }
        }

        let stop = self.order[depth];
        let demand = self.model.demand(stop);
        let mut tried_empty: Vec<f64> = Vec::new();

        for v in self.candidates(stop) {
            if self.remaining[v] + CAPACITY_EPS < demand {
                continue;
            }
            if self.assignment[v].is_empty() {
                // empty vehicles of equal capacity are interchangeable
                let cap = self.model.capacity(v);
                if tried_empty.contains(&cap) {
                    continue;
                }
                tried_empty.push(cap);
            }

            self.remaining[v] -= demand;
            self.assignment[v].push(stop);
            match self.descend(depth + 1) {
                Ok(()) => return Ok(()),
                Err(SolverStatus::Infeasible) => {}
                Err(status) => return Err(status),
            }
            self.assignment[v].pop();
            self.remaining[v] += demand;
        }
        Err(SolverStatus::Infeasible)
    }

    /// Vehicles ordered by the cost of appending `stop` to their route.
    fn candidates(&self, stop: usize) -> Vec<usize> {
        let matrix = self.model.matrix();
        let cost = |v: usize| {
            let last = self.assignment[v].last().copied().unwrap_or(0);
            matrix.get(last, stop)
        };
        let mut vehicles: Vec<usize> = (0..self.model.vehicle_count()).collect();
        vehicles.sort_by(|&a, &b| cost(a).total_cmp(&cost(b)).then(a.cmp(&b)));
        vehicles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use proptest::prelude::*;

    /// Stops on a line at positions 1..=n from a depot at 0.
    fn line_model(demands: &[f64], capacities: &[f64]) -> RoutingModel {
        let n = demands.len() + 1;
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push((i as f64 - j as f64).abs());
            }
        }
        let mut all = vec![0.0];
        all.extend_from_slice(demands);
        RoutingModel::new(DistanceMatrix::from_raw(n, data).unwrap(), all, capacities.to_vec()).unwrap()
    }

    fn assert_valid(model: &RoutingModel, solution: &RoutingSolution) {
        let mut seen = vec![false; model.node_count()];
        for (v, route) in solution.routes.iter().enumerate() {
            let load: f64 = route.iter().map(|&s| model.demand(s)).sum();
            assert!(load <= model.capacity(v) + 1e-6);
            for &s in route {
                assert!(s != 0 && !seen[s]);
                seen[s] = true;
            }
        }
        assert!(seen[1..].iter().all(|&b| b));
    }

    #[test]
    fn test_cheapest_arc_feasible() {
        let model = line_model(&[3.0, 3.0, 3.0, 3.0], &[6.0, 6.0]);
        let solution = CheapestArcSearch.solve(&model, &SolverConfig::default(), None);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert_valid(&model, &solution);
        assert_eq!(solution.routes[0], vec![1, 2]);
    }

    #[test]
    fn test_cheapest_insertion_feasible() {
        let model = line_model(&[1.0, 2.0, 3.0, 4.0, 5.0], &[8.0, 8.0]);
        let config = SolverConfig::default().with_first_solution(FirstSolutionStrategy::CheapestInsertion);
        let solution = CheapestArcSearch.solve(&model, &config, None);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert_valid(&model, &solution);
    }

    #[test]
    fn test_fallback_packs_tight_instance() {
        // greedy by distance fills vehicle 0 with 4+4, stranding 6 and 6;
        // the only packing is {6,4} {6,4}
        let model = line_model(&[4.0, 4.0, 6.0, 6.0], &[10.0, 10.0]);
        let solution = CheapestArcSearch.solve(&model, &SolverConfig::default(), None);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert!(solution.explored > 0);
        assert_valid(&model, &solution);
    }

    #[test]
    fn test_oversized_stop_is_infeasible() {
        let model = line_model(&[1.0, 50.0], &[10.0, 10.0]);
        let solution = CheapestArcSearch.solve(&model, &SolverConfig::default(), None);
        assert_eq!(solution.status, SolverStatus::Infeasible);
        assert!(solution.routes.is_empty());
    }

    #[test]
    fn test_exhausted_search_is_infeasible() {
        // total demand fits, but three 6s cannot share two vehicles of 10
        let model = line_model(&[6.0, 6.0, 6.0], &[10.0, 10.0]);
        let solution = CheapestArcSearch.solve(&model, &SolverConfig::default(), None);
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_node_budget_reports_timeout() {
        let model = line_model(&[4.0, 4.0, 6.0, 6.0], &[10.0, 10.0]);
        let config = SolverConfig::default().with_node_limit(1);
        let solution = CheapestArcSearch.solve(&model, &config, None);
        assert_eq!(solution.status, SolverStatus::Timeout);
    }

    fn spent_budget() -> Budget<'static> {
        Budget {
            started: Instant::now(),
            time_limit_ms: 0,
            node_limit: usize::MAX,
            cancel: None,
        }
    }

    #[test]
    fn test_time_budget_bounds_construction() {
        let demands = vec![1.0; 700];
        let model = line_model(&demands, &[100.0; 10]);
        let config = SolverConfig::default()
            .with_first_solution(FirstSolutionStrategy::CheapestInsertion)
            .with_time_limit_ms(1);
        let solution = CheapestArcSearch.solve(&model, &config, None);
        assert_eq!(solution.status, SolverStatus::Timeout);
        assert!(solution.routes.is_empty());
        // one insertion pass over 700 stops is far shorter than the full construction
        assert!(solution.solve_time_ms < 200, "took {} ms", solution.solve_time_ms);
    }

    #[test]
    fn test_construction_returns_spent_budget() {
        let model = line_model(&[1.0, 1.0, 1.0], &[10.0]);
        let budget = spent_budget();
        assert_eq!(path_cheapest_arc(&model, &budget), Err(SolverStatus::Timeout));
        assert_eq!(cheapest_insertion(&model, &budget), Err(SolverStatus::Timeout));
    }

    #[test]
    fn test_polish_returns_spent_budget() {
        let model = line_model(&[1.0, 1.0, 1.0, 1.0], &[10.0]);
        let mut route = vec![3, 1, 4, 2];
        assert_eq!(polish(&model, &mut route, &spent_budget()), Err(SolverStatus::Timeout));
        assert_eq!(route, vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_cancelled_before_start() {
        let model = line_model(&[1.0], &[10.0]);
        let flag = Arc::new(AtomicBool::new(true));
        let solution = CheapestArcSearch.solve(&model, &SolverConfig::default(), Some(flag));
        assert_eq!(solution.status, SolverStatus::Cancelled);
    }

    #[test]
    fn test_no_stops_gives_empty_routes() {
        let model = line_model(&[], &[10.0]);
        let solution = CheapestArcSearch.solve(&model, &SolverConfig::default(), None);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert_eq!(solution.routes, vec![Vec::<usize>::new()]);
        assert_eq!(solution.total_distance, 0.0);
    }

    #[test]
    fn test_chain_from_depot_orders_by_proximity() {
        let model = line_model(&[1.0, 1.0, 1.0], &[10.0]);
        assert_eq!(chain_from_depot(&model, &[3, 1, 2]), vec![1, 2, 3]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_feasible_routes_cover_each_stop_once(
            demands in prop::collection::vec(0.0f64..10.0, 0..14),
            capacities in prop::collection::vec(5.0f64..30.0, 1..4),
            insertion in any::<bool>(),
        ) {
            let model = line_model(&demands, &capacities);
            let strategy = if insertion {
                FirstSolutionStrategy::CheapestInsertion
            } else {
                FirstSolutionStrategy::PathCheapestArc
            };
            let config = SolverConfig::default().with_first_solution(strategy).with_node_limit(5_000);
            let solution = CheapestArcSearch.solve(&model, &config, None);
            if solution.is_solution_found() {
                assert_valid(&model, &solution);
                let recomputed: f64 = solution.routes.iter().map(|r| model.matrix().route_length(0, r)).sum();
                prop_assert!((solution.total_distance - recomputed).abs() < 1e-6);
            } else {
                prop_assert!(solution.routes.is_empty());
            }
        }
    }
}
