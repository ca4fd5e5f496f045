//! FleetRouteSolver: orders + fleet → per-vehicle routes.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::info;

use super::model::RoutingModel;
use super::search::CheapestArcSearch;
use super::solver::{RoutingSolver, SolverConfig, SolverStatus};
use crate::distance::DistanceMatrix;
use crate::error::{PlanError, Result};
use crate::models::{Allocation, ClusterId, Coordinate, Load, LoadId, Order, OrderId, Vehicle, VehicleId};

/// One vehicle's route.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleRoute {
    /// Orders in visiting order; the route starts and ends at the depot.
    pub stops: Vec<OrderId>,
    /// Summed order weight.
    pub weight: f64,
    /// Depot → stops → depot, in meters.
    pub distance: f64,
}

/// Routes for every available vehicle. Unused vehicles have empty routes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetPlan {
    pub routes: BTreeMap<VehicleId, VehicleRoute>,
    pub total_distance: f64,
}

impl FleetPlan {
    pub fn used_vehicles(&self) -> usize {
        self.routes.values().filter(|r| !r.stops.is_empty()).count()
    }

    /// Writes one load per used vehicle into `orders`: allocation and
    /// 1-based sequence position. Loads are numbered from 1 in vehicle id
    /// order.
    pub fn annotate(&self, orders: &mut [Order]) -> Vec<Load> {
        let mut loads = Vec::new();
        for (&vehicle, route) in self.routes.iter().filter(|(_, r)| !r.stops.is_empty()) {
            let id = LoadId(loads.len() as u32 + 1);
            let mut boxes = 0;
            for (pos, stop) in route.stops.iter().enumerate() {
                if let Some(order) = orders.iter_mut().find(|o| o.id() == *stop) {
                    order.set_allocation(Allocation::Assigned { load: id, vehicle });
                    order.set_sequence(Some(pos + 1));
                    boxes += order.boxes();
                }
            }
            loads.push(Load {
                id,
                vehicle,
                cluster: ClusterId::default(),
                trip: 1,
                orders: route.stops.clone(),
                weight: route.weight,
                boxes,
            });
        }
        loads
    }
}

/// Capacitated routing over the whole order set, weight as the capacity
/// dimension.
///
/// # Examples
///
/// ```
/// use u_routeplan::fleet::{FleetRouteSolver, SolverConfig};
/// use u_routeplan::models::{Coordinate, Order, OrderId, Vehicle, VehicleId};
///
/// let depot = Coordinate::new(-23.0838, -47.1336).unwrap();
/// let orders: Vec<Order> = [(-23.10, -47.20, 30.0), (-23.05, -47.15, 25.0), (-23.12, -47.10, 40.0)]
///     .iter()
///     .enumerate()
///     .map(|(i, &(lat, lon, w))| {
///         Order::new(OrderId(i), "addr", w, 1).with_coordinate(Coordinate::new(lat, lon).unwrap())
///     })
///     .collect();
/// let fleet = vec![
///     Vehicle::new(VehicleId(0), "AAA1A11", 60.0, 50),
///     Vehicle::new(VehicleId(1), "BBB2B22", 60.0, 50),
/// ];
///
/// let plan = FleetRouteSolver::new()
///     .solve(&orders, &fleet, depot, &SolverConfig::default(), None)
///     .unwrap();
/// assert!(plan.routes.values().all(|r| r.weight <= 60.0));
/// ```
pub struct FleetRouteSolver<S = CheapestArcSearch> {
    solver: S,
}

impl FleetRouteSolver {
    pub fn new() -> Self {
        Self {
            solver: CheapestArcSearch,
        }
    }
}

impl Default for FleetRouteSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RoutingSolver> FleetRouteSolver<S> {
    /// Uses a different search backend.
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    /// Routes every order onto the available vehicles.
    ///
    /// # Errors
    ///
    /// - [`PlanError::NoFeasibleRoute`] if no vehicle is available, the
    ///   search proves infeasibility, or the budget or `cancel` stops it
    /// - [`PlanError::MissingRequiredField`] if an order has no coordinate
    /// - [`PlanError::InvalidConfig`] if `config` does not validate
    pub fn solve(
        &self,
        orders: &[Order],
        fleet: &[Vehicle],
        depot: Coordinate,
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<FleetPlan> {
        config.validate()?;
        let vehicles: Vec<&Vehicle> = fleet.iter().filter(|v| v.is_available()).collect();
        if vehicles.is_empty() {
            return Err(PlanError::NoFeasibleRoute("no available vehicle".into()));
        }

        let stops = orders
            .iter()
            .map(|o| {
                o.coordinate().ok_or_else(|| PlanError::MissingRequiredField {
                    record: o.id().to_string(),
                    field: "coordinate",
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut demands = Vec::with_capacity(orders.len() + 1);
        demands.push(0.0);
        demands.extend(orders.iter().map(Order::weight));
        let model = RoutingModel::new(
            DistanceMatrix::with_depot(depot, &stops),
            demands,
            vehicles.iter().map(|v| v.weight_capacity()).collect(),
        )?;

        let solution = self.solver.solve(&model, config, cancel);
        let reason = match solution.status {
            SolverStatus::Feasible => None,
            SolverStatus::Infeasible => Some("orders cannot fit the fleet capacity"),
            SolverStatus::Timeout => Some("search budget expired"),
            SolverStatus::Cancelled => Some("search cancelled"),
        };
        if let Some(reason) = reason {
            return Err(PlanError::NoFeasibleRoute(reason.into()));
        }

        let mut routes: BTreeMap<VehicleId, VehicleRoute> = vehicles
            .iter()
            .map(|v| (v.id(), VehicleRoute::default()))
            .collect();
        for ((vehicle, nodes), weight) in vehicles.iter().zip(&solution.routes).zip(&solution.loads) {
            routes.insert(
                vehicle.id(),
                VehicleRoute {
                    stops: nodes.iter().map(|&n| orders[n - 1].id()).collect(),
                    weight: *weight,
                    distance: model.matrix().route_length(0, nodes),
                },
            );
        }

        let plan = FleetPlan {
            routes,
            total_distance: solution.total_distance,
        };
        info!(
            orders = orders.len(),
            vehicles = plan.used_vehicles(),
            distance = plan.total_distance,
            elapsed_ms = solution.solve_time_ms,
            "fleet routes solved"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::RoutingSolution;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn depot() -> Coordinate {
        Coordinate::new(-23.0838, -47.1336).unwrap()
    }

    fn orders(weights: &[f64]) -> Vec<Order> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let coord = Coordinate::new(-23.0 - 0.01 * i as f64, -47.0 - 0.02 * (i % 3) as f64).unwrap();
                Order::new(OrderId(i), format!("Rua {i}"), w, 1).with_coordinate(coord)
            })
            .collect()
    }

    fn fleet(capacities: &[f64]) -> Vec<Vehicle> {
        capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| Vehicle::new(VehicleId(i), format!("T{i}"), c, 100))
            .collect()
    }

    #[test]
    fn test_routes_respect_capacity() {
        let orders = orders(&[10.0, 20.0, 5.0, 15.0, 8.0, 12.0]);
        let fleet = fleet(&[40.0, 40.0]);
        let plan = FleetRouteSolver::new()
            .solve(&orders, &fleet, depot(), &SolverConfig::default(), None)
            .unwrap();

        let mut seen = HashSet::new();
        for route in plan.routes.values() {
            assert!(route.weight <= 40.0);
            for id in &route.stops {
                assert!(seen.insert(*id));
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_empty_fleet_is_no_feasible_route() {
        let orders = orders(&[1.0]);
        let err = FleetRouteSolver::new()
            .solve(&orders, &[], depot(), &SolverConfig::default(), None)
            .unwrap_err();
        assert!(matches!(err, PlanError::NoFeasibleRoute(_)));
    }

    #[test]
    fn test_unavailable_vehicles_are_ignored() {
        let orders = orders(&[5.0]);
        let fleet = vec![
            Vehicle::new(VehicleId(0), "T0", 100.0, 10).with_available(false),
            Vehicle::new(VehicleId(1), "T1", 100.0, 10),
        ];
        let plan = FleetRouteSolver::new()
            .solve(&orders, &fleet, depot(), &SolverConfig::default(), None)
            .unwrap();
        assert_eq!(plan.routes.len(), 1);
        assert_eq!(plan.routes[&VehicleId(1)].stops, vec![OrderId(0)]);
    }

    #[test]
    fn test_overweight_orders_are_no_feasible_route() {
        let orders = orders(&[50.0, 50.0, 50.0]);
        let err = FleetRouteSolver::new()
            .solve(&orders, &fleet(&[60.0, 60.0]), depot(), &SolverConfig::default(), None)
            .unwrap_err();
        assert!(matches!(err, PlanError::NoFeasibleRoute(_)));
    }

    #[test]
    fn test_cancellation_is_no_feasible_route() {
        let orders = orders(&[1.0, 2.0]);
        let flag = Arc::new(AtomicBool::new(true));
        let err = FleetRouteSolver::new()
            .solve(&orders, &fleet(&[10.0]), depot(), &SolverConfig::default(), Some(flag))
            .unwrap_err();
        assert_eq!(err, PlanError::NoFeasibleRoute("search cancelled".into()));
    }

    #[test]
    fn test_missing_coordinate() {
        let orders = vec![Order::new(OrderId(3), "x", 1.0, 1)];
        let err = FleetRouteSolver::new()
            .solve(&orders, &fleet(&[10.0]), depot(), &SolverConfig::default(), None)
            .unwrap_err();
        assert!(matches!(err, PlanError::MissingRequiredField { field: "coordinate", .. }));
    }

    struct AlwaysTimeout;

    impl RoutingSolver for AlwaysTimeout {
        fn solve(&self, _: &RoutingModel, _: &SolverConfig, _: Option<Arc<AtomicBool>>) -> RoutingSolution {
            RoutingSolution::empty(SolverStatus::Timeout)
        }
    }

    #[test]
    fn test_custom_solver_timeout() {
        let orders = orders(&[1.0]);
        let err = FleetRouteSolver::with_solver(AlwaysTimeout)
            .solve(&orders, &fleet(&[10.0]), depot(), &SolverConfig::default(), None)
            .unwrap_err();
        assert_eq!(err, PlanError::NoFeasibleRoute("search budget expired".into()));
    }

    #[test]
    fn test_annotate_writes_loads_and_sequence() {
        let mut orders = orders(&[10.0, 20.0, 30.0]);
        let plan = FleetRouteSolver::new()
            .solve(&orders, &fleet(&[35.0, 35.0]), depot(), &SolverConfig::default(), None)
            .unwrap();
        let loads = plan.annotate(&mut orders);

        assert_eq!(loads.len(), plan.used_vehicles());
        assert_eq!(loads[0].id, LoadId(1));
        for load in &loads {
            for (pos, id) in load.orders.iter().enumerate() {
                let order = orders.iter().find(|o| o.id() == *id).unwrap();
                assert_eq!(order.sequence(), Some(pos + 1));
                assert_eq!(order.vehicle(), Some(load.vehicle));
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_every_stop_routed_once(
            weights in prop::collection::vec(0.0f64..20.0, 1..12),
            capacities in prop::collection::vec(20.0f64..60.0, 1..4),
        ) {
            let orders = orders(&weights);
            let fleet = fleet(&capacities);
            let config = SolverConfig::default().with_node_limit(5_000);
            if let Ok(plan) = FleetRouteSolver::new().solve(&orders, &fleet, depot(), &config, None) {
                let mut seen = HashSet::new();
                for (vehicle, route) in &plan.routes {
                    let cap = fleet[vehicle.0].weight_capacity();
                    let load: f64 = route.stops.iter().map(|id| orders[id.0].weight()).sum();
                    prop_assert!(load <= cap + 1e-6);
                    for id in &route.stops {
                        prop_assert!(seen.insert(*id));
                    }
                }
                prop_assert_eq!(seen.len(), orders.len());
            }
        }
    }
}
