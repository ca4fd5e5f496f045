//! CapacityAllocator execution.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::config::AllocationConfig;
use super::pool::VehiclePool;
use crate::error::{PlanError, Result};
use crate::models::{Allocation, ClusterId, Load, LoadId, Order, OrderId, Vehicle, VehicleId};

/// Result of an allocation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    /// Loads in creation order; ids run from 1.
    pub loads: Vec<Load>,
    /// Orders no vehicle could take, in input order per cluster.
    pub unassigned: Vec<OrderId>,
}

impl AllocationOutcome {
    pub fn load(&self, id: LoadId) -> Option<&Load> {
        self.loads.iter().find(|l| l.id == id)
    }

    pub fn assigned_count(&self) -> usize {
        self.loads.iter().map(Load::len).sum()
    }
}

/// First-fit assignment of clustered orders to vehicle loads.
///
/// Clusters are visited in id order and, within a cluster, orders keep their
/// input order. For each vehicle in fleet order, orders are taken while they
/// fit the vehicle's remaining capacity, up to `max_per_load`, and become one
/// load. When a round over the fleet places nothing, a vehicle whose fresh
/// capacity fits a pending order starts another trip.
///
/// This is a greedy heuristic: it never reorders or repacks, so it can use
/// more loads than an optimal packing would.
///
/// # Examples
///
/// ```
/// use u_routeplan::allocate::{AllocationConfig, CapacityAllocator};
/// use u_routeplan::models::{ClusterId, Order, OrderId, Vehicle, VehicleId};
///
/// let fleet = vec![Vehicle::new(VehicleId(0), "ABC1D23", 40.0, 100)];
/// let mut orders: Vec<Order> = [10.0, 20.0, 5.0, 15.0, 8.0, 12.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &w)| Order::new(OrderId(i), "addr", w, 1))
///     .collect();
/// CapacityAllocator::assign_single_cluster(&mut orders, ClusterId::default());
///
/// let config = AllocationConfig::default().with_max_per_load(3);
/// let outcome = CapacityAllocator::allocate(&mut orders, &fleet, &config).unwrap();
/// assert!(outcome.loads.len() >= 2);
/// assert!(outcome.unassigned.is_empty());
/// ```
pub struct CapacityAllocator;

impl CapacityAllocator {
    /// Assigns every order to a load or marks it [`Allocation::Unassigned`].
    ///
    /// Orders without a cluster id are unassigned. Previous allocation and
    /// sequence annotations are overwritten.
    ///
    /// # Errors
    ///
    /// - [`PlanError::NoAvailableVehicle`] if no vehicle is available
    /// - [`PlanError::InvalidConfig`] if `config` does not validate
    pub fn allocate(
        orders: &mut [Order],
        fleet: &[Vehicle],
        config: &AllocationConfig,
    ) -> Result<AllocationOutcome> {
        config.validate()?;
        let mut pool =
            VehiclePool::new(fleet, config.utilization_percent, config.max_trips_per_vehicle);
        if pool.is_empty() {
            return Err(PlanError::NoAvailableVehicle);
        }

        let mut clusters: BTreeMap<ClusterId, Vec<usize>> = BTreeMap::new();
        let mut unassigned = Vec::new();
        for (idx, order) in orders.iter_mut().enumerate() {
            order.set_sequence(None);
            match order.cluster() {
                Some(cluster) => clusters.entry(cluster.clone()).or_default().push(idx),
                None => {
                    order.set_allocation(Allocation::Unassigned);
                    unassigned.push(order.id());
                }
            }
        }

        let mut loads = Vec::new();
        let mut next_load = 1u32;
        for (cluster, members) in clusters {
            let leftover = fill_cluster(
                orders,
                &cluster,
                members,
                &mut pool,
                config,
                &mut next_load,
                &mut loads,
            );
            if !leftover.is_empty() {
                warn!(cluster = %cluster, count = leftover.len(), "orders left unassigned");
            }
            for idx in leftover {
                orders[idx].set_allocation(Allocation::Unassigned);
                unassigned.push(orders[idx].id());
            }
        }

        info!(
            loads = loads.len(),
            assigned = loads.iter().map(Load::len).sum::<usize>(),
            unassigned = unassigned.len(),
            "allocation finished"
        );
        Ok(AllocationOutcome { loads, unassigned })
    }

    /// Puts every order into `cluster`, for callers that skip clustering.
    pub fn assign_single_cluster(orders: &mut [Order], cluster: ClusterId) {
        for order in orders {
            order.set_cluster(Some(cluster.clone()));
        }
    }
}

/// Allocates one cluster; returns the indices left over.
fn fill_cluster(
    orders: &mut [Order],
    cluster: &ClusterId,
    mut pending: Vec<usize>,
    pool: &mut VehiclePool,
    config: &AllocationConfig,
    next_load: &mut u32,
    loads: &mut Vec<Load>,
) -> Vec<usize> {
    while !pending.is_empty() {
        let mut progressed = false;

        for slot_idx in 0..pool.len() {
            if pending.is_empty() {
                break;
            }
            let slot = pool.slot_mut(slot_idx);
            let mut remaining = slot.remaining;
            let mut batch = Vec::new();
            pending.retain(|&idx| {
                let order = &orders[idx];
                if batch.len() < config.max_per_load && remaining.fits(order.weight(), order.boxes()) {
                    remaining.consume(order.weight(), order.boxes());
                    batch.push(idx);
                    false
                } else {
                    true
                }
            });
            if batch.is_empty() {
                continue;
            }

            slot.remaining = remaining;
            let (vehicle, trip) = (slot.vehicle, slot.trips);
            let load = commit_load(orders, cluster, &batch, vehicle, trip, LoadId(*next_load));
            debug!(
                load = load.id.0,
                vehicle = vehicle.0,
                trip,
                orders = load.len(),
                weight = load.weight,
                "load built"
            );
            loads.push(load);
            *next_load += 1;
            progressed = true;
        }

        if !progressed {
            let opened = pool.open_trip(|full| {
                pending
                    .iter()
                    .any(|&idx| full.fits(orders[idx].weight(), orders[idx].boxes()))
            });
            match opened {
                Some(slot_idx) => {
                    let slot = pool.slot(slot_idx);
                    debug!(vehicle = slot.vehicle.0, trip = slot.trips, "new trip started");
                }
                None => break,
            }
        }
    }
    pending
}

fn commit_load(
    orders: &mut [Order],
    cluster: &ClusterId,
    batch: &[usize],
    vehicle: VehicleId,
    trip: usize,
    id: LoadId,
) -> Load {
    let mut weight = 0.0;
    let mut boxes = 0u32;
    let mut members = Vec::with_capacity(batch.len());
    for &idx in batch {
        let order = &mut orders[idx];
        order.set_allocation(Allocation::Assigned { load: id, vehicle });
        weight += order.weight();
        boxes += order.boxes();
        members.push(order.id());
    }
    Load {
        id,
        vehicle,
        cluster: cluster.clone(),
        trip,
        orders: members,
        weight,
        boxes,
    }
}
