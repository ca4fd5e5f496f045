//! Delivery orders and their planning annotations.

use std::fmt;

use super::cluster::ClusterId;
use super::coord::Coordinate;
use super::load::LoadId;
use super::vehicle::VehicleId;

/// Identifier of an order within one planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderId(pub usize);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order {}", self.0)
    }
}

/// Outcome of capacity allocation for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Allocation {
    /// Placed on a load carried by a vehicle.
    Assigned { load: LoadId, vehicle: VehicleId },
    /// No vehicle had room for the order.
    Unassigned,
}

/// A geolocated delivery order.
///
/// The order is created from an uploaded dataset and annotated in place by
/// each stage: cluster id, then allocation, then sequence position.
///
/// # Examples
///
/// ```
/// use u_routeplan::models::{Coordinate, Order, OrderId};
///
/// let order = Order::new(OrderId(1), "Rua A, 10", 12.5, 3)
///     .with_coordinate(Coordinate::new(-23.1, -47.2).unwrap());
/// assert!(order.coordinate().is_some());
/// assert!(order.cluster().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    id: OrderId,
    address: String,
    coordinate: Option<Coordinate>,
    weight: f64,
    boxes: u32,
    region: Option<String>,
    sub_region: Option<String>,
    cluster: Option<ClusterId>,
    allocation: Option<Allocation>,
    sequence: Option<usize>,
}

impl Order {
    /// Creates an order without coordinates or annotations.
    pub fn new(id: OrderId, address: impl Into<String>, weight: f64, boxes: u32) -> Self {
        Self {
            id,
            address: address.into(),
            coordinate: None,
            weight,
            boxes,
            region: None,
            sub_region: None,
            cluster: None,
            allocation: None,
            sequence: None,
        }
    }

    /// Attaches a geocoded position.
    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }

    /// Sets the primary grouping field.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the secondary grouping field.
    pub fn with_sub_region(mut self, sub_region: impl Into<String>) -> Self {
        self.sub_region = Some(sub_region.into());
        self
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Full delivery address used for geocoding.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    /// Weight in kilograms.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Number of boxes.
    pub fn boxes(&self) -> u32 {
        self.boxes
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn sub_region(&self) -> Option<&str> {
        self.sub_region.as_deref()
    }

    /// Cluster assigned by the clusterer, stable for the run.
    pub fn cluster(&self) -> Option<&ClusterId> {
        self.cluster.as_ref()
    }

    /// Allocation outcome, `None` before allocation has run.
    pub fn allocation(&self) -> Option<Allocation> {
        self.allocation
    }

    /// Load the order was placed on, if any.
    pub fn load(&self) -> Option<LoadId> {
        match self.allocation {
            Some(Allocation::Assigned { load, .. }) => Some(load),
            _ => None,
        }
    }

    /// Vehicle carrying the order, if any.
    pub fn vehicle(&self) -> Option<VehicleId> {
        match self.allocation {
            Some(Allocation::Assigned { vehicle, .. }) => Some(vehicle),
            _ => None,
        }
    }

    /// 1-based delivery position within the order's load.
    pub fn sequence(&self) -> Option<usize> {
        self.sequence
    }

    pub(crate) fn set_coordinate(&mut self, coordinate: Option<Coordinate>) {
        self.coordinate = coordinate;
    }

    pub(crate) fn set_cluster(&mut self, cluster: Option<ClusterId>) {
        self.cluster = cluster;
    }

    pub(crate) fn set_allocation(&mut self, allocation: Allocation) {
        self.allocation = Some(allocation);
    }

    pub(crate) fn set_sequence(&mut self, sequence: Option<usize>) {
        self.sequence = sequence;
    }
}
