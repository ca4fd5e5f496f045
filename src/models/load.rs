//! Loads: groups of orders carried by one vehicle on one trip.

use std::fmt;

use super::cluster::ClusterId;
use super::order::OrderId;
use super::vehicle::VehicleId;

/// Load number, starting at 1 for each allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadId(pub u32);

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load {}", self.0)
    }
}

/// A route unit: orders assigned to one vehicle for one trip.
///
/// `orders` is in allocation order until the load is sequenced, after which
/// it holds the visiting order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Load {
    pub id: LoadId,
    pub vehicle: VehicleId,
    pub cluster: ClusterId,
    /// Trip of `vehicle` this load rides on (1-based).
    pub trip: usize,
    pub orders: Vec<OrderId>,
    /// Total weight of the orders.
    pub weight: f64,
    /// Total box count of the orders.
    pub boxes: u32,
}

impl Load {
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
