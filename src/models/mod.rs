//! Strongly typed planning records.
//!
//! - [`Order`]: a delivery with optional coordinates and the annotations
//!   each stage writes (cluster, allocation, sequence)
//! - [`Vehicle`]: a fleet member with weight/box capacity
//! - [`Cluster`]: a spatial group of orders
//! - [`Load`]: orders assigned to one vehicle for one trip

mod cluster;
mod coord;
mod load;
mod order;
mod vehicle;

pub use cluster::{Cluster, ClusterId, PartitionKey};
pub use coord::Coordinate;
pub use load::{Load, LoadId};
pub use order::{Allocation, Order, OrderId};
pub use vehicle::{Capacity, Vehicle, VehicleId};
