//! CapacityAllocator: clustered orders → vehicle loads.
//!
//! A [`VehiclePool`](pool::VehiclePool) holds the remaining capacity of every
//! available vehicle and is owned by one allocation pass; clusters are
//! processed one after another against it, so capacity is never decremented
//! by two writers.

mod config;
mod pool;
mod runner;

pub use config::AllocationConfig;
pub use runner::{AllocationOutcome, CapacityAllocator};
