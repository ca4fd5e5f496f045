//! Delivery load planning.
//!
//! Assigns geolocated delivery orders to a capacity-constrained fleet and
//! orders the stops of every resulting load:
//!
//! - **GeoClusterer** ([`cluster`]): partitions orders by region, then
//!   groups each partition spatially with seeded k-means.
//! - **CapacityAllocator** ([`allocate`]): first-fit packing of each
//!   cluster into vehicle loads under weight, box and per-load limits.
//! - **SequenceOptimizer** ([`sequence`]): closed-tour search through the
//!   depot and a load's stops with a genetic algorithm ([`ga`]).
//! - **FleetRouteSolver** ([`fleet`]): capacitated vehicle routing over the
//!   whole order set under an explicit search budget.
//!
//! [`planner::Planner`] chains clustering, allocation and sequencing.
//! Dataset rows enter through [`ingest`] and missing coordinates are filled
//! through [`geocode`]. Distances are great-circle meters ([`distance`]).
//!
//! # Features
//!
//! - `parallel`: rayon-based fitness evaluation, matrix construction and
//!   per-load sequencing
//! - `serde`: `Serialize`/`Deserialize` for models, records and configs
//!
//! Logging goes through `tracing`; the crate never installs a subscriber.

pub mod allocate;
pub mod cluster;
pub mod distance;
pub mod error;
pub mod fleet;
pub mod ga;
pub mod geocode;
pub mod ingest;
pub mod models;
pub mod planner;
pub mod sequence;

pub use error::{PlanError, Result};
