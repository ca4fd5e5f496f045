//! GeoClusterer: spatial grouping of orders.
//!
//! Orders are first partitioned by a [`Grouping`] key, then each partition
//! is split into at most `k` clusters by seeded k-means on projected
//! coordinates. A partition with a single order, or whose points allow only
//! one cluster, skips k-means and gets cluster index 0.

mod config;
mod kmeans;
mod runner;

pub use config::{ClusterConfig, Grouping};
pub use runner::{ClusterOutcome, GeoClusterer};
