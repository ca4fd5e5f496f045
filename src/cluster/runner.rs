//! GeoClusterer execution.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::config::{ClusterConfig, Grouping};
use super::kmeans::{self, KMeansParams};
use crate::error::{PlanError, Result};
use crate::models::{Cluster, ClusterId, Coordinate, Order, OrderId, PartitionKey};

/// Result of a clustering pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOutcome {
    /// Clusters ordered by partition, then index.
    pub clusters: Vec<Cluster>,
    /// Orders left out because they have no coordinate.
    pub skipped: Vec<OrderId>,
}

impl ClusterOutcome {
    pub fn cluster(&self, id: &ClusterId) -> Option<&Cluster> {
        self.clusters.iter().find(|c| &c.id == id)
    }
}

/// Groups orders into spatial clusters within each grouping partition.
///
/// # Examples
///
/// ```
/// use u_routeplan::cluster::{ClusterConfig, GeoClusterer};
/// use u_routeplan::models::{Coordinate, Order, OrderId};
///
/// let mut orders: Vec<Order> = [(-23.10, -47.20), (-23.11, -47.21), (-22.90, -46.90)]
///     .iter()
///     .enumerate()
///     .map(|(i, &(lat, lon))| {
///         Order::new(OrderId(i), "addr", 1.0, 1).with_coordinate(Coordinate::new(lat, lon).unwrap())
///     })
///     .collect();
///
/// let outcome = GeoClusterer::run(&mut orders, &ClusterConfig::default().with_clusters(2)).unwrap();
/// assert_eq!(outcome.clusters.len(), 2);
/// assert_eq!(orders[0].cluster(), orders[1].cluster());
/// ```
pub struct GeoClusterer;

impl GeoClusterer {
    /// Annotates every order that has a coordinate with a cluster id.
    ///
    /// Orders without a coordinate are cleared of any previous cluster id and
    /// listed in [`ClusterOutcome::skipped`].
    ///
    /// # Errors
    ///
    /// - [`PlanError::InsufficientData`] if no order has a coordinate
    /// - [`PlanError::MissingRequiredField`] if an order lacks a grouping field
    /// - [`PlanError::InvalidConfig`] if `config` does not validate
    pub fn run(orders: &mut [Order], config: &ClusterConfig) -> Result<ClusterOutcome> {
        config.validate()?;
        if orders.is_empty() {
            return Err(PlanError::InsufficientData("no orders to cluster".into()));
        }

        let mut skipped = Vec::new();
        let mut partitions: BTreeMap<PartitionKey, Vec<usize>> = BTreeMap::new();
        for (idx, order) in orders.iter().enumerate() {
            if order.coordinate().is_none() {
                skipped.push(order.id());
                continue;
            }
            let key = partition_key(order, &config.grouping)?;
            partitions.entry(key).or_default().push(idx);
        }

        if partitions.is_empty() {
            return Err(PlanError::InsufficientData(format!(
                "none of the {} orders has a coordinate",
                orders.len()
            )));
        }
        if !skipped.is_empty() {
            warn!(count = skipped.len(), "orders without coordinates left out of clustering");
        }

        let jobs: Vec<(PartitionKey, Vec<usize>, Vec<Coordinate>)> = partitions
            .into_iter()
            .map(|(key, members)| {
                let coords = members.iter().filter_map(|&i| orders[i].coordinate()).collect();
                (key, members, coords)
            })
            .collect();

        let labelled: Vec<Vec<usize>> = label_partitions(&jobs, config)?;

        let mut clusters = Vec::new();
        for ((key, members, coords), labels) in jobs.into_iter().zip(labelled) {
            let k = labels.iter().max().map_or(0, |m| m + 1);
            debug!(partition = %key, orders = members.len(), clusters = k, "partition clustered");

            for index in 0..k {
                let picked: Vec<usize> = (0..members.len()).filter(|&m| labels[m] == index).collect();
                let id = ClusterId::new(key.clone(), index);
                for &m in &picked {
                    orders[members[m]].set_cluster(Some(id.clone()));
                }
                let centroid = mean_coordinate(picked.iter().map(|&m| &coords[m]))?;
                clusters.push(Cluster {
                    id,
                    members: picked.iter().map(|&m| orders[members[m]].id()).collect(),
                    centroid,
                });
            }
        }
        for order in orders.iter_mut().filter(|o| o.coordinate().is_none()) {
            order.set_cluster(None);
        }

        info!(clusters = clusters.len(), skipped = skipped.len(), "clustering finished");
        Ok(ClusterOutcome { clusters, skipped })
    }
}

fn label_partitions(
    jobs: &[(PartitionKey, Vec<usize>, Vec<Coordinate>)],
    config: &ClusterConfig,
) -> Result<Vec<Vec<usize>>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        jobs.par_iter().map(|(_, _, coords)| label_partition(coords, config)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        jobs.iter().map(|(_, _, coords)| label_partition(coords, config)).collect()
    }
}

/// Cluster label for each coordinate of one partition.
fn label_partition(coords: &[Coordinate], config: &ClusterConfig) -> Result<Vec<usize>> {
    let points = kmeans::project(coords);
    let k = config.clusters.min(points.len());
    if points.len() <= 1 || k <= 1 {
        return Ok(vec![0; points.len()]);
    }
    let k = k.min(kmeans::distinct_points(&points));
    if k <= 1 {
        return Ok(vec![0; points.len()]);
    }

    let params = KMeansParams {
        k,
        max_iterations: config.max_iterations,
        tolerance: config.tolerance,
        restarts: config.restarts,
        // same seed for every partition keeps each one reproducible on its own
        seed: config.seed,
    };
    kmeans::fit(&points, &params)
}

fn partition_key(order: &Order, grouping: &Grouping) -> Result<PartitionKey> {
    let region = || {
        order.region().map(str::to_owned).ok_or_else(|| PlanError::MissingRequiredField {
            record: order.id().to_string(),
            field: "region",
        })
    };

    match grouping {
        Grouping::None => Ok(PartitionKey::default()),
        Grouping::Region => Ok(PartitionKey {
            region: Some(region()?),
            sub_region: None,
        }),
        Grouping::RegionThenSubRegion { region: split } => {
            let region = region()?;
            let sub_region = if &region == split {
                let sub = order.sub_region().ok_or_else(|| PlanError::MissingRequiredField {
                    record: order.id().to_string(),
                    field: "sub_region",
                })?;
                Some(sub.to_owned())
            } else {
                None
            };
            Ok(PartitionKey {
                region: Some(region),
                sub_region,
            })
        }
    }
}

fn mean_coordinate<'a>(coords: impl Iterator<Item = &'a Coordinate>) -> Result<Coordinate> {
    let (mut lat, mut lon, mut n) = (0.0, 0.0, 0usize);
    for c in coords {
        lat += c.lat();
        lon += c.lon();
        n += 1;
    }
    if n == 0 {
        return Err(PlanError::InsufficientData("empty cluster".into()));
    }
    Coordinate::new(lat / n as f64, lon / n as f64)
}
