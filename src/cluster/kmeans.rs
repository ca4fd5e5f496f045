//! Seeded k-means over projected coordinates.
//!
//! Coordinates are projected onto a local equirectangular plane (meters)
//! centred on the partition, which is accurate at city scale. The fit itself
//! is `linfa-clustering`'s k-means (k-means++ starts, several runs, lowest
//! inertia kept), seeded so identical input gives identical labels.

use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::error::{PlanError, Result};
use crate::models::Coordinate;

const EARTH_RADIUS_M: f64 = 6_371_008.8;

pub(crate) struct KMeansParams {
    pub k: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub restarts: usize,
    pub seed: u64,
}

/// Projects coordinates onto a plane tangent at their mean latitude.
pub(crate) fn project(coords: &[Coordinate]) -> Vec<[f64; 2]> {
    if coords.is_empty() {
        return Vec::new();
    }
    let mean_lat = coords.iter().map(Coordinate::lat).sum::<f64>() / coords.len() as f64;
    let scale = mean_lat.to_radians().cos();
    coords
        .iter()
        .map(|c| {
            [
                c.lon().to_radians() * scale * EARTH_RADIUS_M,
                c.lat().to_radians() * EARTH_RADIUS_M,
            ]
        })
        .collect()
}

/// Number of distinct points; k-means cannot use more clusters than this.
pub(crate) fn distinct_points(points: &[[f64; 2]]) -> usize {
    let mut sorted: Vec<[f64; 2]> = points.to_vec();
    sorted.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    sorted.dedup();
    sorted.len()
}

/// Cluster of each point, numbered by first appearance.
///
/// `params.k` must be in `1..=distinct_points(points)`.
pub(crate) fn fit(points: &[[f64; 2]], params: &KMeansParams) -> Result<Vec<usize>> {
    let flat: Vec<f64> = points.iter().flat_map(|p| p.iter().copied()).collect();
    let records = Array2::from_shape_vec((points.len(), 2), flat)
        .map_err(|e| PlanError::InsufficientData(format!("k-means input: {e}")))?;
    let dataset = DatasetBase::from(records);

    let rng = Xoshiro256Plus::seed_from_u64(params.seed);
    let model = KMeans::params_with_rng(params.k, rng)
        .max_n_iterations(params.max_iterations as u64)
        .tolerance(params.tolerance)
        .n_runs(params.restarts.max(1))
        .fit(&dataset)
        .map_err(|e| PlanError::InsufficientData(format!("k-means: {e}")))?;

    let labels: Array1<usize> = model.predict(dataset.records());
    Ok(relabel(&labels.to_vec()))
}

/// Renumbers labels in order of first appearance so equal partitions get
/// equal labels regardless of centroid order.
fn relabel(labels: &[usize]) -> Vec<usize> {
    let mut mapping: Vec<Option<usize>> = vec![None; labels.iter().max().map_or(0, |m| m + 1)];
    let mut next = 0;
    labels
        .iter()
        .map(|&l| {
            *mapping[l].get_or_insert_with(|| {
                next += 1;
                next - 1
            })
        })
        .collect()
}
