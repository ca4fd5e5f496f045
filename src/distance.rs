//! Geodesic distances and per-problem distance matrices.
//!
//! Distances are great-circle (haversine) meters. A matrix is built fresh for
//! every problem instance and never persisted.

use geo::{Distance, Haversine};

use crate::error::{PlanError, Result};
use crate::models::Coordinate;

pub(crate) fn haversine(from: &Coordinate, to: &Coordinate) -> f64 {
    Haversine.distance(geo::Point::from(*from), geo::Point::from(*to))
}

/// Great-circle distance in meters between two raw `(lat, lon)` pairs.
///
/// # Errors
///
/// [`PlanError::InvalidCoordinate`] if either pair is out of range.
///
/// # Examples
///
/// ```
/// use u_routeplan::distance::geodesic_distance;
///
/// let d = geodesic_distance((0.0, 0.0), (0.0, 1.0)).unwrap();
/// assert!((d - 111_195.0).abs() < 100.0);
/// assert!(geodesic_distance((91.0, 0.0), (0.0, 0.0)).is_err());
/// ```
pub fn geodesic_distance(from: (f64, f64), to: (f64, f64)) -> Result<f64> {
    let a = Coordinate::new(from.0, from.1)?;
    let b = Coordinate::new(to.0, to.1)?;
    Ok(haversine(&a, &b))
}

/// Dense, row-major pairwise distance matrix.
///
/// By convention node 0 is the depot when the matrix is built with
/// [`DistanceMatrix::with_depot`].
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds the full pairwise matrix over `points`.
    pub fn from_coordinates(points: &[Coordinate]) -> Self {
        let n = points.len();
        let row = |i: usize| -> Vec<f64> { points.iter().map(|p| haversine(&points[i], p)).collect() };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<f64>> = {
            use rayon::prelude::*;
            (0..n).into_par_iter().map(row).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<f64>> = (0..n).map(row).collect();

        Self {
            n,
            data: rows.into_iter().flatten().collect(),
        }
    }

    /// Builds a matrix whose node 0 is `depot` and nodes `1..=stops.len()`
    /// are the stops in order.
    pub fn with_depot(depot: Coordinate, stops: &[Coordinate]) -> Self {
        let mut points = Vec::with_capacity(stops.len() + 1);
        points.push(depot);
        points.extend_from_slice(stops);
        Self::from_coordinates(&points)
    }

    /// Wraps precomputed distances (row-major, `n * n` entries).
    ///
    /// # Errors
    ///
    /// [`PlanError::InvalidValue`] if the length is not a square or any
    /// entry is negative or non-finite.
    pub fn from_raw(n: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n * n {
            return Err(PlanError::InvalidValue {
                record: "distance matrix".into(),
                field: "data",
                reason: format!("expected {} entries, got {}", n * n, data.len()),
            });
        }
        if let Some(bad) = data.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(PlanError::InvalidValue {
                record: "distance matrix".into(),
                field: "data",
                reason: format!("entry {bad} is not a finite non-negative distance"),
            });
        }
        Ok(Self { n, data })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance from node `i` to node `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Length of the closed tour over `nodes`, including the edge back to
    /// the first node.
    pub fn tour_length(&self, nodes: &[usize]) -> f64 {
        if nodes.len() < 2 {
            return 0.0;
        }
        let open = self.path_length(nodes);
        open + self.get(nodes[nodes.len() - 1], nodes[0])
    }

    /// Length of the open path over `nodes`.
    pub fn path_length(&self, nodes: &[usize]) -> f64 {
        nodes.windows(2).map(|w| self.get(w[0], w[1])).sum()
    }

    /// Length of a depot-rooted route: depot → stops → depot.
    pub fn route_length(&self, depot: usize, stops: &[usize]) -> f64 {
        match (stops.first(), stops.last()) {
            (Some(&first), Some(&last)) => {
                self.get(depot, first) + self.path_length(stops) + self.get(last, depot)
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_invalid_latitude_rejected() {
        assert_eq!(
            geodesic_distance((91.0, 0.0), (0.0, 0.0)),
            Err(PlanError::InvalidCoordinate { lat: 91.0, lon: 0.0 })
        );
        assert!(geodesic_distance((0.0, 0.0), (0.0, -181.0)).is_err());
    }

    #[test]
    fn test_one_degree_on_equator() {
        let d = geodesic_distance((0.0, 0.0), (0.0, 1.0)).unwrap();
        // 1° of arc on a ~6371 km sphere
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_matrix_is_symmetric_with_zero_diagonal() {
        let points = [coord(-23.08, -47.13), coord(-23.10, -47.20), coord(-23.00, -47.05)];
        let m = DistanceMatrix::from_coordinates(&points);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 0.0);
            for j in 0..3 {
                assert!((m.get(i, j) - m.get(j, i)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_with_depot_puts_depot_first() {
        let depot = coord(0.0, 0.0);
        let stops = [coord(0.0, 1.0), coord(1.0, 0.0)];
        let m = DistanceMatrix::with_depot(depot, &stops);
        assert_eq!(m.len(), 3);
        assert!((m.get(0, 1) - depot.distance_to(&stops[0])).abs() < 1e-9);
    }

    #[test]
    fn test_tour_and_route_lengths() {
        let m = DistanceMatrix::from_raw(3, vec![0.0, 1.0, 2.0, 1.0, 0.0, 3.0, 2.0, 3.0, 0.0]).unwrap();
        assert_eq!(m.path_length(&[0, 1, 2]), 4.0);
        assert_eq!(m.tour_length(&[0, 1, 2]), 6.0);
        assert_eq!(m.route_length(0, &[1, 2]), 6.0);
        assert_eq!(m.route_length(0, &[]), 0.0);
        assert_eq!(m.tour_length(&[1]), 0.0);
    }

    #[test]
    fn test_from_raw_rejects_bad_shape() {
        assert!(DistanceMatrix::from_raw(2, vec![0.0; 3]).is_err());
        assert!(DistanceMatrix::from_raw(1, vec![-1.0]).is_err());
    }
}
