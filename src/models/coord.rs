//! Validated geographic coordinates.

use crate::error::{PlanError, Result};

/// A latitude/longitude pair in decimal degrees.
///
/// Construction validates the ranges, so every `Coordinate` in the system
/// is usable for distance computation. There is no "zero" fallback: an
/// order that could not be geocoded carries `None` instead.
///
/// # Examples
///
/// ```
/// use u_routeplan::models::Coordinate;
///
/// let depot = Coordinate::new(-23.0838, -47.1336).unwrap();
/// assert_eq!(depot.lat(), -23.0838);
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "[f64; 2]", into = "[f64; 2]")
)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if !valid {
            return Err(PlanError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance to `other`, in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        crate::distance::haversine(self, other)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Point::new(c.lon, c.lat)
    }
}

impl TryFrom<[f64; 2]> for Coordinate {
    type Error = PlanError;

    fn try_from(value: [f64; 2]) -> Result<Self> {
        Self::new(value[0], value[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lon]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(
            Coordinate::new(91.0, 0.0),
            Err(PlanError::InvalidCoordinate { lat: 91.0, lon: 0.0 })
        );
        assert!(Coordinate::new(0.0, 180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_point_is_lon_lat() {
        let c = Coordinate::new(10.0, 20.0).unwrap();
        let p: geo::Point<f64> = c.into();
        assert_eq!(p.x(), 20.0);
        assert_eq!(p.y(), 10.0);
    }
}
