//! Fleet vehicles and capacity arithmetic.

use std::fmt;

/// Identifier of a vehicle within one fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleId(pub usize);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vehicle {}", self.0)
    }
}

/// Weight and box capacity, possibly scaled by a utilization factor.
///
/// Boxes are kept as `f64` because scaling a box capacity by a percentage
/// yields fractional limits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capacity {
    pub weight: f64,
    pub boxes: f64,
}

impl Capacity {
    pub fn new(weight: f64, boxes: f64) -> Self {
        Self { weight, boxes }
    }

    /// Scales both dimensions by `percent / 100`.
    pub fn scaled(self, percent: f64) -> Self {
        let factor = percent / 100.0;
        Self {
            weight: self.weight * factor,
            boxes: self.boxes * factor,
        }
    }

    /// Whether an item of the given size fits in what is left.
    pub fn fits(&self, weight: f64, boxes: u32) -> bool {
        weight <= self.weight && f64::from(boxes) <= self.boxes
    }

    /// Removes an item's size from the remaining capacity.
    pub fn consume(&mut self, weight: f64, boxes: u32) {
        self.weight -= weight;
        self.boxes -= f64::from(boxes);
    }
}

/// A delivery vehicle.
///
/// Only vehicles flagged `available` take part in allocation and routing.
///
/// # Examples
///
/// ```
/// use u_routeplan::models::{Vehicle, VehicleId};
///
/// let truck = Vehicle::new(VehicleId(0), "ABC1D23", 1200.0, 80);
/// assert!(truck.is_available());
/// assert_eq!(truck.capacity().weight, 1200.0);
///
/// let parked = truck.clone().with_available(false);
/// assert!(!parked.is_available());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    id: VehicleId,
    plate: String,
    weight_capacity: f64,
    box_capacity: u32,
    available: bool,
}

impl Vehicle {
    /// Creates an available vehicle.
    pub fn new(id: VehicleId, plate: impl Into<String>, weight_capacity: f64, box_capacity: u32) -> Self {
        Self {
            id,
            plate: plate.into(),
            weight_capacity,
            box_capacity,
            available: true,
        }
    }

    /// Sets the availability flag.
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// License plate.
    pub fn plate(&self) -> &str {
        &self.plate
    }

    /// Raw weight capacity in kilograms.
    pub fn weight_capacity(&self) -> f64 {
        self.weight_capacity
    }

    /// Raw box capacity.
    pub fn box_capacity(&self) -> u32 {
        self.box_capacity
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Raw capacity as a [`Capacity`].
    pub fn capacity(&self) -> Capacity {
        Capacity::new(self.weight_capacity, f64::from(self.box_capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_capacity() {
        let cap = Capacity::new(1000.0, 50.0).scaled(80.0);
        assert!((cap.weight - 800.0).abs() < 1e-9);
        assert!((cap.boxes - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_fits_and_consume() {
        let mut cap = Capacity::new(40.0, 3.0);
        assert!(cap.fits(40.0, 3));
        assert!(!cap.fits(40.1, 1));
        assert!(!cap.fits(1.0, 4));

        cap.consume(25.0, 2);
        assert!(cap.fits(15.0, 1));
        assert!(!cap.fits(15.0, 2));
    }
}
