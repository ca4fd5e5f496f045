//! Remaining capacity of the available fleet during one allocation pass.

use crate::models::{Capacity, Vehicle, VehicleId};

/// One vehicle's state within the pool.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VehicleSlot {
    pub vehicle: VehicleId,
    /// Scaled capacity of a fresh trip.
    pub full: Capacity,
    /// Capacity left on the current trip.
    pub remaining: Capacity,
    /// Trips started so far (the first one is open from the start).
    pub trips: usize,
}

/// Fleet capacity owned by a single allocation pass.
///
/// Slots follow fleet order. Only available vehicles are admitted.
#[derive(Debug, Clone)]
pub(crate) struct VehiclePool {
    slots: Vec<VehicleSlot>,
    max_trips: Option<usize>,
}

impl VehiclePool {
    pub fn new(fleet: &[Vehicle], utilization_percent: f64, max_trips: Option<usize>) -> Self {
        let slots = fleet
            .iter()
            .filter(|v| v.is_available())
            .map(|v| {
                let full = v.capacity().scaled(utilization_percent);
                VehicleSlot {
                    vehicle: v.id(),
                    full,
                    remaining: full,
                    trips: 1,
                }
            })
            .collect();
        Self { slots, max_trips }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, idx: usize) -> &VehicleSlot {
        &self.slots[idx]
    }

    pub fn slot_mut(&mut self, idx: usize) -> &mut VehicleSlot {
        &mut self.slots[idx]
    }

    /// Starts a new trip on the first vehicle whose fresh capacity fits
    /// `fits`, if trip limits allow. Returns the slot index.
    pub fn open_trip(&mut self, fits: impl Fn(&Capacity) -> bool) -> Option<usize> {
        let max_trips = self.max_trips;
        let idx = self
            .slots
            .iter()
            .position(|s| max_trips.map_or(true, |max| s.trips < max) && fits(&s.full))?;
        let slot = &mut self.slots[idx];
        slot.trips += 1;
        slot.remaining = slot.full;
        Some(idx)
    }
}
