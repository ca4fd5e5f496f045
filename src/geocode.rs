//! Geocoding boundary: address → coordinate lookups behind a cache.
//!
//! The planning algorithms never geocode. This module is the seam where an
//! ingestion layer attaches coordinates to orders before clustering: it
//! consults a local [`GeocodeCache`] first and only then calls the
//! [`Geocoder`] collaborator, recording every answer (including "not found")
//! back into the cache.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{Coordinate, Order, OrderId};

/// Address lookup capability.
///
/// Implementations wrap an external service. `Ok(None)` means the address is
/// unknown to the service; `Err` (typically
/// [`PlanError::ExternalService`](crate::error::PlanError::ExternalService))
/// means the service itself failed.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>>;
}

impl<F> Geocoder for F
where
    F: Fn(&str) -> Result<Option<Coordinate>>,
{
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>> {
        self(address)
    }
}

/// Address → coordinate cache.
///
/// Negative answers are cached too, so an unknown address is not looked up
/// again within the cache's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeocodeCache {
    entries: HashMap<String, Option<Coordinate>>,
}

impl GeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached answer for `address`: `None` if never looked up,
    /// `Some(None)` if known to be not found.
    pub fn get(&self, address: &str) -> Option<Option<Coordinate>> {
        self.entries.get(&normalize(address)).copied()
    }

    pub fn insert(&mut self, address: &str, coordinate: Option<Coordinate>) {
        self.entries.insert(normalize(address), coordinate);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Coordinate>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

fn normalize(address: &str) -> String {
    address.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Summary of one [`attach_coordinates`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeReport {
    /// Calls made to the geocoder.
    pub lookups: usize,
    /// Orders answered from the cache.
    pub cache_hits: usize,
    /// Orders that received a coordinate in this pass.
    pub resolved: usize,
    /// Orders left without a coordinate.
    pub not_found: Vec<OrderId>,
}

/// Fills in coordinates for orders that have none.
///
/// Orders that already carry a coordinate are left untouched.
///
/// # Errors
///
/// Propagates the first geocoder failure. Orders processed before the
/// failure keep their new coordinates and the cache keeps their answers.
pub fn attach_coordinates<G: Geocoder + ?Sized>(
    orders: &mut [Order],
    geocoder: &G,
    cache: &mut GeocodeCache,
) -> Result<GeocodeReport> {
    let mut report = GeocodeReport::default();

    for order in orders.iter_mut().filter(|o| o.coordinate().is_none()) {
        let answer = match cache.get(order.address()) {
            Some(cached) => {
                report.cache_hits += 1;
                cached
            }
            None => {
                report.lookups += 1;
                let found = geocoder.geocode(order.address())?;
                cache.insert(order.address(), found);
                found
            }
        };

        match answer {
            Some(coordinate) => {
                order.set_coordinate(Some(coordinate));
                report.resolved += 1;
            }
            None => {
                warn!(order = order.id().0, address = order.address(), "address not found");
                report.not_found.push(order.id());
            }
        }
    }

    debug!(
        lookups = report.lookups,
        cache_hits = report.cache_hits,
        resolved = report.resolved,
        not_found = report.not_found.len(),
        "geocoding pass finished"
    );
    Ok(report)
}
