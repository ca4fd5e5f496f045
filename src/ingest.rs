//! Dataset ingestion: raw records → validated [`Order`]s and [`Vehicle`]s.
//!
//! Records mirror spreadsheet rows: every field is optional so a missing
//! column surfaces as [`PlanError::MissingRequiredField`] instead of a
//! deserialization failure. Validation happens once, here, so the
//! algorithms can rely on well-formed inputs.

use crate::error::{PlanError, Result};
use crate::models::{Coordinate, Order, OrderId, Vehicle, VehicleId};

/// One row of the orders dataset.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OrderRecord {
    pub id: Option<usize>,
    /// Street address (required).
    pub address: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Weight in kilograms (required).
    pub weight: Option<f64>,
    /// Box count (required). Read as a number so spreadsheet cells like
    /// `-1` or `2.5` surface as [`PlanError::InvalidValue`].
    pub boxes: Option<f64>,
    pub region: Option<String>,
    pub sub_region: Option<String>,
}

/// One row of the fleet dataset.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VehicleRecord {
    pub id: Option<usize>,
    pub plate: Option<String>,
    pub weight_capacity: Option<f64>,
    /// Whole number of boxes, validated like [`OrderRecord::boxes`].
    pub box_capacity: Option<f64>,
    pub available: Option<bool>,
}

/// Converts order records, failing on the first invalid row.
///
/// Rows without an `id` get their position in `records`.
pub fn orders_from_records(records: Vec<OrderRecord>) -> Result<Vec<Order>> {
    records
        .into_iter()
        .enumerate()
        .map(|(pos, rec)| order_from_record(pos, rec))
        .collect()
}

/// Converts vehicle records, failing on the first invalid row.
pub fn fleet_from_records(records: Vec<VehicleRecord>) -> Result<Vec<Vehicle>> {
    records
        .into_iter()
        .enumerate()
        .map(|(pos, rec)| vehicle_from_record(pos, rec))
        .collect()
}

fn order_from_record(pos: usize, rec: OrderRecord) -> Result<Order> {
    let id = OrderId(rec.id.unwrap_or(pos));
    let label = id.to_string();
    let missing = |field: &'static str| PlanError::MissingRequiredField {
        record: label.clone(),
        field,
    };

    let street = rec.address.filter(|s| !s.trim().is_empty()).ok_or_else(|| missing("address"))?;
    let weight = rec.weight.ok_or_else(|| missing("weight"))?;
    let boxes = rec.boxes.ok_or_else(|| missing("boxes"))?;

    if !weight.is_finite() || weight < 0.0 {
        return Err(PlanError::InvalidValue {
            record: label,
            field: "weight",
            reason: format!("{weight} is not a non-negative weight"),
        });
    }
    let boxes = whole_count(&label, "boxes", boxes)?;

    let address = compose_address(&street, rec.district.as_deref(), rec.city.as_deref());
    let mut order = Order::new(id, address, weight, boxes);

    match (rec.latitude, rec.longitude) {
        (Some(lat), Some(lon)) => order = order.with_coordinate(Coordinate::new(lat, lon)?),
        (Some(_), None) => return Err(missing("longitude")),
        (None, Some(_)) => return Err(missing("latitude")),
        (None, None) => {}
    }
    if let Some(region) = rec.region {
        order = order.with_region(region);
    }
    if let Some(sub_region) = rec.sub_region {
        order = order.with_sub_region(sub_region);
    }
    Ok(order)
}

fn vehicle_from_record(pos: usize, rec: VehicleRecord) -> Result<Vehicle> {
    let id = VehicleId(rec.id.unwrap_or(pos));
    let label = id.to_string();
    let missing = |field: &'static str| PlanError::MissingRequiredField {
        record: label.clone(),
        field,
    };

    let plate = rec.plate.filter(|s| !s.trim().is_empty()).ok_or_else(|| missing("plate"))?;
    let weight_capacity = rec.weight_capacity.ok_or_else(|| missing("weight_capacity"))?;
    let box_capacity = rec.box_capacity.ok_or_else(|| missing("box_capacity"))?;
    let box_capacity = whole_count(&label, "box_capacity", box_capacity)?;
    let available = rec.available.ok_or_else(|| missing("available"))?;

    if !weight_capacity.is_finite() || weight_capacity < 0.0 {
        return Err(PlanError::InvalidValue {
            record: label,
            field: "weight_capacity",
            reason: format!("{weight_capacity} is not a non-negative capacity"),
        });
    }

    Ok(Vehicle::new(id, plate, weight_capacity, box_capacity).with_available(available))
}

fn whole_count(record: &str, field: &'static str, value: f64) -> Result<u32> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(PlanError::InvalidValue {
            record: record.to_owned(),
            field,
            reason: format!("{value} is not a whole non-negative count"),
        });
    }
    Ok(value as u32)
}

/// Joins the non-empty address parts with `", "`.
fn compose_address(street: &str, district: Option<&str>, city: Option<&str>) -> String {
    std::iter::once(street)
        .chain(district)
        .chain(city)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
