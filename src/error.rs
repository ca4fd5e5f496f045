//! Error taxonomy shared by every planning stage.
//!
//! Structural problems (empty datasets, missing fields, impossible fleets)
//! abort the operation and surface as [`PlanError`]. Orders that simply do
//! not fit anywhere are *not* errors: they are marked
//! [`Allocation::Unassigned`](crate::models::Allocation::Unassigned) and
//! returned alongside the successful result.

use thiserror::Error;

/// Errors produced by the planning pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Nothing left to work on (e.g. every order lacks coordinates).
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Latitude outside `[-90, 90]`, longitude outside `[-180, 180]`, or non-finite.
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// A field the operation depends on is absent from a record.
    #[error("missing required field `{field}` on {record}")]
    MissingRequiredField { record: String, field: &'static str },

    /// A field is present but its value is unusable.
    #[error("invalid value for `{field}` on {record}: {reason}")]
    InvalidValue {
        record: String,
        field: &'static str,
        reason: String,
    },

    /// The fleet has no vehicle flagged as available.
    #[error("no available vehicle in fleet")]
    NoAvailableVehicle,

    /// The fleet routing search produced no feasible assignment.
    #[error("no feasible route: {0}")]
    NoFeasibleRoute(String),

    /// A collaborator (geocoder, routing backend) failed.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T, E = PlanError> = std::result::Result<T, E>;
