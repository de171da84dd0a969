//! Field-level validation failures for fleet records and match queries.
//!
//! Every constructor of a validated value type returns this error so inbound
//! adapters can report the offending field without inspecting messages.

use serde_json::json;
use thiserror::Error;

use super::Error;

/// Validation failures raised before any store access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("weight must be between {min} and {max}, got {value}")]
    WeightOutOfRange { value: i64, min: u16, max: u16 },
    #[error("capacity must be between {min} and {max}, got {value}")]
    CapacityOutOfRange { value: i64, min: u16, max: u16 },
    #[error("number plate must be four digits (first 1-9) followed by an uppercase letter")]
    InvalidPlate { value: String },
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("location code must be positive, got {value}")]
    InvalidLocationCode { value: i64 },
    #[error("{field} must be a positive identifier, got {value}")]
    InvalidId { field: &'static str, value: i64 },
    #[error("coordinates out of range: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("{field} must be a finite, non-negative number of miles")]
    InvalidDistance { field: &'static str },
    #[error("{max_field} must be greater than or equal to {min_field}")]
    InvertedBand {
        min_field: &'static str,
        max_field: &'static str,
    },
    #[error("at least one of weight or description must be supplied")]
    EmptyCargoChanges,
}

impl ValidationError {
    /// Request field the failure is attributed to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::WeightOutOfRange { .. } => "weight",
            Self::CapacityOutOfRange { .. } => "capacity",
            Self::InvalidPlate { .. } => "number_plate",
            Self::DescriptionTooLong { .. } => "description",
            Self::InvalidLocationCode { .. } => "location",
            Self::InvalidId { field, .. } | Self::InvalidDistance { field } => field,
            Self::InvalidCoordinates { .. } => "coordinates",
            Self::InvertedBand { max_field, .. } => max_field,
            Self::EmptyCargoChanges => "body",
        }
    }

    /// Stable machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::WeightOutOfRange { .. } | Self::CapacityOutOfRange { .. } => "out_of_range",
            Self::InvalidPlate { .. } => "invalid_plate",
            Self::DescriptionTooLong { .. } => "too_long",
            Self::InvalidLocationCode { .. } | Self::InvalidId { .. } => "invalid_id",
            Self::InvalidCoordinates { .. } => "invalid_coordinates",
            Self::InvalidDistance { .. } => "invalid_distance",
            Self::InvertedBand { .. } => "inverted_band",
            Self::EmptyCargoChanges => "empty_update",
        }
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Error::invalid_request(value.to_string()).with_details(json!({
            "field": value.field(),
            "code": value.code(),
        }))
    }
}
