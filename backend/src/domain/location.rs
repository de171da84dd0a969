//! Location reference data.
//!
//! Locations are keyed by postal code and seeded once at startup. Cars and
//! cargo reference them by [`LocationCode`]; coordinates are only ever read
//! from the location store, never embedded in other records.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ValidationError;

/// Unique key of a location (a postal code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i64", into = "i32")]
#[schema(value_type = i32, example = 601)]
pub struct LocationCode(i32);

impl LocationCode {
    /// Validate and construct a location code.
    ///
    /// # Examples
    /// ```
    /// use freight::domain::LocationCode;
    ///
    /// assert_eq!(LocationCode::new(14814).expect("valid").get(), 14814);
    /// assert!(LocationCode::new(0).is_err());
    /// ```
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        i32::try_from(value)
            .ok()
            .filter(|code| *code > 0)
            .map(Self)
            .ok_or(ValidationError::InvalidLocationCode { value })
    }

    /// Raw integer value.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for LocationCode {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LocationCode> for i32 {
    fn from(value: LocationCode) -> Self {
        value.0
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and construct a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(ValidationError::InvalidCoordinates {
                latitude,
                longitude,
            })
        }
    }

    /// Latitude in degrees.
    pub fn latitude(self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(self) -> f64 {
        self.longitude
    }
}

/// A geographic point with a human-readable place name.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub code: LocationCode,
    pub city: String,
    pub state: String,
    pub coordinates: Coordinates,
}
