//! Car records: plate, capacity and current position.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{LocationCode, ValidationError};

/// Smallest accepted car capacity.
pub const CAPACITY_MIN: u16 = 1;
/// Largest accepted car capacity.
pub const CAPACITY_MAX: u16 = 1000;

/// Store-assigned car identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct CarId(i32);

impl CarId {
    /// Validate and construct a car identifier.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        i32::try_from(value)
            .ok()
            .filter(|id| *id > 0)
            .map(Self)
            .ok_or(ValidationError::InvalidId {
                field: "car_id",
                value,
            })
    }

    /// Raw integer value.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for CarId {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CarId> for i32 {
    fn from(value: CarId) -> Self {
        value.0
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static PLATE_RE: OnceLock<Regex> = OnceLock::new();

fn plate_regex() -> &'static Regex {
    PLATE_RE.get_or_init(|| {
        Regex::new("^[1-9][0-9]{3}[A-Z]$")
            .unwrap_or_else(|error| panic!("plate regex failed to compile: {error}"))
    })
}

/// Registration plate: four digits (the first non-zero) and one uppercase letter.
///
/// # Examples
/// ```
/// use freight::domain::NumberPlate;
///
/// assert!(NumberPlate::new("1111A").is_ok());
/// assert!(NumberPlate::new("0111A").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "1111A")]
pub struct NumberPlate(String);

impl NumberPlate {
    /// Validate and construct a plate.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if plate_regex().is_match(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidPlate { value })
        }
    }

    /// Borrow the plate text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NumberPlate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NumberPlate> for String {
    fn from(value: NumberPlate) -> Self {
        value.0
    }
}

impl fmt::Display for NumberPlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Load capacity of a car, `1..=1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct Capacity(u16);

impl Capacity {
    /// Validate and construct a capacity.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        u16::try_from(value)
            .ok()
            .filter(|v| (CAPACITY_MIN..=CAPACITY_MAX).contains(v))
            .map(Self)
            .ok_or(ValidationError::CapacityOutOfRange {
                value,
                min: CAPACITY_MIN,
                max: CAPACITY_MAX,
            })
    }

    /// Raw value.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for Capacity {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Capacity> for u16 {
    fn from(value: Capacity) -> Self {
        value.0
    }
}

/// A car as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    pub id: CarId,
    pub plate: NumberPlate,
    pub location: LocationCode,
    pub capacity: Capacity,
}

/// Car awaiting insertion; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCar {
    pub plate: NumberPlate,
    pub location: LocationCode,
    pub capacity: Capacity,
}

/// One entry of a batch position update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarRelocation {
    pub car_id: CarId,
    pub location: LocationCode,
}
