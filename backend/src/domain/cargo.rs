//! Cargo shipment requests.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{LocationCode, ValidationError};

/// Lightest accepted cargo weight.
pub const WEIGHT_MIN: u16 = 1;
/// Heaviest accepted cargo weight.
pub const WEIGHT_MAX: u16 = 1000;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 512;

/// Store-assigned cargo identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i64", into = "i32")]
#[schema(value_type = i32, example = 1)]
pub struct CargoId(i32);

impl CargoId {
    /// Validate and construct a cargo identifier.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        i32::try_from(value)
            .ok()
            .filter(|id| *id > 0)
            .map(Self)
            .ok_or(ValidationError::InvalidId {
                field: "cargo_id",
                value,
            })
    }

    /// Raw integer value.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for CargoId {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CargoId> for i32 {
    fn from(value: CargoId) -> Self {
        value.0
    }
}

impl fmt::Display for CargoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cargo weight, `1..=1000`.
///
/// # Examples
/// ```
/// use freight::domain::Weight;
///
/// assert_eq!(Weight::new(500).expect("valid").get(), 500);
/// assert!(Weight::new(1500).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i64", into = "u16")]
#[schema(value_type = u16, example = 500)]
pub struct Weight(u16);

impl Weight {
    /// Lightest weight.
    pub const MIN: Self = Self(WEIGHT_MIN);
    /// Heaviest weight.
    pub const MAX: Self = Self(WEIGHT_MAX);

    /// Validate and construct a weight.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        u16::try_from(value)
            .ok()
            .filter(|v| (WEIGHT_MIN..=WEIGHT_MAX).contains(v))
            .map(Self)
            .ok_or(ValidationError::WeightOutOfRange {
                value,
                min: WEIGHT_MIN,
                max: WEIGHT_MAX,
            })
    }

    /// Raw value.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for Weight {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Weight> for u16 {
    fn from(value: Weight) -> Self {
        value.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-text cargo description, at most 512 characters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "description 1")]
pub struct Description(String);

impl Description {
    /// Validate and construct a description.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(ValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX_CHARS,
            });
        }
        Ok(Self(value))
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Description {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Description> for String {
    fn from(value: Description) -> Self {
        value.0
    }
}

/// A cargo record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cargo {
    pub id: CargoId,
    pub pickup: LocationCode,
    pub delivery: LocationCode,
    pub weight: Weight,
    pub description: Description,
}

/// Cargo awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCargo {
    pub pickup: LocationCode,
    pub delivery: LocationCode,
    pub weight: Weight,
    pub description: Description,
}

/// Partial update of a cargo record. Only weight and description may change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoChanges {
    weight: Option<Weight>,
    description: Option<Description>,
}

impl CargoChanges {
    /// Build a change set; at least one field must be present.
    pub fn new(
        weight: Option<Weight>,
        description: Option<Description>,
    ) -> Result<Self, ValidationError> {
        if weight.is_none() && description.is_none() {
            return Err(ValidationError::EmptyCargoChanges);
        }
        Ok(Self {
            weight,
            description,
        })
    }

    pub fn weight(&self) -> Option<Weight> {
        self.weight
    }

    pub fn description(&self) -> Option<&Description> {
        self.description.as_ref()
    }

    /// Apply the changes to an existing record.
    pub fn apply(&self, cargo: &mut Cargo) {
        if let Some(weight) = self.weight {
            cargo.weight = weight;
        }
        if let Some(description) = &self.description {
            cargo.description = description.clone();
        }
    }
}
