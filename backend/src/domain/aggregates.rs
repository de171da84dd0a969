//! Derived match aggregates and the keys they are cached under.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Cargo, CargoId, LocationCode, MatchQuery, Miles, NumberPlate};

/// One row of the list aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoMatchSummary {
    pub id: CargoId,
    pub pickup: LocationCode,
    pub delivery: LocationCode,
    pub nearby_car_count: u32,
}

/// Distance from one car to a cargo's pickup location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDistance {
    pub plate: NumberPlate,
    pub distance: Miles,
}

/// Detail aggregation: the cargo plus every car's distance to its pickup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoDetail {
    pub cargo: Cargo,
    pub cars: Vec<CarDistance>,
}

/// Value stored by the aggregate cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CachedAggregate {
    List(Vec<CargoMatchSummary>),
    Detail(CargoDetail),
}

/// Deterministic cache key derived from an operation and its parameters.
///
/// # Examples
/// ```
/// use freight::domain::{AggregateKey, CargoId, MatchQuery};
///
/// assert_eq!(
///     AggregateKey::list(&MatchQuery::default()).as_str(),
///     "cargo:list:w1-1000:d0-inf"
/// );
/// assert_eq!(
///     AggregateKey::detail(CargoId::new(7).expect("id")).as_str(),
///     "cargo:detail:7"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateKey(String);

impl AggregateKey {
    /// Key of a list aggregation for `query`.
    pub fn list(query: &MatchQuery) -> Self {
        Self(format!("cargo:list:w{}:d{}", query.weight, query.distance))
    }

    /// Key of the detail aggregation for `id`.
    pub fn detail(id: CargoId) -> Self {
        Self(format!("cargo:detail:{id}"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for AggregateKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
