//! Inclusive weight and distance bands used to filter match aggregates.

use std::fmt;

use super::{Miles, ValidationError, Weight};

/// Inclusive weight range. Defaults to the full valid weight range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeightBand {
    min: Weight,
    max: Weight,
}

impl WeightBand {
    /// Build a band, requiring `max >= min`.
    pub fn new(min: Weight, max: Weight) -> Result<Self, ValidationError> {
        if max < min {
            return Err(ValidationError::InvertedBand {
                min_field: "weight_min",
                max_field: "weight_max",
            });
        }
        Ok(Self { min, max })
    }

    /// Build a band from optional raw bounds, filling gaps with the defaults.
    pub fn from_bounds(min: Option<i64>, max: Option<i64>) -> Result<Self, ValidationError> {
        let min = min.map(Weight::new).transpose()?.unwrap_or(Weight::MIN);
        let max = max.map(Weight::new).transpose()?.unwrap_or(Weight::MAX);
        Self::new(min, max)
    }

    /// Lower bound, inclusive.
    pub fn min(self) -> Weight {
        self.min
    }

    /// Upper bound, inclusive.
    pub fn max(self) -> Weight {
        self.max
    }

    /// Whether `weight` lies inside the band, bounds included.
    pub fn contains(self, weight: Weight) -> bool {
        (self.min..=self.max).contains(&weight)
    }
}

impl Default for WeightBand {
    fn default() -> Self {
        Self {
            min: Weight::MIN,
            max: Weight::MAX,
        }
    }
}

impl fmt::Display for WeightBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Inclusive distance range in miles; `max == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistanceBand {
    min: Miles,
    max: Option<Miles>,
}

impl DistanceBand {
    /// Build a band from optional raw bounds.
    ///
    /// # Examples
    /// ```
    /// use freight::domain::{DistanceBand, Miles};
    ///
    /// let band = DistanceBand::from_bounds(None, Some(450.0)).expect("valid band");
    /// assert!(band.contains(Miles::new(30.42).expect("finite")));
    /// assert!(!band.contains(Miles::new(1757.56).expect("finite")));
    /// assert!(DistanceBand::from_bounds(Some(10.0), Some(5.0)).is_err());
    /// ```
    pub fn from_bounds(min: Option<f64>, max: Option<f64>) -> Result<Self, ValidationError> {
        let min = match min {
            Some(raw) => Miles::new(raw).ok_or(ValidationError::InvalidDistance {
                field: "distance_min",
            })?,
            None => Miles::ZERO,
        };
        let max = max
            .map(|raw| {
                Miles::new(raw).ok_or(ValidationError::InvalidDistance {
                    field: "distance_max",
                })
            })
            .transpose()?;
        if max.is_some_and(|max| max < min) {
            return Err(ValidationError::InvertedBand {
                min_field: "distance_min",
                max_field: "distance_max",
            });
        }
        Ok(Self { min, max })
    }

    /// Lower bound, inclusive.
    pub fn min(self) -> Miles {
        self.min
    }

    /// Upper bound, inclusive; `None` when unbounded.
    pub fn max(self) -> Option<Miles> {
        self.max
    }

    /// Whether `miles` lies inside the band, bounds included.
    pub fn contains(self, miles: Miles) -> bool {
        miles >= self.min && self.max.is_none_or(|max| miles <= max)
    }
}

impl fmt::Display for DistanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min.get(), max.get()),
            None => write!(f, "{}-inf", self.min.get()),
        }
    }
}

/// Filter of the list aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatchQuery {
    pub weight: WeightBand,
    pub distance: DistanceBand,
}
