//! Driving port for explicit car moves.

use async_trait::async_trait;

use crate::domain::{Car, CarId, Error, LocationCode};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarCommand: Send + Sync {
    /// Move a car to `location` and return the updated record.
    async fn update_car_location(&self, id: CarId, location: LocationCode) -> Result<Car, Error>;
}
