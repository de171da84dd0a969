//! Port abstraction for car persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Car, CarId, CarRelocation, LocationCode, NewCar};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by car repository adapters.
    pub enum CarRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "car repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "car repository query failed: {message}",
        /// The targeted car does not exist.
        RecordNotFound { id: i32 } => "car {id} does not exist",
        /// A referenced location code does not exist.
        MissingLocation { code: i32 } => "location {code} does not exist",
        /// Another car already carries this plate.
        DuplicatePlate { plate: String } => "number plate {plate} is already registered",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Every car, ordered by identifier.
    async fn list(&self) -> Result<Vec<Car>, CarRepositoryError>;

    /// Number of stored cars.
    async fn count(&self) -> Result<u64, CarRepositoryError>;

    /// Insert a car and return the stored record.
    async fn create(&self, car: &NewCar) -> Result<Car, CarRepositoryError>;

    /// Move one car.
    async fn update_location(
        &self,
        id: CarId,
        location: LocationCode,
    ) -> Result<Car, CarRepositoryError>;

    /// Apply every relocation atomically; nothing is written if any entry
    /// fails. Returns the number of cars moved.
    async fn relocate_all(
        &self,
        relocations: &[CarRelocation],
    ) -> Result<usize, CarRepositoryError>;
}
