//! Port abstraction for cargo persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Cargo, CargoChanges, CargoId, NewCargo, WeightBand};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by cargo repository adapters.
    pub enum CargoRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "cargo repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "cargo repository query failed: {message}",
        /// The targeted cargo does not exist.
        RecordNotFound { id: i32 } => "cargo {id} does not exist",
        /// A referenced location code does not exist.
        MissingLocation { code: i32 } => "location {code} does not exist",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CargoRepository: Send + Sync {
    /// Cargo whose weight lies in `band`, in insertion order.
    async fn list_by_weight(&self, band: WeightBand) -> Result<Vec<Cargo>, CargoRepositoryError>;

    /// Fetch one cargo.
    async fn find(&self, id: CargoId) -> Result<Option<Cargo>, CargoRepositoryError>;

    /// Insert a cargo and return the stored record.
    async fn create(&self, cargo: &NewCargo) -> Result<Cargo, CargoRepositoryError>;

    /// Apply weight/description changes.
    async fn update(
        &self,
        id: CargoId,
        changes: &CargoChanges,
    ) -> Result<Cargo, CargoRepositoryError>;

    /// Remove a cargo.
    async fn delete(&self, id: CargoId) -> Result<(), CargoRepositoryError>;
}
