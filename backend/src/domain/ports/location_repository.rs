//! Port abstraction for location reference data.
use async_trait::async_trait;

use crate::domain::Location;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by location repository adapters.
    pub enum LocationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "location repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "location repository query failed: {message}",
    }
}

/// Keyed access to seeded locations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Every known location.
    async fn all(&self) -> Result<Vec<Location>, LocationRepositoryError>;

    /// Number of stored locations.
    async fn count(&self) -> Result<u64, LocationRepositoryError>;

    /// Insert locations, skipping codes that already exist. Returns the
    /// number of rows written.
    async fn insert_many(&self, locations: &[Location]) -> Result<usize, LocationRepositoryError>;
}
