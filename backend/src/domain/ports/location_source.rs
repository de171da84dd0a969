//! Port for reading location reference data at startup.
use async_trait::async_trait;

use crate::domain::Location;

use super::define_port_error;

define_port_error! {
    /// Errors raised while reading a location dataset.
    pub enum LocationSourceError {
        /// The dataset could not be opened or read.
        Io { message: String } => "location dataset could not be read: {message}",
        /// A record was malformed.
        Parse { message: String } => "location dataset is malformed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Load every location in the dataset.
    async fn load(&self) -> Result<Vec<Location>, LocationSourceError>;
}
