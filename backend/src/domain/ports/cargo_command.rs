//! Driving port for cargo mutations.

use async_trait::async_trait;

use crate::domain::{Cargo, CargoChanges, CargoId, Error, NewCargo};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CargoCommand: Send + Sync {
    async fn create_cargo(&self, cargo: NewCargo) -> Result<Cargo, Error>;

    async fn update_cargo(&self, id: CargoId, changes: CargoChanges) -> Result<Cargo, Error>;

    async fn delete_cargo(&self, id: CargoId) -> Result<(), Error>;
}
