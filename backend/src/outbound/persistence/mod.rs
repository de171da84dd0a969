//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are thin translators between Diesel rows and domain types;
//! every database failure is mapped into the owning port's error type.
//!
//! ```ignore
//! use freight::outbound::persistence::{DbPool, DieselCargoRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/freight")).await?;
//! let cargo = DieselCargoRepository::new(pool);
//! ```

mod diesel_car_repository;
mod diesel_cargo_repository;
mod diesel_error_mapping;
mod diesel_location_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_car_repository::DieselCarRepository;
pub use diesel_cargo_repository::DieselCargoRepository;
pub use diesel_location_repository::DieselLocationRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
