//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod aggregate_cache;
mod car_command;
mod car_repository;
mod cargo_command;
mod cargo_match_query;
mod cargo_repository;
mod location_repository;
mod location_source;

#[cfg(test)]
pub use aggregate_cache::MockAggregateCache;
pub use aggregate_cache::{AggregateCache, AggregateCacheError, CacheGeneration, ClearTarget};
#[cfg(test)]
pub use car_command::MockCarCommand;
pub use car_command::CarCommand;
#[cfg(test)]
pub use car_repository::MockCarRepository;
pub use car_repository::{CarRepository, CarRepositoryError};
#[cfg(test)]
pub use cargo_command::MockCargoCommand;
pub use cargo_command::CargoCommand;
#[cfg(test)]
pub use cargo_match_query::MockCargoMatchQuery;
pub use cargo_match_query::CargoMatchQuery;
#[cfg(test)]
pub use cargo_repository::MockCargoRepository;
pub use cargo_repository::{CargoRepository, CargoRepositoryError};
#[cfg(test)]
pub use location_repository::MockLocationRepository;
pub use location_repository::{LocationRepository, LocationRepositoryError};
#[cfg(test)]
pub use location_source::MockLocationSource;
pub use location_source::{LocationSource, LocationSourceError};
