//! Domain primitives, services and ports.
//!
//! Purpose: define the strongly typed fleet entities (locations, cars,
//! cargo), the distance engine, the matching service with its aggregate
//! cache interplay, the mutation gateway and the background position
//! scheduler. Inbound and outbound adapters depend on this module; it depends
//! on neither.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport agnostic failure payload.
//! - MatchingService: list and detail aggregations, cache first.
//! - FleetMutationService: cargo/car writes followed by invalidation.
//! - PositionScheduler: periodic relocation of every car.
//! - FleetSeeder: startup location and car seeding.

pub mod aggregates;
pub mod bands;
pub mod car;
pub mod cargo;
pub mod distance;
pub mod error;
pub mod fleet_seeder;
pub mod location;
pub mod matching_service;
pub mod mutation_service;
mod port_errors;
pub mod ports;
pub mod position_scheduler;
pub mod trace_id;
pub mod validation;

pub use self::aggregates::{
    AggregateKey, CachedAggregate, CarDistance, CargoDetail, CargoMatchSummary,
};
pub use self::bands::{DistanceBand, MatchQuery, WeightBand};
pub use self::car::{Capacity, Car, CarId, CarRelocation, NewCar, NumberPlate};
pub use self::cargo::{Cargo, CargoChanges, CargoId, Description, NewCargo, Weight};
pub use self::distance::{Miles, distance};
pub use self::error::{Error, ErrorCode, ResourceKind};
pub use self::fleet_seeder::{FleetSeeder, SeedReport};
pub use self::location::{Coordinates, Location, LocationCode};
pub use self::matching_service::MatchingService;
pub use self::mutation_service::FleetMutationService;
pub use self::position_scheduler::{PositionScheduler, SchedulerHandle, Sleeper, TokioSleeper};
pub use self::trace_id::TraceId;
pub use self::validation::ValidationError;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use freight::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("cargo 7 not found"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
