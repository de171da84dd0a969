//! Shared Diesel error classification for the fleet repositories.
//!
//! Each repository turns a [`StoreFailure`] into its own port error; the
//! constraint name tells a missing pickup location apart from a missing
//! delivery location.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

pub(crate) const CAR_LOCATION_FKEY: &str = "cars_current_location_fkey";
pub(crate) const CAR_PLATE_KEY: &str = "cars_number_plate_key";
pub(crate) const CARGO_PICKUP_FKEY: &str = "cargo_pickup_location_fkey";
pub(crate) const CARGO_DELIVERY_FKEY: &str = "cargo_delivery_location_fkey";

/// Repository-neutral view of a failed database call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    Connection(String),
    Query(String),
    NotFound,
    ForeignKey { constraint: Option<String> },
    Unique { constraint: Option<String> },
}

impl StoreFailure {
    /// Whether this failure violated the named constraint.
    pub fn violates(&self, name: &str) -> bool {
        match self {
            Self::ForeignKey { constraint } | Self::Unique { constraint } => {
                constraint.as_deref() == Some(name)
            }
            _ => false,
        }
    }
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error, emitting debug context.
pub(crate) fn classify(error: DieselError) -> StoreFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StoreFailure::NotFound,
        DieselError::QueryBuilderError(_) => StoreFailure::Query("database query error".into()),
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreFailure::ForeignKey {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreFailure::Unique {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreFailure::Connection("database connection error".into())
        }
        DieselError::DatabaseError(_, _) => StoreFailure::Query("database error".into()),
        _ => StoreFailure::Query("database error".into()),
    }
}
