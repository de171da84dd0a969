//! Translation of port failures into domain errors.
//!
//! Connection failures become `service_unavailable`, query failures become
//! `internal`. Referential failures name the missing record so callers can
//! tell a stale identifier from a bad location reference.

use serde_json::json;

use super::ports::{
    CarRepositoryError, CargoRepositoryError, LocationRepositoryError, LocationSourceError,
};
use super::{Error, ResourceKind};

fn missing_location(code: i32) -> Error {
    Error::resource_not_found(ResourceKind::Location, code)
}

impl From<LocationRepositoryError> for Error {
    fn from(error: LocationRepositoryError) -> Self {
        match error {
            LocationRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("location store unavailable: {message}"))
            }
            LocationRepositoryError::Query { message } => {
                Error::internal(format!("location store error: {message}"))
            }
        }
    }
}

impl From<CarRepositoryError> for Error {
    fn from(error: CarRepositoryError) -> Self {
        match error {
            CarRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("car store unavailable: {message}"))
            }
            CarRepositoryError::Query { message } => {
                Error::internal(format!("car store error: {message}"))
            }
            CarRepositoryError::RecordNotFound { id } => {
                Error::resource_not_found(ResourceKind::Car, id)
            }
            CarRepositoryError::MissingLocation { code } => missing_location(code),
            CarRepositoryError::DuplicatePlate { plate } => {
                Error::conflict(format!("number plate {plate} is already registered"))
                    .with_details(json!({
                        "field": "number_plate",
                        "code": "duplicate_plate",
                    }))
            }
        }
    }
}

impl From<CargoRepositoryError> for Error {
    fn from(error: CargoRepositoryError) -> Self {
        match error {
            CargoRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("cargo store unavailable: {message}"))
            }
            CargoRepositoryError::Query { message } => {
                Error::internal(format!("cargo store error: {message}"))
            }
            CargoRepositoryError::RecordNotFound { id } => {
                Error::resource_not_found(ResourceKind::Cargo, id)
            }
            CargoRepositoryError::MissingLocation { code } => missing_location(code),
        }
    }
}

impl From<LocationSourceError> for Error {
    fn from(error: LocationSourceError) -> Self {
        Error::internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn missing_location_is_distinguished_from_missing_cargo() {
        let location: Error = CargoRepositoryError::missing_location(14815).into();
        let cargo: Error = CargoRepositoryError::record_not_found(9).into();

        assert_eq!(location.code(), ErrorCode::NotFound);
        assert_eq!(location.resource(), Some(ResourceKind::Location));
        assert_eq!(location.message(), "location 14815 not found");
        assert_eq!(cargo.resource(), Some(ResourceKind::Cargo));
    }

    #[rstest]
    #[case(CarRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(CarRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(CarRepositoryError::record_not_found(3), ErrorCode::NotFound)]
    #[case(CarRepositoryError::duplicate_plate("1111A"), ErrorCode::Conflict)]
    fn car_errors_map_to_codes(#[case] error: CarRepositoryError, #[case] expected: ErrorCode) {
        assert_eq!(Error::from(error).code(), expected);
    }

    #[rstest]
    fn transient_store_errors_are_not_masked_as_not_found() {
        let error: Error = LocationRepositoryError::query("constraint violated").into();
        assert_eq!(error.code(), ErrorCode::InternalError);
        assert!(error.resource().is_none());
    }
}
