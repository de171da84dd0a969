//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Conversions into domain
//! types re-validate every field so a row that slipped past the database
//! checks surfaces as a query error instead of an invalid domain value.

use diesel::prelude::*;

use crate::domain::{
    Capacity, Car, CarId, Cargo, CargoId, Coordinates, Description, Location, LocationCode,
    NumberPlate, ValidationError, Weight,
};

use super::schema::{cargo, cars, locations};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = locations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LocationRow {
    pub zip_code: i32,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationRow {
    pub fn from_domain(location: &Location) -> Self {
        Self {
            zip_code: location.code.get(),
            city: location.city.clone(),
            state: location.state.clone(),
            latitude: location.coordinates.latitude(),
            longitude: location.coordinates.longitude(),
        }
    }
}

impl TryFrom<LocationRow> for Location {
    type Error = ValidationError;

    fn try_from(row: LocationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            code: LocationCode::new(row.zip_code.into())?,
            city: row.city,
            state: row.state,
            coordinates: Coordinates::new(row.latitude, row.longitude)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cars)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CarRow {
    pub id: i32,
    pub number_plate: String,
    pub current_location: i32,
    pub capacity: i32,
}

impl TryFrom<CarRow> for Car {
    type Error = ValidationError;

    fn try_from(row: CarRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CarId::new(row.id.into())?,
            plate: NumberPlate::new(row.number_plate)?,
            location: LocationCode::new(row.current_location.into())?,
            capacity: Capacity::new(row.capacity.into())?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cars)]
pub(crate) struct NewCarRow<'a> {
    pub number_plate: &'a str,
    pub current_location: i32,
    pub capacity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cargo)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CargoRow {
    pub id: i32,
    pub pickup_location: i32,
    pub delivery_location: i32,
    pub weight: i32,
    pub description: String,
}

impl TryFrom<CargoRow> for Cargo {
    type Error = ValidationError;

    fn try_from(row: CargoRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CargoId::new(row.id.into())?,
            pickup: LocationCode::new(row.pickup_location.into())?,
            delivery: LocationCode::new(row.delivery_location.into())?,
            weight: Weight::new(row.weight.into())?,
            description: Description::new(row.description)?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cargo)]
pub(crate) struct NewCargoRow<'a> {
    pub pickup_location: i32,
    pub delivery_location: i32,
    pub weight: i32,
    pub description: &'a str,
}

/// Changeset for cargo updates; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cargo)]
pub(crate) struct CargoUpdate<'a> {
    pub weight: Option<i32>,
    pub description: Option<&'a str>,
}
