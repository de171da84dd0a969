//! Test utilities shared by unit tests in `src/`.
//!
//! Only compiled for tests. The scenario mirrors a tiny slice of the US zip
//! dataset: three locations in Puerto Rico and New York, three cars and three
//! cargo records whose pickups sit at known distances from each car.

use crate::domain::ports::{CarRepository, CargoRepository, LocationRepository};
use crate::domain::{
    Capacity, Coordinates, Description, Location, LocationCode, NewCar, NewCargo, NumberPlate,
    Weight,
};
use crate::outbound::memory_store::InMemoryFleetStore;

/// Location code shorthand.
pub fn code(raw: i64) -> LocationCode {
    LocationCode::new(raw).expect("valid location code")
}

pub fn location(raw: i64, city: &str, state: &str, lat: f64, lng: f64) -> Location {
    Location {
        code: code(raw),
        city: city.to_owned(),
        state: state.to_owned(),
        coordinates: Coordinates::new(lat, lng).expect("valid coordinates"),
    }
}

/// Adjuntas PR (601), Aguada PR (602) and Big Flats NY (14814).
pub fn scenario_locations() -> Vec<Location> {
    vec![
        location(601, "Adjuntas", "Puerto Rico", 18.18027, -66.75266),
        location(602, "Aguada", "Puerto Rico", 18.36075, -67.17541),
        location(14814, "Big Flats", "New York", 42.15525, -76.95148),
    ]
}

pub fn new_car(plate: &str, location: i64, capacity: i64) -> NewCar {
    NewCar {
        plate: NumberPlate::new(plate).expect("valid plate"),
        location: code(location),
        capacity: Capacity::new(capacity).expect("valid capacity"),
    }
}

pub fn new_cargo(pickup: i64, delivery: i64, weight: i64, description: &str) -> NewCargo {
    NewCargo {
        pickup: code(pickup),
        delivery: code(delivery),
        weight: Weight::new(weight).expect("valid weight"),
        description: Description::new(description).expect("valid description"),
    }
}

/// Store holding the three scenario locations and nothing else.
pub async fn located_store() -> InMemoryFleetStore {
    let store = InMemoryFleetStore::new();
    store
        .insert_many(&scenario_locations())
        .await
        .expect("seed locations");
    store
}

/// Store seeded with the full scenario.
///
/// Cars: `1111A` at 601, `2222B` at 602, `3333C` at 14814.
/// Cargo 1: 601 to 602 (500), cargo 2: 601 to 14814 (700), cargo 3: 602 to
/// 14814 (300).
pub async fn scenario_store() -> InMemoryFleetStore {
    let store = located_store().await;
    for car in [
        new_car("1111A", 601, 600),
        new_car("2222B", 602, 700),
        new_car("3333C", 14814, 1000),
    ] {
        CarRepository::create(&store, &car).await.expect("seed car");
    }
    for cargo in [
        new_cargo(601, 602, 500, "description 1"),
        new_cargo(601, 14814, 700, "description 2"),
        new_cargo(602, 14814, 300, "description 3"),
    ] {
        CargoRepository::create(&store, &cargo)
            .await
            .expect("seed cargo");
    }
    store
}
