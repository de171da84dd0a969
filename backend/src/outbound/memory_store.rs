//! In-process fleet store.
//!
//! Implements the location, car and cargo repository ports over a single
//! mutex-guarded set of tables. Referential checks mirror the PostgreSQL
//! foreign keys: a car or cargo may only reference a stored location, and a
//! failed batch relocation leaves every car where it was.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    CarRepository, CarRepositoryError, CargoRepository, CargoRepositoryError, LocationRepository,
    LocationRepositoryError,
};
use crate::domain::{
    Car, CarId, CarRelocation, Cargo, CargoChanges, CargoId, Location, LocationCode, NewCar,
    NewCargo, WeightBand,
};

#[derive(Debug, Default)]
struct Tables {
    locations: BTreeMap<LocationCode, Location>,
    cars: BTreeMap<CarId, Car>,
    cargo: BTreeMap<CargoId, Cargo>,
    last_car_id: i32,
    last_cargo_id: i32,
}

impl Tables {
    fn has_location(&self, code: LocationCode) -> bool {
        self.locations.contains_key(&code)
    }
}

/// Fleet store kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryFleetStore {
    tables: Mutex<Tables>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl InMemoryFleetStore {
    /// Empty store with no locations, cars or cargo.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, &'static str> {
        self.tables.lock().map_err(|_| POISONED)
    }
}

fn next_id(last: &mut i32) -> Option<i64> {
    *last = last.checked_add(1)?;
    Some(i64::from(*last))
}

#[async_trait]
impl LocationRepository for InMemoryFleetStore {
    async fn all(&self) -> Result<Vec<Location>, LocationRepositoryError> {
        let tables = self.lock().map_err(LocationRepositoryError::query)?;
        Ok(tables.locations.values().cloned().collect())
    }

    async fn count(&self) -> Result<u64, LocationRepositoryError> {
        let tables = self.lock().map_err(LocationRepositoryError::query)?;
        Ok(tables.locations.len() as u64)
    }

    async fn insert_many(&self, locations: &[Location]) -> Result<usize, LocationRepositoryError> {
        let mut tables = self.lock().map_err(LocationRepositoryError::query)?;
        let mut written = 0;
        for location in locations {
            if !tables.has_location(location.code) {
                tables.locations.insert(location.code, location.clone());
                written += 1;
            }
        }
        Ok(written)
    }
}

#[async_trait]
impl CarRepository for InMemoryFleetStore {
    async fn list(&self) -> Result<Vec<Car>, CarRepositoryError> {
        let tables = self.lock().map_err(CarRepositoryError::query)?;
        Ok(tables.cars.values().cloned().collect())
    }

    async fn count(&self) -> Result<u64, CarRepositoryError> {
        let tables = self.lock().map_err(CarRepositoryError::query)?;
        Ok(tables.cars.len() as u64)
    }

    async fn create(&self, car: &NewCar) -> Result<Car, CarRepositoryError> {
        let mut tables = self.lock().map_err(CarRepositoryError::query)?;
        if !tables.has_location(car.location) {
            return Err(CarRepositoryError::missing_location(car.location.get()));
        }
        if tables.cars.values().any(|existing| existing.plate == car.plate) {
            return Err(CarRepositoryError::duplicate_plate(car.plate.as_str()));
        }
        let id = next_id(&mut tables.last_car_id)
            .and_then(|raw| CarId::new(raw).ok())
            .ok_or_else(|| CarRepositoryError::query("car identifiers exhausted"))?;
        let stored = Car {
            id,
            plate: car.plate.clone(),
            location: car.location,
            capacity: car.capacity,
        };
        tables.cars.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_location(
        &self,
        id: CarId,
        location: LocationCode,
    ) -> Result<Car, CarRepositoryError> {
        let mut tables = self.lock().map_err(CarRepositoryError::query)?;
        let known_location = tables.has_location(location);
        let car = tables
            .cars
            .get_mut(&id)
            .ok_or_else(|| CarRepositoryError::record_not_found(id.get()))?;
        if !known_location {
            return Err(CarRepositoryError::missing_location(location.get()));
        }
        car.location = location;
        Ok(car.clone())
    }

    async fn relocate_all(
        &self,
        relocations: &[CarRelocation],
    ) -> Result<usize, CarRepositoryError> {
        let mut tables = self.lock().map_err(CarRepositoryError::query)?;
        for relocation in relocations {
            if !tables.cars.contains_key(&relocation.car_id) {
                return Err(CarRepositoryError::record_not_found(relocation.car_id.get()));
            }
            if !tables.has_location(relocation.location) {
                return Err(CarRepositoryError::missing_location(
                    relocation.location.get(),
                ));
            }
        }
        let mut moved = HashSet::new();
        for relocation in relocations {
            if let Some(car) = tables.cars.get_mut(&relocation.car_id) {
                car.location = relocation.location;
                moved.insert(relocation.car_id);
            }
        }
        Ok(moved.len())
    }
}

#[async_trait]
impl CargoRepository for InMemoryFleetStore {
    async fn list_by_weight(&self, band: WeightBand) -> Result<Vec<Cargo>, CargoRepositoryError> {
        let tables = self.lock().map_err(CargoRepositoryError::query)?;
        Ok(tables
            .cargo
            .values()
            .filter(|cargo| band.contains(cargo.weight))
            .cloned()
            .collect())
    }

    async fn find(&self, id: CargoId) -> Result<Option<Cargo>, CargoRepositoryError> {
        let tables = self.lock().map_err(CargoRepositoryError::query)?;
        Ok(tables.cargo.get(&id).cloned())
    }

    async fn create(&self, cargo: &NewCargo) -> Result<Cargo, CargoRepositoryError> {
        let mut tables = self.lock().map_err(CargoRepositoryError::query)?;
        for code in [cargo.pickup, cargo.delivery] {
            if !tables.has_location(code) {
                return Err(CargoRepositoryError::missing_location(code.get()));
            }
        }
        let id = next_id(&mut tables.last_cargo_id)
            .and_then(|raw| CargoId::new(raw).ok())
            .ok_or_else(|| CargoRepositoryError::query("cargo identifiers exhausted"))?;
        let stored = Cargo {
            id,
            pickup: cargo.pickup,
            delivery: cargo.delivery,
            weight: cargo.weight,
            description: cargo.description.clone(),
        };
        tables.cargo.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: CargoId,
        changes: &CargoChanges,
    ) -> Result<Cargo, CargoRepositoryError> {
        let mut tables = self.lock().map_err(CargoRepositoryError::query)?;
        let cargo = tables
            .cargo
            .get_mut(&id)
            .ok_or_else(|| CargoRepositoryError::record_not_found(id.get()))?;
        changes.apply(cargo);
        Ok(cargo.clone())
    }

    async fn delete(&self, id: CargoId) -> Result<(), CargoRepositoryError> {
        let mut tables = self.lock().map_err(CargoRepositoryError::query)?;
        tables
            .cargo
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CargoRepositoryError::record_not_found(id.get()))
    }
}
