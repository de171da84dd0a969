//! Startup seeding of locations and cars.
//!
//! Locations are loaded from the configured dataset only while the location
//! table is empty. Cars are generated only while no car exists, each with a
//! unique random plate, a random capacity and a random location. Once seeding
//! succeeds, every cached aggregate is cleared: a shared cache may still hold
//! values computed by an earlier process over different data.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::domain::car::{CAPACITY_MAX, CAPACITY_MIN};
use crate::domain::mutation_service::invalidate;
use crate::domain::ports::{
    AggregateCache, CarRepository, ClearTarget, LocationRepository, LocationSource,
};
use crate::domain::{Capacity, Error, LocationCode, NewCar, NumberPlate};

/// Number of distinct plates matching `[1-9][0-9]{3}[A-Z]`.
const PLATE_SPACE: usize = 9 * 1000 * 26;

/// What a seeding run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Locations read from the dataset and written.
    pub locations_inserted: usize,
    /// Cars generated and written.
    pub cars_created: usize,
}

/// Seeds reference data and an initial fleet.
pub struct FleetSeeder<L, C> {
    locations: Arc<L>,
    cars: Arc<C>,
    source: Option<Arc<dyn LocationSource>>,
    cache: Option<Arc<dyn AggregateCache>>,
    car_count: usize,
    rng: Mutex<SmallRng>,
}

impl<L, C> FleetSeeder<L, C>
where
    L: LocationRepository,
    C: CarRepository,
{
    /// Seeder creating up to `car_count` cars in an empty fleet.
    pub fn new(locations: Arc<L>, cars: Arc<C>, car_count: usize) -> Self {
        Self {
            locations,
            cars,
            source: None,
            cache: None,
            car_count,
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// Dataset used when the location table is empty.
    pub fn with_source(mut self, source: Arc<dyn LocationSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Cache cleared after a successful run.
    pub fn with_cache(mut self, cache: Arc<dyn AggregateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the entropy-seeded RNG.
    pub fn with_rng(mut self, rng: SmallRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Seed locations, then cars.
    ///
    /// # Errors
    ///
    /// Any store or dataset failure aborts seeding. Rows already written stay.
    /// A failed cache clear is logged and does not fail the run.
    pub async fn seed(&self) -> Result<SeedReport, Error> {
        let locations_inserted = self.seed_locations().await?;
        let cars_created = self.seed_cars().await?;
        if let Some(cache) = &self.cache {
            invalidate(cache.as_ref(), &[ClearTarget::All], "fleet seeded").await;
        }
        let report = SeedReport {
            locations_inserted,
            cars_created,
        };
        info!(
            locations_inserted = report.locations_inserted,
            cars_created = report.cars_created,
            "seeding finished"
        );
        Ok(report)
    }

    async fn seed_locations(&self) -> Result<usize, Error> {
        let existing = self.locations.count().await?;
        if existing > 0 {
            info!(existing, "locations already present; dataset not loaded");
            return Ok(0);
        }
        let Some(source) = &self.source else {
            warn!("location table is empty and no dataset is configured");
            return Ok(0);
        };
        let dataset = source.load().await?;
        let inserted = self.locations.insert_many(&dataset).await?;
        info!(read = dataset.len(), inserted, "locations loaded");
        Ok(inserted)
    }

    async fn seed_cars(&self) -> Result<usize, Error> {
        let existing = self.cars.count().await?;
        if existing > 0 || self.car_count == 0 {
            info!(existing, "car seeding skipped");
            return Ok(0);
        }
        if self.car_count > PLATE_SPACE {
            return Err(Error::invalid_request(format!(
                "cannot seed {} cars; only {PLATE_SPACE} plates exist",
                self.car_count
            )));
        }
        let codes = self
            .locations
            .all()
            .await?
            .into_iter()
            .map(|location| location.code)
            .collect::<Vec<_>>();
        if codes.is_empty() {
            warn!(requested = self.car_count, "no locations to place cars at");
            return Ok(0);
        }

        let fleet = self.generate(&codes)?;
        for car in &fleet {
            self.cars.create(car).await?;
        }
        info!(created = fleet.len(), "cars seeded");
        Ok(fleet.len())
    }

    fn generate(&self, codes: &[LocationCode]) -> Result<Vec<NewCar>, Error> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| Error::internal("seeding rng lock poisoned"))?;
        let mut plates = HashSet::with_capacity(self.car_count);
        let mut fleet = Vec::with_capacity(self.car_count);
        while fleet.len() < self.car_count {
            let plate = random_plate(&mut *rng);
            if !plates.insert(plate.clone()) {
                continue;
            }
            let location = codes
                .choose(&mut *rng)
                .copied()
                .ok_or_else(|| Error::internal("no location available"))?;
            let capacity = Capacity::new(i64::from(
                rng.gen_range(CAPACITY_MIN..=CAPACITY_MAX),
            ))?;
            fleet.push(NewCar {
                plate: NumberPlate::new(plate)?,
                location,
                capacity,
            });
        }
        Ok(fleet)
    }
}

fn random_plate<R: Rng + ?Sized>(rng: &mut R) -> String {
    let digits = rng.gen_range(1000..=9999_u16);
    let letter = char::from(b'A' + rng.gen_range(0..26_u8));
    format!("{digits}{letter}")
}
