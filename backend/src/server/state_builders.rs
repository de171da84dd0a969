//! Builders wiring store and cache adapters into the domain services.
//!
//! The store (PostgreSQL or in-process) and the cache (Redis or in-process)
//! are chosen independently, so wiring dispatches twice and then assembles
//! the services once over concrete adapter types.

use std::io;
use std::sync::Arc;

use actix_web::web;

use freight::domain::ports::{AggregateCache, CarRepository, CargoRepository, LocationRepository};
use freight::domain::{
    FleetMutationService, FleetSeeder, MatchingService, PositionScheduler, SchedulerHandle,
};
use freight::inbound::http::state::HttpState;
use freight::outbound::cache::InMemoryAggregateCache;
use freight::outbound::csv_locations::CsvLocationSource;
use freight::outbound::memory_store::InMemoryFleetStore;
use freight::outbound::persistence::{
    DieselCarRepository, DieselCargoRepository, DieselLocationRepository,
};

use super::ServerConfig;

/// Running services shared with the HTTP workers.
pub(super) struct Fleet {
    pub(super) http_state: web::Data<HttpState>,
    pub(super) scheduler: SchedulerHandle,
}

/// Seed the store, clear stale aggregates, build HTTP state and start the
/// position scheduler.
///
/// # Errors
///
/// Seeding failures abort startup.
pub(super) async fn build_fleet(config: &ServerConfig) -> io::Result<Fleet> {
    match &config.db_pool {
        Some(pool) => {
            with_cache(
                config,
                Arc::new(DieselLocationRepository::new(pool.clone())),
                Arc::new(DieselCarRepository::new(pool.clone())),
                Arc::new(DieselCargoRepository::new(pool.clone())),
            )
            .await
        }
        None => {
            let store = Arc::new(InMemoryFleetStore::new());
            with_cache(config, store.clone(), store.clone(), store).await
        }
    }
}

async fn with_cache<L, C, G>(
    config: &ServerConfig,
    locations: Arc<L>,
    cars: Arc<C>,
    cargo: Arc<G>,
) -> io::Result<Fleet>
where
    L: LocationRepository + 'static,
    C: CarRepository + 'static,
    G: CargoRepository + 'static,
{
    match &config.redis_cache {
        Some(cache) => assemble(config, locations, cars, cargo, Arc::new(cache.clone())).await,
        None => {
            let cache = Arc::new(InMemoryAggregateCache::new());
            assemble(config, locations, cars, cargo, cache).await
        }
    }
}

async fn assemble<L, C, G, A>(
    config: &ServerConfig,
    locations: Arc<L>,
    cars: Arc<C>,
    cargo: Arc<G>,
    cache: Arc<A>,
) -> io::Result<Fleet>
where
    L: LocationRepository + 'static,
    C: CarRepository + 'static,
    G: CargoRepository + 'static,
    A: AggregateCache + 'static,
{
    let mut seeder = FleetSeeder::new(locations.clone(), cars.clone(), config.seed_car_count)
        .with_cache(cache.clone());
    if let Some(path) = &config.locations_csv {
        seeder = seeder.with_source(Arc::new(CsvLocationSource::new(path.clone())));
    }
    seeder
        .seed()
        .await
        .map_err(|err| io::Error::other(format!("fleet seeding failed: {err}")))?;

    let matches = MatchingService::new(
        locations.clone(),
        cars.clone(),
        cargo.clone(),
        cache.clone(),
        config.cache_ttl,
    );
    let mutations = Arc::new(FleetMutationService::new(cars.clone(), cargo, cache.clone()));
    let http_state = HttpState::new(Arc::new(matches), mutations.clone(), mutations);
    let scheduler =
        PositionScheduler::new(locations, cars, cache, config.relocation_interval).spawn();

    Ok(Fleet {
        http_state: web::Data::new(http_state),
        scheduler,
    })
}
