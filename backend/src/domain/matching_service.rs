//! Cargo match aggregation.
//!
//! Computes per-cargo nearby-car counts and per-cargo car distance listings
//! from store snapshots, answering from the aggregate cache when it can. The
//! cache is an optimisation only: any cache failure degrades to computing the
//! aggregate from the store.
//!
//! Locations are fetched once per computation and passed around as a map, so
//! no lookup happens lazily between suspension points.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{
    AggregateCache, CacheGeneration, CarRepository, CargoMatchQuery, CargoRepository,
    LocationRepository,
};
use crate::domain::{
    AggregateKey, CachedAggregate, CarDistance, CargoDetail, CargoId, CargoMatchSummary,
    Coordinates, Error, LocationCode, MatchQuery, ResourceKind, distance,
};

type LocationMap = HashMap<LocationCode, Coordinates>;

/// Matching service implementing [`CargoMatchQuery`].
#[derive(Clone)]
pub struct MatchingService<L, C, G, A> {
    locations: Arc<L>,
    cars: Arc<C>,
    cargo: Arc<G>,
    cache: Arc<A>,
    ttl: Duration,
}

impl<L, C, G, A> MatchingService<L, C, G, A> {
    /// Create a service; aggregates are cached for `ttl`.
    pub fn new(locations: Arc<L>, cars: Arc<C>, cargo: Arc<G>, cache: Arc<A>, ttl: Duration) -> Self {
        Self {
            locations,
            cars,
            cargo,
            cache,
            ttl,
        }
    }
}

impl<L, C, G, A> MatchingService<L, C, G, A>
where
    L: LocationRepository,
    C: CarRepository,
    G: CargoRepository,
    A: AggregateCache,
{
    async fn cached(&self, key: &AggregateKey) -> Option<CachedAggregate> {
        match self.cache.get(key).await {
            Ok(Some(value)) => {
                debug!(key = %key, "aggregate cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(key = %key, "aggregate cache miss");
                None
            }
            Err(error) => {
                warn!(key = %key, error = %error, "aggregate cache read failed; computing from store");
                None
            }
        }
    }

    /// Generation to stamp the next `set` with. `None` skips populating.
    async fn observe_generation(&self) -> Option<CacheGeneration> {
        match self.cache.generation().await {
            Ok(generation) => Some(generation),
            Err(error) => {
                warn!(error = %error, "aggregate cache generation unavailable; result will not be cached");
                None
            }
        }
    }

    async fn populate(
        &self,
        key: &AggregateKey,
        value: &CachedAggregate,
        generation: Option<CacheGeneration>,
    ) {
        let Some(generation) = generation else {
            return;
        };
        if let Err(error) = self.cache.set(key, value, self.ttl, generation).await {
            warn!(key = %key, error = %error, "aggregate cache write failed");
        }
    }

    async fn location_map(&self) -> Result<LocationMap, Error> {
        let locations = self.locations.all().await?;
        Ok(locations
            .into_iter()
            .map(|location| (location.code, location.coordinates))
            .collect())
    }

    /// Compute the list aggregation directly from the store.
    pub async fn compute_list(&self, query: MatchQuery) -> Result<Vec<CargoMatchSummary>, Error> {
        let (locations, cars, cargo) = tokio::try_join!(
            self.location_map(),
            async { self.cars.list().await.map_err(Error::from) },
            async {
                self.cargo
                    .list_by_weight(query.weight)
                    .await
                    .map_err(Error::from)
            },
        )?;

        let car_points = cars
            .iter()
            .map(|car| resolve(&locations, car.location))
            .collect::<Result<Vec<_>, _>>()?;

        cargo
            .into_iter()
            .map(|item| {
                let pickup = resolve(&locations, item.pickup)?;
                let nearby = car_points
                    .iter()
                    .filter(|point| query.distance.contains(distance(pickup, **point)))
                    .count();
                Ok(CargoMatchSummary {
                    id: item.id,
                    pickup: item.pickup,
                    delivery: item.delivery,
                    nearby_car_count: u32::try_from(nearby).unwrap_or(u32::MAX),
                })
            })
            .collect()
    }

    /// Compute the detail aggregation directly from the store.
    pub async fn compute_detail(&self, id: CargoId) -> Result<CargoDetail, Error> {
        let cargo = self
            .cargo
            .find(id)
            .await?
            .ok_or_else(|| Error::resource_not_found(ResourceKind::Cargo, id))?;
        let (locations, cars) = tokio::try_join!(self.location_map(), async {
            self.cars.list().await.map_err(Error::from)
        })?;

        let pickup = resolve(&locations, cargo.pickup)?;
        let cars = cars
            .into_iter()
            .map(|car| {
                Ok(CarDistance {
                    distance: distance(pickup, resolve(&locations, car.location)?),
                    plate: car.plate,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(CargoDetail { cargo, cars })
    }
}

fn resolve(locations: &LocationMap, code: LocationCode) -> Result<Coordinates, Error> {
    locations
        .get(&code)
        .copied()
        .ok_or_else(|| Error::resource_not_found(ResourceKind::Location, code))
}

#[async_trait]
impl<L, C, G, A> CargoMatchQuery for MatchingService<L, C, G, A>
where
    L: LocationRepository,
    C: CarRepository,
    G: CargoRepository,
    A: AggregateCache,
{
    async fn list_matches(&self, query: MatchQuery) -> Result<Vec<CargoMatchSummary>, Error> {
        let key = AggregateKey::list(&query);
        match self.cached(&key).await {
            Some(CachedAggregate::List(rows)) => return Ok(rows),
            Some(CachedAggregate::Detail(_)) => {
                warn!(key = %key, "aggregate cache returned a detail for a list key");
            }
            None => {}
        }

        let generation = self.observe_generation().await;
        let rows = self.compute_list(query).await?;
        self.populate(&key, &CachedAggregate::List(rows.clone()), generation)
            .await;
        Ok(rows)
    }

    async fn cargo_detail(&self, id: CargoId) -> Result<CargoDetail, Error> {
        let key = AggregateKey::detail(id);
        match self.cached(&key).await {
            Some(CachedAggregate::Detail(detail)) => return Ok(detail),
            Some(CachedAggregate::List(_)) => {
                warn!(key = %key, "aggregate cache returned a list for a detail key");
            }
            None => {}
        }

        let generation = self.observe_generation().await;
        let detail = self.compute_detail(id).await?;
        self.populate(&key, &CachedAggregate::Detail(detail.clone()), generation)
            .await;
        Ok(detail)
    }
}

#[cfg(test)]
#[path = "matching_service_tests.rs"]
mod tests;
