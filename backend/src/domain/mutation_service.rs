//! Mutation gateway for cargo and car records.
//!
//! Every write is applied to the store first; cache invalidation runs only
//! after the store call has returned successfully, so readers observe either
//! the pre-mutation cached value or data computed after the commit.
//!
//! Invalidation policy:
//!
//! | mutation              | cleared                     |
//! |-----------------------|-----------------------------|
//! | create cargo          | all                         |
//! | update/delete cargo   | the cargo's detail, then all|
//! | move a car            | all                         |
//!
//! A failed invalidation does not undo or fail a committed write. It is
//! logged at error level and staleness stays bounded by the entry TTL.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::domain::ports::{
    AggregateCache, CarCommand, CarRepository, CargoCommand, CargoRepository, ClearTarget,
};
use crate::domain::{
    AggregateKey, Car, CarId, Cargo, CargoChanges, CargoId, Error, LocationCode, NewCargo,
};

/// Clear `targets` in order, logging failures.
///
/// Returns whether every clear succeeded.
pub(crate) async fn invalidate<A>(cache: &A, targets: &[ClearTarget], reason: &'static str) -> bool
where
    A: AggregateCache + ?Sized,
{
    let mut complete = true;
    for target in targets {
        match cache.clear(target).await {
            Ok(()) => debug!(?target, reason, "aggregate cache invalidated"),
            Err(err) => {
                error!(?target, reason, error = %err, "aggregate cache invalidation failed");
                complete = false;
            }
        }
    }
    complete
}

/// Applies cargo and car mutations and invalidates derived aggregates.
#[derive(Clone)]
pub struct FleetMutationService<C, G, A> {
    cars: Arc<C>,
    cargo: Arc<G>,
    cache: Arc<A>,
}

impl<C, G, A> FleetMutationService<C, G, A> {
    /// Service writing through `cars` and `cargo` and invalidating `cache`.
    pub fn new(cars: Arc<C>, cargo: Arc<G>, cache: Arc<A>) -> Self {
        Self { cars, cargo, cache }
    }

    fn cargo_targets(id: CargoId) -> [ClearTarget; 2] {
        [
            ClearTarget::Key(AggregateKey::detail(id)),
            ClearTarget::All,
        ]
    }
}

#[async_trait]
impl<C, G, A> CargoCommand for FleetMutationService<C, G, A>
where
    C: CarRepository,
    G: CargoRepository,
    A: AggregateCache,
{
    async fn create_cargo(&self, cargo: NewCargo) -> Result<Cargo, Error> {
        let created = self.cargo.create(&cargo).await?;
        info!(cargo_id = %created.id, pickup = %created.pickup, "cargo created");
        invalidate(self.cache.as_ref(), &[ClearTarget::All], "cargo created").await;
        Ok(created)
    }

    async fn update_cargo(&self, id: CargoId, changes: CargoChanges) -> Result<Cargo, Error> {
        let updated = self.cargo.update(id, &changes).await?;
        info!(cargo_id = %id, "cargo updated");
        invalidate(self.cache.as_ref(), &Self::cargo_targets(id), "cargo updated").await;
        Ok(updated)
    }

    async fn delete_cargo(&self, id: CargoId) -> Result<(), Error> {
        self.cargo.delete(id).await?;
        info!(cargo_id = %id, "cargo deleted");
        invalidate(self.cache.as_ref(), &Self::cargo_targets(id), "cargo deleted").await;
        Ok(())
    }
}

#[async_trait]
impl<C, G, A> CarCommand for FleetMutationService<C, G, A>
where
    C: CarRepository,
    G: CargoRepository,
    A: AggregateCache,
{
    async fn update_car_location(&self, id: CarId, location: LocationCode) -> Result<Car, Error> {
        let car = self.cars.update_location(id, location).await?;
        info!(car_id = %id, location = %location, "car moved");
        invalidate(self.cache.as_ref(), &[ClearTarget::All], "car moved").await;
        Ok(car)
    }
}

#[cfg(test)]
#[path = "mutation_service_tests.rs"]
mod tests;
