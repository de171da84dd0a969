//! Background relocation of every car.
//!
//! Each cycle reads all cars and location codes, moves every car to a
//! uniformly chosen location other than its current one, writes the whole
//! batch atomically and then clears every cached aggregate. The loop sleeps
//! between cycles; a failed cycle is logged and the next one still runs.
//!
//! ```text
//! Idle -> Sleeping -> Relocating -> Invalidating -> Sleeping -> ...
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::mutation_service::invalidate;
use crate::domain::ports::{AggregateCache, CarRepository, ClearTarget, LocationRepository};
use crate::domain::{Car, CarRelocation, Error, LocationCode};

/// Async sleeping abstraction so tests can drive cycles without a timer.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Pick a code uniformly from `codes` excluding `current`.
///
/// Returns `None` when `current` is the only known code or `codes` is empty.
fn pick_other<R: Rng + ?Sized>(
    rng: &mut R,
    codes: &[LocationCode],
    current: LocationCode,
) -> Option<LocationCode> {
    match codes.iter().position(|code| *code == current) {
        None => codes.choose(rng).copied(),
        Some(_) if codes.len() < 2 => None,
        Some(position) => {
            let mut index = rng.gen_range(0..codes.len() - 1);
            if index >= position {
                index += 1;
            }
            codes.get(index).copied()
        }
    }
}

/// Periodically relocates all cars and invalidates derived aggregates.
pub struct PositionScheduler<L, C, A> {
    locations: Arc<L>,
    cars: Arc<C>,
    cache: Arc<A>,
    interval: Duration,
    rng: Mutex<SmallRng>,
    sleeper: Arc<dyn Sleeper>,
}

impl<L, C, A> PositionScheduler<L, C, A> {
    /// Create a scheduler running every `interval` with an entropy-seeded RNG.
    pub fn new(locations: Arc<L>, cars: Arc<C>, cache: Arc<A>, interval: Duration) -> Self {
        Self {
            locations,
            cars,
            cache,
            interval,
            rng: Mutex::new(SmallRng::from_entropy()),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the random source, e.g. with a fixed seed.
    pub fn with_rng(mut self, rng: SmallRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Replace the clock used between cycles.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Time between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn plan(&self, cars: &[Car], codes: &[LocationCode]) -> Result<Vec<CarRelocation>, Error> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| Error::internal("relocation rng lock poisoned"))?;
        Ok(cars
            .iter()
            .filter_map(|car| {
                pick_other(&mut *rng, codes, car.location).map(|location| CarRelocation {
                    car_id: car.id,
                    location,
                })
            })
            .collect())
    }
}

impl<L, C, A> PositionScheduler<L, C, A>
where
    L: LocationRepository,
    C: CarRepository,
    A: AggregateCache,
{
    /// Run one relocation cycle and return the number of cars moved.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be read or the batch write is rejected.
    /// Nothing is invalidated unless the batch committed; an invalidation
    /// failure after the commit is logged and not returned.
    pub async fn run_cycle(&self) -> Result<usize, Error> {
        info!("relocation cycle started");
        let (locations, cars) = tokio::try_join!(
            async { self.locations.all().await.map_err(Error::from) },
            async { self.cars.list().await.map_err(Error::from) },
        )?;
        let codes = locations
            .into_iter()
            .map(|location| location.code)
            .collect::<Vec<_>>();

        let relocations = self.plan(&cars, &codes)?;
        if relocations.is_empty() {
            info!(cars = cars.len(), locations = codes.len(), "relocation cycle had nothing to move");
            return Ok(0);
        }

        let moved = self.cars.relocate_all(&relocations).await?;
        invalidate(self.cache.as_ref(), &[ClearTarget::All], "cars relocated").await;
        info!(relocated = moved, "relocation cycle finished");
        Ok(moved)
    }
}

impl<L, C, A> PositionScheduler<L, C, A>
where
    L: LocationRepository + 'static,
    C: CarRepository + 'static,
    A: AggregateCache + 'static,
{
    /// Start the sleep/relocate loop on the Tokio runtime.
    pub fn spawn(self) -> SchedulerHandle {
        let (stop, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "position scheduler started");
            loop {
                tokio::select! {
                    _ = stopped.changed() => break,
                    () = self.sleeper.sleep(self.interval) => {}
                }
                if let Err(err) = self.run_cycle().await {
                    error!(error = %err, "relocation cycle failed");
                }
            }
            info!("position scheduler stopped");
        });
        SchedulerHandle { stop, task }
    }
}

/// Owner of a running scheduler task.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop to stop and wait for it to exit.
    ///
    /// A cycle already in progress finishes first; sleeping is interrupted.
    pub async fn shutdown(self) {
        if self.stop.send(true).is_err() {
            warn!("position scheduler already exited");
        }
        if let Err(err) = self.task.await {
            error!(error = %err, "position scheduler task panicked or was cancelled");
        }
    }
}

#[cfg(test)]
#[path = "position_scheduler_tests.rs"]
mod tests;
