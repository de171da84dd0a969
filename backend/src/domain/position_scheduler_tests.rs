//! Tests for the position scheduler.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    AggregateCacheError, CarRepositoryError, MockAggregateCache, MockCarRepository,
};
use crate::domain::{AggregateKey, CachedAggregate, CarId, ErrorCode, MatchQuery};
use crate::outbound::cache::InMemoryAggregateCache;
use crate::outbound::memory_store::InMemoryFleetStore;
use crate::test_support::{code, located_store, new_car, scenario_locations, scenario_store};

const INTERVAL: Duration = Duration::from_secs(60);
const TTL: Duration = Duration::from_secs(300);

type StoreScheduler<A> = PositionScheduler<InMemoryFleetStore, InMemoryFleetStore, A>;

fn seeded<A>(store: Arc<InMemoryFleetStore>, cache: Arc<A>, seed: u64) -> StoreScheduler<A> {
    PositionScheduler::new(store.clone(), store, cache, INTERVAL)
        .with_rng(SmallRng::seed_from_u64(seed))
}

async fn positions(store: &InMemoryFleetStore) -> HashMap<CarId, LocationCode> {
    CarRepository::list(store)
        .await
        .expect("cars")
        .into_iter()
        .map(|car| (car.id, car.location))
        .collect()
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(42)]
#[case(2024)]
#[tokio::test]
async fn every_car_moves_to_a_different_location(#[case] seed: u64) {
    let store = Arc::new(scenario_store().await);
    let scheduler = seeded(store.clone(), Arc::new(InMemoryAggregateCache::new()), seed);
    let before = positions(&store).await;

    let moved = scheduler.run_cycle().await.expect("cycle");

    let after = positions(&store).await;
    assert_eq!(moved, 3);
    for (id, old) in &before {
        let new = after[id];
        assert_ne!(new, *old, "car {id} kept its location");
        assert!(scenario_locations().iter().any(|l| l.code == new));
    }
}

#[rstest]
#[tokio::test]
async fn cycle_clears_cached_aggregates() {
    let store = Arc::new(scenario_store().await);
    let cache = Arc::new(InMemoryAggregateCache::new());
    let key = AggregateKey::list(&MatchQuery::default());
    let generation = cache.generation().await.expect("generation");
    cache
        .set(&key, &CachedAggregate::List(Vec::new()), TTL, generation)
        .await
        .expect("warm");

    seeded(store, cache.clone(), 3)
        .run_cycle()
        .await
        .expect("cycle");

    assert!(cache.get(&key).await.expect("get").is_none());
    assert!(cache.generation().await.expect("generation") > generation);
}

#[rstest]
#[tokio::test]
async fn single_location_leaves_cars_in_place() {
    let store = Arc::new(InMemoryFleetStore::new());
    store
        .insert_many(&scenario_locations()[..1])
        .await
        .expect("one location");
    CarRepository::create(store.as_ref(), &new_car("1111A", 601, 10))
        .await
        .expect("car");
    let mut cache = MockAggregateCache::new();
    cache.expect_clear().never();

    let moved = seeded(store.clone(), Arc::new(cache), 9)
        .run_cycle()
        .await
        .expect("cycle");

    assert_eq!(moved, 0);
    assert!(positions(&store).await.values().all(|l| *l == code(601)));
}

#[rstest]
#[tokio::test]
async fn no_cars_is_a_no_op() {
    let store = Arc::new(located_store().await);
    let mut cache = MockAggregateCache::new();
    cache.expect_clear().never();

    let moved = seeded(store, Arc::new(cache), 1)
        .run_cycle()
        .await
        .expect("cycle");

    assert_eq!(moved, 0);
}

#[rstest]
#[tokio::test]
async fn rejected_batch_is_reported_and_not_invalidated() {
    let store = Arc::new(scenario_store().await);
    let mut cars = MockCarRepository::new();
    let mut cache = MockAggregateCache::new();
    let snapshot = CarRepository::list(store.as_ref()).await.expect("cars");
    cars.expect_list().return_once(move || Ok(snapshot));
    cars.expect_relocate_all()
        .return_once(|_| Err(CarRepositoryError::connection("pool exhausted")));
    cache.expect_clear().never();

    let scheduler = PositionScheduler::new(store, Arc::new(cars), Arc::new(cache), INTERVAL);
    let error = scheduler.run_cycle().await.expect_err("batch rejected");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn failed_invalidation_does_not_fail_the_cycle() {
    let store = Arc::new(scenario_store().await);
    let mut cache = MockAggregateCache::new();
    cache
        .expect_clear()
        .times(1)
        .returning(|_| Err(AggregateCacheError::backend("timeout")));

    let moved = seeded(store, Arc::new(cache), 5)
        .run_cycle()
        .await
        .expect("cycle");

    assert_eq!(moved, 3);
}

#[rstest]
fn pick_other_is_none_without_alternatives() {
    let mut rng = SmallRng::seed_from_u64(0);
    assert_eq!(pick_other(&mut rng, &[], code(601)), None);
    assert_eq!(pick_other(&mut rng, &[code(601)], code(601)), None);
}

#[rstest]
fn pick_other_reaches_every_alternative() {
    let mut rng = SmallRng::seed_from_u64(11);
    let codes = [code(601), code(602), code(14814)];
    let mut seen = HashMap::new();
    for _ in 0..200 {
        let picked = pick_other(&mut rng, &codes, code(602)).expect("alternative");
        *seen.entry(picked).or_insert(0) += 1;
    }

    assert!(!seen.contains_key(&code(602)));
    assert!(seen.contains_key(&code(601)));
    assert!(seen.contains_key(&code(14814)));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn spawned_loop_keeps_running_after_a_failed_cycle() {
    let store = Arc::new(scenario_store().await);
    let snapshot = CarRepository::list(store.as_ref()).await.expect("cars");
    let calls = Arc::new(AtomicUsize::new(0));
    let relocations = Arc::new(AtomicUsize::new(0));

    let mut cars = MockCarRepository::new();
    let list_calls = calls.clone();
    cars.expect_list().returning(move || {
        if list_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(CarRepositoryError::query("transient"))
        } else {
            Ok(snapshot.clone())
        }
    });
    let relocated = relocations.clone();
    cars.expect_relocate_all().returning(move |batch| {
        relocated.fetch_add(1, Ordering::SeqCst);
        Ok(batch.len())
    });
    let mut cache = MockAggregateCache::new();
    cache.expect_clear().returning(|_| Ok(()));

    let handle = PositionScheduler::new(store, Arc::new(cars), Arc::new(cache), INTERVAL)
        .with_rng(SmallRng::seed_from_u64(8))
        .spawn();
    tokio::time::sleep(INTERVAL * 2 + Duration::from_secs(1)).await;
    handle.shutdown().await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(relocations.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_sleep() {
    let store = Arc::new(scenario_store().await);
    let before = positions(&store).await;
    let handle = seeded(store.clone(), Arc::new(InMemoryAggregateCache::new()), 4)
        .spawn();

    tokio::time::sleep(INTERVAL / 2).await;
    handle.shutdown().await;

    assert_eq!(positions(&store).await, before);
}
