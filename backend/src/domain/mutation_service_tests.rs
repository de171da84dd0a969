//! Tests for the mutation gateway and its invalidation policy.

use mockall::Sequence;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    AggregateCacheError, CargoRepositoryError, CarRepositoryError, MockAggregateCache,
    MockCarRepository, MockCargoRepository,
};
use crate::domain::{Capacity, Description, ErrorCode, NumberPlate, ResourceKind, Weight};
use crate::test_support::{code, new_cargo};

type Gateway = FleetMutationService<MockCarRepository, MockCargoRepository, MockAggregateCache>;

fn gateway(
    cars: MockCarRepository,
    cargo: MockCargoRepository,
    cache: MockAggregateCache,
) -> Gateway {
    FleetMutationService::new(Arc::new(cars), Arc::new(cargo), Arc::new(cache))
}

fn cargo_id(raw: i64) -> CargoId {
    CargoId::new(raw).expect("cargo id")
}

fn stored_cargo(id: i64, weight: i64) -> Cargo {
    Cargo {
        id: cargo_id(id),
        pickup: code(601),
        delivery: code(602),
        weight: Weight::new(weight).expect("weight"),
        description: Description::new("crates").expect("description"),
    }
}

fn weight_change(raw: i64) -> CargoChanges {
    CargoChanges::new(Some(Weight::new(raw).expect("weight")), None).expect("changes")
}

#[rstest]
#[tokio::test]
async fn create_writes_then_clears_everything() {
    let mut sequence = Sequence::new();
    let mut cargo = MockCargoRepository::new();
    let mut cache = MockAggregateCache::new();
    cargo
        .expect_create()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(stored_cargo(4, 250)));
    cache
        .expect_clear()
        .withf(|target| *target == ClearTarget::All)
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));

    let created = gateway(MockCarRepository::new(), cargo, cache)
        .create_cargo(new_cargo(601, 602, 250, "crates"))
        .await
        .expect("create");

    assert_eq!(created.id, cargo_id(4));
}

#[rstest]
#[tokio::test]
async fn update_clears_the_detail_then_everything() {
    let mut sequence = Sequence::new();
    let mut cargo = MockCargoRepository::new();
    let mut cache = MockAggregateCache::new();
    cargo
        .expect_update()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok(stored_cargo(1, 650)));
    cache
        .expect_clear()
        .withf(|target| *target == ClearTarget::Key(AggregateKey::detail(cargo_id(1))))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));
    cache
        .expect_clear()
        .withf(|target| *target == ClearTarget::All)
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));

    let updated = gateway(MockCarRepository::new(), cargo, cache)
        .update_cargo(cargo_id(1), weight_change(650))
        .await
        .expect("update");

    assert_eq!(updated.weight.get(), 650);
}

#[rstest]
#[tokio::test]
async fn delete_of_missing_cargo_leaves_the_cache_alone() {
    let mut cargo = MockCargoRepository::new();
    let mut cache = MockAggregateCache::new();
    cargo
        .expect_delete()
        .returning(|id| Err(CargoRepositoryError::record_not_found(id.get())));
    cache.expect_clear().never();

    let error = gateway(MockCarRepository::new(), cargo, cache)
        .delete_cargo(cargo_id(9))
        .await
        .expect_err("missing cargo");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.resource(), Some(ResourceKind::Cargo));
}

#[rstest]
#[tokio::test]
async fn committed_write_survives_a_failed_invalidation() {
    let mut cargo = MockCargoRepository::new();
    let mut cache = MockAggregateCache::new();
    cargo.expect_delete().times(1).returning(|_| Ok(()));
    cache
        .expect_clear()
        .times(2)
        .returning(|_| Err(AggregateCacheError::backend("connection reset")));

    gateway(MockCarRepository::new(), cargo, cache)
        .delete_cargo(cargo_id(2))
        .await
        .expect("delete still succeeds");
}

#[rstest]
#[tokio::test]
async fn moving_a_car_clears_everything() {
    let mut sequence = Sequence::new();
    let mut cars = MockCarRepository::new();
    let mut cache = MockAggregateCache::new();
    cars.expect_update_location()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|id, location| {
            Ok(Car {
                id,
                plate: NumberPlate::new("1111A").expect("plate"),
                location,
                capacity: Capacity::new(600).expect("capacity"),
            })
        });
    cache
        .expect_clear()
        .withf(|target| *target == ClearTarget::All)
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));

    let car = gateway(cars, MockCargoRepository::new(), cache)
        .update_car_location(CarId::new(1).expect("id"), code(14814))
        .await
        .expect("move");

    assert_eq!(car.location, code(14814));
}

#[rstest]
#[case::unknown_location(
    CarRepositoryError::missing_location(99999),
    ResourceKind::Location
)]
#[case::unknown_car(CarRepositoryError::record_not_found(5), ResourceKind::Car)]
#[tokio::test]
async fn rejected_car_move_reports_which_record_is_missing(
    #[case] failure: CarRepositoryError,
    #[case] resource: ResourceKind,
) {
    let mut cars = MockCarRepository::new();
    let mut cache = MockAggregateCache::new();
    cars.expect_update_location()
        .return_once(move |_, _| Err(failure));
    cache.expect_clear().never();

    let error = gateway(cars, MockCargoRepository::new(), cache)
        .update_car_location(CarId::new(5).expect("id"), code(99999))
        .await
        .expect_err("rejected move");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.resource(), Some(resource));
}

#[rstest]
#[tokio::test]
async fn invalidate_reports_partial_failure() {
    let mut cache = MockAggregateCache::new();
    cache
        .expect_clear()
        .withf(|target| matches!(target, ClearTarget::Key(_)))
        .returning(|_| Err(AggregateCacheError::backend("timeout")));
    cache
        .expect_clear()
        .withf(|target| *target == ClearTarget::All)
        .returning(|_| Ok(()));

    let complete = invalidate(
        &cache,
        &[
            ClearTarget::Key(AggregateKey::detail(cargo_id(1))),
            ClearTarget::All,
        ],
        "test",
    )
    .await;

    assert!(!complete);
}
