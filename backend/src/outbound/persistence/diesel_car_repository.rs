//! PostgreSQL-backed `CarRepository`.
//!
//! Batch relocation runs every update inside one transaction; the first
//! missing car or location aborts and rolls back the whole batch.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{CarRepository, CarRepositoryError};
use crate::domain::{Car, CarId, CarRelocation, LocationCode, NewCar};

use super::diesel_error_mapping::{
    CAR_LOCATION_FKEY, CAR_PLATE_KEY, StoreFailure, classify, pool_message,
};
use super::models::{CarRow, NewCarRow};
use super::pool::{DbPool, PoolError};
use super::schema::cars;

#[derive(Clone)]
pub struct DieselCarRepository {
    pool: DbPool,
}

impl DieselCarRepository {
    /// Repository over a shared connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CarRepositoryError {
    CarRepositoryError::connection(pool_message(error))
}

/// Context used to name the record behind a constraint failure.
#[derive(Default)]
struct Referencing<'a> {
    car: Option<CarId>,
    location: Option<LocationCode>,
    plate: Option<&'a str>,
}

fn map_failure(failure: StoreFailure, context: &Referencing<'_>) -> CarRepositoryError {
    match (context.location, context.plate) {
        (Some(location), _) if failure.violates(CAR_LOCATION_FKEY) => {
            return CarRepositoryError::missing_location(location.get());
        }
        (_, Some(plate)) if failure.violates(CAR_PLATE_KEY) => {
            return CarRepositoryError::duplicate_plate(plate);
        }
        _ => {}
    }
    match failure {
        StoreFailure::Connection(message) => CarRepositoryError::connection(message),
        StoreFailure::Query(message) => CarRepositoryError::query(message),
        StoreFailure::NotFound => match context.car {
            Some(car) => CarRepositoryError::record_not_found(car.get()),
            None => CarRepositoryError::query("record not found"),
        },
        other => CarRepositoryError::query(format!("unexpected car store failure: {other:?}")),
    }
}

fn row_to_car(row: CarRow) -> Result<Car, CarRepositoryError> {
    Car::try_from(row).map_err(|err| CarRepositoryError::query(err.to_string()))
}

/// Failure inside the relocation transaction.
enum RelocationFailure {
    Diesel(diesel::result::Error),
    MissingCar(CarId),
    Rejected(CarRelocation, diesel::result::Error),
}

impl From<diesel::result::Error> for RelocationFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

#[async_trait]
impl CarRepository for DieselCarRepository {
    async fn list(&self) -> Result<Vec<Car>, CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CarRow> = cars::table
            .select(CarRow::as_select())
            .order_by(cars::id)
            .load(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), &Referencing::default()))?;
        rows.into_iter().map(row_to_car).collect()
    }

    async fn count(&self) -> Result<u64, CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = cars::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), &Referencing::default()))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn create(&self, car: &NewCar) -> Result<Car, CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCarRow {
            number_plate: car.plate.as_str(),
            current_location: car.location.get(),
            capacity: i32::from(car.capacity.get()),
        };
        let stored: CarRow = diesel::insert_into(cars::table)
            .values(&row)
            .returning(CarRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                map_failure(
                    classify(err),
                    &Referencing {
                        location: Some(car.location),
                        plate: Some(car.plate.as_str()),
                        ..Referencing::default()
                    },
                )
            })?;
        row_to_car(stored)
    }

    async fn update_location(
        &self,
        id: CarId,
        location: LocationCode,
    ) -> Result<Car, CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated: CarRow = diesel::update(cars::table.find(id.get()))
            .set(cars::current_location.eq(location.get()))
            .returning(CarRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                map_failure(
                    classify(err),
                    &Referencing {
                        car: Some(id),
                        location: Some(location),
                        ..Referencing::default()
                    },
                )
            })?;
        row_to_car(updated)
    }

    async fn relocate_all(
        &self,
        relocations: &[CarRelocation],
    ) -> Result<usize, CarRepositoryError> {
        let batch = relocations.to_vec();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let mut moved = 0;
                for relocation in batch {
                    let affected = diesel::update(cars::table.find(relocation.car_id.get()))
                        .set(cars::current_location.eq(relocation.location.get()))
                        .execute(conn)
                        .await
                        .map_err(|err| RelocationFailure::Rejected(relocation, err))?;
                    if affected == 0 {
                        return Err(RelocationFailure::MissingCar(relocation.car_id));
                    }
                    moved += affected;
                }
                Ok::<_, RelocationFailure>(moved)
            }
            .scope_boxed()
        })
        .await
        .map_err(|failure: RelocationFailure| match failure {
            RelocationFailure::Diesel(err) => map_failure(classify(err), &Referencing::default()),
            RelocationFailure::MissingCar(id) => CarRepositoryError::record_not_found(id.get()),
            RelocationFailure::Rejected(relocation, err) => map_failure(
                classify(err),
                &Referencing {
                    car: Some(relocation.car_id),
                    location: Some(relocation.location),
                    ..Referencing::default()
                },
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn plate_violation_maps_to_duplicate_plate() {
        let failure = StoreFailure::Unique {
            constraint: Some(CAR_PLATE_KEY.to_owned()),
        };
        let context = Referencing {
            plate: Some("1111A"),
            ..Referencing::default()
        };

        assert_eq!(
            map_failure(failure, &context),
            CarRepositoryError::duplicate_plate("1111A")
        );
    }

    #[rstest]
    fn location_violation_names_the_code() {
        let failure = StoreFailure::ForeignKey {
            constraint: Some(CAR_LOCATION_FKEY.to_owned()),
        };
        let context = Referencing {
            location: Some(LocationCode::new(14815).expect("code")),
            ..Referencing::default()
        };

        assert_eq!(
            map_failure(failure, &context),
            CarRepositoryError::missing_location(14815)
        );
    }

    #[rstest]
    fn update_of_unknown_car_is_record_not_found() {
        let context = Referencing {
            car: Some(CarId::new(5).expect("id")),
            ..Referencing::default()
        };

        assert_eq!(
            map_failure(StoreFailure::NotFound, &context),
            CarRepositoryError::record_not_found(5)
        );
    }
}
