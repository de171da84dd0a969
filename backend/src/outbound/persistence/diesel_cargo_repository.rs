//! PostgreSQL-backed `CargoRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CargoRepository, CargoRepositoryError};
use crate::domain::{Cargo, CargoChanges, CargoId, NewCargo, WeightBand};

use super::diesel_error_mapping::{
    CARGO_DELIVERY_FKEY, CARGO_PICKUP_FKEY, StoreFailure, classify, pool_message,
};
use super::models::{CargoRow, CargoUpdate, NewCargoRow};
use super::pool::{DbPool, PoolError};
use super::schema::cargo;

#[derive(Clone)]
pub struct DieselCargoRepository {
    pool: DbPool,
}

impl DieselCargoRepository {
    /// Repository over a shared connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CargoRepositoryError {
    CargoRepositoryError::connection(pool_message(error))
}

fn map_failure(
    failure: StoreFailure,
    target: Option<CargoId>,
    references: Option<&NewCargo>,
) -> CargoRepositoryError {
    match failure {
        StoreFailure::Connection(message) => CargoRepositoryError::connection(message),
        StoreFailure::Query(message) => CargoRepositoryError::query(message),
        StoreFailure::NotFound => match target {
            Some(id) => CargoRepositoryError::record_not_found(id.get()),
            None => CargoRepositoryError::query("record not found"),
        },
        ref fk @ StoreFailure::ForeignKey { .. } => match references {
            Some(new) if fk.violates(CARGO_PICKUP_FKEY) => {
                CargoRepositoryError::missing_location(new.pickup.get())
            }
            Some(new) if fk.violates(CARGO_DELIVERY_FKEY) => {
                CargoRepositoryError::missing_location(new.delivery.get())
            }
            _ => CargoRepositoryError::query(format!("unrecognised foreign key violation: {fk:?}")),
        },
        other => CargoRepositoryError::query(format!("unexpected cargo store failure: {other:?}")),
    }
}

fn row_to_cargo(row: CargoRow) -> Result<Cargo, CargoRepositoryError> {
    Cargo::try_from(row).map_err(|err| CargoRepositoryError::query(err.to_string()))
}

#[async_trait]
impl CargoRepository for DieselCargoRepository {
    async fn list_by_weight(&self, band: WeightBand) -> Result<Vec<Cargo>, CargoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CargoRow> = cargo::table
            .filter(cargo::weight.between(
                i32::from(band.min().get()),
                i32::from(band.max().get()),
            ))
            .select(CargoRow::as_select())
            .order_by(cargo::id)
            .load(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), None, None))?;
        rows.into_iter().map(row_to_cargo).collect()
    }

    async fn find(&self, id: CargoId) -> Result<Option<Cargo>, CargoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CargoRow> = cargo::table
            .find(id.get())
            .select(CargoRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(classify(err), Some(id), None))?;
        row.map(row_to_cargo).transpose()
    }

    async fn create(&self, new: &NewCargo) -> Result<Cargo, CargoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCargoRow {
            pickup_location: new.pickup.get(),
            delivery_location: new.delivery.get(),
            weight: i32::from(new.weight.get()),
            description: new.description.as_str(),
        };
        let stored: CargoRow = diesel::insert_into(cargo::table)
            .values(&row)
            .returning(CargoRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), None, Some(new)))?;
        row_to_cargo(stored)
    }

    async fn update(
        &self,
        id: CargoId,
        changes: &CargoChanges,
    ) -> Result<Cargo, CargoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = CargoUpdate {
            weight: changes.weight().map(|weight| i32::from(weight.get())),
            description: changes.description().map(|text| text.as_str()),
        };
        let updated: CargoRow = diesel::update(cargo::table.find(id.get()))
            .set(&changeset)
            .returning(CargoRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), Some(id), None))?;
        row_to_cargo(updated)
    }

    async fn delete(&self, id: CargoId) -> Result<(), CargoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(cargo::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), Some(id), None))?;
        if removed == 0 {
            return Err(CargoRepositoryError::record_not_found(id.get()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Description, LocationCode, Weight};
    use rstest::rstest;

    fn new_cargo() -> NewCargo {
        NewCargo {
            pickup: LocationCode::new(601).expect("code"),
            delivery: LocationCode::new(14815).expect("code"),
            weight: Weight::new(500).expect("weight"),
            description: Description::new("boxes").expect("description"),
        }
    }

    #[rstest]
    #[case(CARGO_PICKUP_FKEY, 601)]
    #[case(CARGO_DELIVERY_FKEY, 14815)]
    fn foreign_key_names_the_offending_location(#[case] constraint: &str, #[case] code: i32) {
        let failure = StoreFailure::ForeignKey {
            constraint: Some(constraint.to_owned()),
        };

        assert_eq!(
            map_failure(failure, None, Some(&new_cargo())),
            CargoRepositoryError::missing_location(code)
        );
    }

    #[rstest]
    fn not_found_names_the_target_cargo() {
        let id = CargoId::new(9).expect("id");
        assert_eq!(
            map_failure(StoreFailure::NotFound, Some(id), None),
            CargoRepositoryError::record_not_found(9)
        );
    }
}
