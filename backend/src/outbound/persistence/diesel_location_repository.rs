//! PostgreSQL-backed `LocationRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::Location;
use crate::domain::ports::{LocationRepository, LocationRepositoryError};

use super::diesel_error_mapping::{StoreFailure, classify, pool_message};
use super::models::LocationRow;
use super::pool::{DbPool, PoolError};
use super::schema::locations;

/// Rows per `INSERT`; keeps bind parameters well under PostgreSQL's limit.
const INSERT_CHUNK: usize = 1_000;

#[derive(Clone)]
pub struct DieselLocationRepository {
    pool: DbPool,
}

impl DieselLocationRepository {
    /// Repository over a shared connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LocationRepositoryError {
    LocationRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> LocationRepositoryError {
    match classify(error) {
        StoreFailure::Connection(message) => LocationRepositoryError::connection(message),
        StoreFailure::Query(message) => LocationRepositoryError::query(message),
        other => LocationRepositoryError::query(format!("{other:?}")),
    }
}

#[async_trait]
impl LocationRepository for DieselLocationRepository {
    async fn all(&self) -> Result<Vec<Location>, LocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<LocationRow> = locations::table
            .select(LocationRow::as_select())
            .order_by(locations::zip_code)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| {
                Location::try_from(row)
                    .map_err(|err| LocationRepositoryError::query(err.to_string()))
            })
            .collect()
    }

    async fn count(&self) -> Result<u64, LocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = locations::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn insert_many(&self, locations: &[Location]) -> Result<usize, LocationRepositoryError> {
        let rows: Vec<LocationRow> = locations.iter().map(LocationRow::from_domain).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let mut written = 0;
                for chunk in rows.chunks(INSERT_CHUNK) {
                    written += diesel::insert_into(locations::table)
                        .values(chunk)
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                }
                Ok(written)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
