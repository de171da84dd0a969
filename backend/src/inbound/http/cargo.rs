//! Cargo HTTP handlers.
//!
//! ```text
//! GET    /api/v1/cargo
//! GET    /api/v1/cargo/{cargo_id}
//! POST   /api/v1/cargo
//! PATCH  /api/v1/cargo/{cargo_id}
//! DELETE /api/v1/cargo/{cargo_id}
//! ```
//!
//! Request bodies and query parameters are validated into domain types before
//! any port is called, so rejected requests never reach the store.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Cargo, CargoChanges, CargoDetail, CargoId, CargoMatchSummary, Description, DistanceBand,
    Error, LocationCode, MatchQuery, NewCargo, Weight, WeightBand,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::in_field;

/// Filters of the cargo list. Absent bounds default to the full range.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CargoListParams {
    /// Minimum cargo weight, inclusive (default 1).
    pub weight_min: Option<i64>,
    /// Maximum cargo weight, inclusive (default 1000).
    pub weight_max: Option<i64>,
    /// Minimum car distance in miles, inclusive (default 0).
    pub distance_min: Option<f64>,
    /// Maximum car distance in miles, inclusive (default unbounded).
    pub distance_max: Option<f64>,
}

impl TryFrom<CargoListParams> for MatchQuery {
    type Error = Error;

    fn try_from(params: CargoListParams) -> Result<Self, Self::Error> {
        let bound = |raw: Option<i64>, field, default| {
            raw.map(Weight::new)
                .transpose()
                .map(|weight| weight.unwrap_or(default))
                .map_err(in_field(field))
        };
        let weight = WeightBand::new(
            bound(params.weight_min, "weight_min", Weight::MIN)?,
            bound(params.weight_max, "weight_max", Weight::MAX)?,
        )?;
        Ok(MatchQuery {
            weight,
            distance: DistanceBand::from_bounds(params.distance_min, params.distance_max)?,
        })
    }
}

/// One row of the cargo list.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CargoSummaryResponse {
    pub id: i32,
    pub pickup_location: i32,
    pub delivery_location: i32,
    /// Cars whose distance to the pickup lies inside the requested band.
    pub nearby_car_count: u32,
}

impl From<CargoMatchSummary> for CargoSummaryResponse {
    fn from(value: CargoMatchSummary) -> Self {
        Self {
            id: value.id.get(),
            pickup_location: value.pickup.get(),
            delivery_location: value.delivery.get(),
            nearby_car_count: value.nearby_car_count,
        }
    }
}

/// Stored cargo record.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CargoResponse {
    pub id: i32,
    pub pickup_location: i32,
    pub delivery_location: i32,
    pub weight: u16,
    pub description: String,
}

impl From<Cargo> for CargoResponse {
    fn from(value: Cargo) -> Self {
        Self {
            id: value.id.get(),
            pickup_location: value.pickup.get(),
            delivery_location: value.delivery.get(),
            weight: value.weight.get(),
            description: value.description.as_str().to_owned(),
        }
    }
}

/// Distance from a car to the cargo's pickup location.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CarDistanceResponse {
    pub number_plate: String,
    /// Miles, rounded to two decimal places.
    pub distance: f64,
}

/// Cargo record with every car's distance.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CargoDetailResponse {
    pub id: i32,
    pub pickup_location: i32,
    pub delivery_location: i32,
    pub weight: u16,
    pub description: String,
    pub cars: Vec<CarDistanceResponse>,
}

impl From<CargoDetail> for CargoDetailResponse {
    fn from(value: CargoDetail) -> Self {
        let CargoResponse {
            id,
            pickup_location,
            delivery_location,
            weight,
            description,
        } = value.cargo.into();
        Self {
            id,
            pickup_location,
            delivery_location,
            weight,
            description,
            cars: value
                .cars
                .into_iter()
                .map(|car| CarDistanceResponse {
                    number_plate: car.plate.to_string(),
                    distance: car.distance.rounded(),
                })
                .collect(),
        }
    }
}

/// Request body for creating cargo.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCargoRequest {
    pub pickup_location: i64,
    pub delivery_location: i64,
    /// 1 to 1000 inclusive.
    pub weight: i64,
    /// At most 512 characters.
    #[serde(default)]
    pub description: String,
}

impl TryFrom<CreateCargoRequest> for NewCargo {
    type Error = Error;

    fn try_from(body: CreateCargoRequest) -> Result<Self, Self::Error> {
        Ok(NewCargo {
            pickup: LocationCode::new(body.pickup_location).map_err(in_field("pickup_location"))?,
            delivery: LocationCode::new(body.delivery_location)
                .map_err(in_field("delivery_location"))?,
            weight: Weight::new(body.weight)?,
            description: Description::new(body.description)?,
        })
    }
}

/// Request body for a partial cargo update; at least one field is required.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateCargoRequest {
    pub weight: Option<i64>,
    pub description: Option<String>,
}

impl TryFrom<UpdateCargoRequest> for CargoChanges {
    type Error = Error;

    fn try_from(body: UpdateCargoRequest) -> Result<Self, Self::Error> {
        let weight = body.weight.map(Weight::new).transpose()?;
        let description = body.description.map(Description::new).transpose()?;
        Ok(CargoChanges::new(weight, description)?)
    }
}

fn cargo_id(raw: i64) -> Result<CargoId, Error> {
    Ok(CargoId::new(raw)?)
}

/// List cargo with the number of cars inside the distance band.
#[utoipa::path(
    get,
    path = "/api/v1/cargo",
    params(CargoListParams),
    responses(
        (status = 200, description = "Cargo with nearby car counts", body = [CargoSummaryResponse]),
        (status = 400, description = "Invalid band", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["cargo"],
    operation_id = "listCargo"
)]
#[get("/cargo")]
pub async fn list_cargo(
    state: web::Data<HttpState>,
    params: web::Query<CargoListParams>,
) -> ApiResult<web::Json<Vec<CargoSummaryResponse>>> {
    let query = MatchQuery::try_from(params.into_inner())?;
    let rows = state.matches.list_matches(query).await?;
    Ok(web::Json(rows.into_iter().map(Into::into).collect()))
}

/// Fetch one cargo with every car's distance to its pickup.
#[utoipa::path(
    get,
    path = "/api/v1/cargo/{cargo_id}",
    params(("cargo_id" = i64, Path, description = "Cargo identifier")),
    responses(
        (status = 200, description = "Cargo detail", body = CargoDetailResponse),
        (status = 404, description = "Cargo not found", body = Error)
    ),
    tags = ["cargo"],
    operation_id = "getCargo"
)]
#[get("/cargo/{cargo_id}")]
pub async fn get_cargo(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<CargoDetailResponse>> {
    let id = cargo_id(path.into_inner())?;
    let detail = state.matches.cargo_detail(id).await?;
    Ok(web::Json(detail.into()))
}

/// Create cargo.
#[utoipa::path(
    post,
    path = "/api/v1/cargo",
    request_body = CreateCargoRequest,
    responses(
        (status = 201, description = "Cargo created", body = CargoResponse),
        (status = 400, description = "Invalid cargo", body = Error),
        (status = 404, description = "Referenced location not found", body = Error)
    ),
    tags = ["cargo"],
    operation_id = "createCargo"
)]
#[post("/cargo")]
pub async fn create_cargo(
    state: web::Data<HttpState>,
    payload: web::Json<CreateCargoRequest>,
) -> ApiResult<HttpResponse> {
    let cargo = NewCargo::try_from(payload.into_inner())?;
    let created = state.cargo.create_cargo(cargo).await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/v1/cargo/{}", created.id)))
        .json(CargoResponse::from(created)))
}

/// Update the weight and/or description of cargo.
#[utoipa::path(
    patch,
    path = "/api/v1/cargo/{cargo_id}",
    params(("cargo_id" = i64, Path, description = "Cargo identifier")),
    request_body = UpdateCargoRequest,
    responses(
        (status = 200, description = "Cargo updated", body = CargoResponse),
        (status = 400, description = "Invalid update", body = Error),
        (status = 404, description = "Cargo not found", body = Error)
    ),
    tags = ["cargo"],
    operation_id = "updateCargo"
)]
#[patch("/cargo/{cargo_id}")]
pub async fn update_cargo(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UpdateCargoRequest>,
) -> ApiResult<web::Json<CargoResponse>> {
    let id = cargo_id(path.into_inner())?;
    let changes = CargoChanges::try_from(payload.into_inner())?;
    let updated = state.cargo.update_cargo(id, changes).await?;
    Ok(web::Json(updated.into()))
}

/// Delete cargo.
#[utoipa::path(
    delete,
    path = "/api/v1/cargo/{cargo_id}",
    params(("cargo_id" = i64, Path, description = "Cargo identifier")),
    responses(
        (status = 204, description = "Cargo deleted"),
        (status = 404, description = "Cargo not found", body = Error)
    ),
    tags = ["cargo"],
    operation_id = "deleteCargo"
)]
#[delete("/cargo/{cargo_id}")]
pub async fn delete_cargo(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = cargo_id(path.into_inner())?;
    state.cargo.delete_cargo(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "cargo_tests.rs"]
mod tests;
