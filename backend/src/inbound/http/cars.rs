//! Car HTTP handlers.
//!
//! ```text
//! PATCH /api/v1/cars/{car_id}
//! ```

use actix_web::{patch, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Car, CarId, Error, LocationCode};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::in_field;

/// Request body for moving a car.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateCarLocationRequest {
    pub current_location: i64,
}

/// Stored car record.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CarResponse {
    pub id: i32,
    pub number_plate: String,
    pub current_location: i32,
    pub capacity: u16,
}

impl From<Car> for CarResponse {
    fn from(value: Car) -> Self {
        Self {
            id: value.id.get(),
            number_plate: value.plate.to_string(),
            current_location: value.location.get(),
            capacity: value.capacity.get(),
        }
    }
}

/// Move a car to another location.
#[utoipa::path(
    patch,
    path = "/api/v1/cars/{car_id}",
    params(("car_id" = i64, Path, description = "Car identifier")),
    request_body = UpdateCarLocationRequest,
    responses(
        (status = 200, description = "Car moved", body = CarResponse),
        (status = 400, description = "Invalid identifier or location code", body = Error),
        (status = 404, description = "Car or location not found", body = Error)
    ),
    tags = ["cars"],
    operation_id = "updateCarLocation"
)]
#[patch("/cars/{car_id}")]
pub async fn update_car_location(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UpdateCarLocationRequest>,
) -> ApiResult<web::Json<CarResponse>> {
    let id = CarId::new(path.into_inner()).map_err(Error::from)?;
    let location =
        LocationCode::new(payload.current_location).map_err(in_field("current_location"))?;
    let car = state.cars.update_car_location(id, location).await?;
    Ok(web::Json(car.into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{MockCarCommand, MockCargoCommand, MockCargoMatchQuery};
    use crate::domain::{Capacity, NumberPlate, ResourceKind};

    fn state(cars: MockCarCommand) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(MockCargoMatchQuery::new()),
            Arc::new(MockCargoCommand::new()),
            Arc::new(cars),
        ))
    }

    async fn patch_car(cars: MockCarCommand, id: &str, body: Value) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(state(cars))
                .service(web::scope("/api/v1").service(update_car_location)),
        )
        .await;
        let req = test::TestRequest::patch()
            .uri(&format!("/api/v1/cars/{id}"))
            .set_json(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    #[rstest]
    #[actix_web::test]
    async fn moves_the_car() {
        let mut cars = MockCarCommand::new();
        cars.expect_update_car_location()
            .withf(|id, location| id.get() == 2 && location.get() == 14814)
            .return_once(|id, location| {
                Ok(Car {
                    id,
                    plate: NumberPlate::new("2222B").expect("plate"),
                    location,
                    capacity: Capacity::new(700).expect("capacity"),
                })
            });

        let (status, body) = patch_car(cars, "2", json!({ "current_location": 14814 })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "id": 2,
                "number_plate": "2222B",
                "current_location": 14814,
                "capacity": 700
            })
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_location_is_a_location_not_found() {
        let mut cars = MockCarCommand::new();
        cars.expect_update_car_location()
            .return_once(|_, location| {
                Err(Error::resource_not_found(ResourceKind::Location, location))
            });

        let (status, body) = patch_car(cars, "2", json!({ "current_location": 99999 })).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["details"]["resource"], "location");
    }

    #[rstest]
    #[case::zero_id("0", json!({ "current_location": 601 }))]
    #[case::negative_location("1", json!({ "current_location": -5 }))]
    #[actix_web::test]
    async fn invalid_input_never_reaches_the_port(#[case] id: &str, #[case] body: Value) {
        let mut cars = MockCarCommand::new();
        cars.expect_update_car_location().never();

        let (status, body) = patch_car(cars, id, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }
}
