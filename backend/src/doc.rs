//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every cargo, car and health endpoint together with
//! the request/response DTOs and the domain error envelope. Swagger UI serves
//! it at `/docs` in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, ResourceKind};
use crate::inbound::http::cargo::{
    CarDistanceResponse, CargoDetailResponse, CargoResponse, CargoSummaryResponse,
    CreateCargoRequest, UpdateCargoRequest,
};
use crate::inbound::http::cars::{CarResponse, UpdateCarLocationRequest};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Freight matching API",
        description = "Cargo records matched against a moving fleet of cars."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::cargo::list_cargo,
        crate::inbound::http::cargo::get_cargo,
        crate::inbound::http::cargo::create_cargo,
        crate::inbound::http::cargo::update_cargo,
        crate::inbound::http::cargo::delete_cargo,
        crate::inbound::http::cars::update_car_location,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CargoSummaryResponse,
        CargoResponse,
        CargoDetailResponse,
        CarDistanceResponse,
        CreateCargoRequest,
        UpdateCargoRequest,
        CarResponse,
        UpdateCarLocationRequest,
        Error,
        ErrorCode,
        ResourceKind
    )),
    tags(
        (name = "cargo", description = "Cargo records and nearby cars"),
        (name = "cars", description = "Fleet positions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case::list("/api/v1/cargo")]
    #[case::detail("/api/v1/cargo/{cargo_id}")]
    #[case::car("/api/v1/cars/{car_id}")]
    #[case::ready("/health/ready")]
    #[case::live("/health/live")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    #[case::detail("CargoDetailResponse", "cars")]
    #[case::distance("CarDistanceResponse", "distance")]
    #[case::create("CreateCargoRequest", "pickup_location")]
    #[case::error("Error", "code")]
    fn schemas_expose_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");

        assert_object_schema_has_field(schema, field);
    }
}
