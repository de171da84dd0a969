//! End-to-end HTTP tests over the in-process store and cache.
//!
//! Locations are loaded through the seeder from a small `uszips.csv`-style
//! file; cars and cargo are inserted directly so identifiers are known.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use freight::Trace;
use freight::domain::ports::{CarRepository, CargoRepository};
use freight::domain::{
    Capacity, Description, FleetMutationService, FleetSeeder, LocationCode, MatchingService,
    NewCar, NewCargo, NumberPlate, PositionScheduler, Weight,
};
use freight::inbound::http::cargo::{
    create_cargo, delete_cargo, get_cargo, list_cargo, update_cargo,
};
use freight::inbound::http::cars::update_car_location;
use freight::inbound::http::state::HttpState;
use freight::inbound::http::validation::{json_config, path_config, query_config};
use freight::middleware::trace::TRACE_ID_HEADER;
use freight::outbound::cache::InMemoryAggregateCache;
use freight::outbound::csv_locations::CsvLocationSource;
use freight::outbound::memory_store::InMemoryFleetStore;

const LOCATIONS_CSV: &str = "\
\"zip\",\"lat\",\"lng\",\"city\",\"state_id\",\"state_name\"
\"00601\",\"18.18027\",\"-66.75266\",\"Adjuntas\",\"PR\",\"Puerto Rico\"
\"00602\",\"18.36075\",\"-67.17541\",\"Aguada\",\"PR\",\"Puerto Rico\"
\"14814\",\"42.15525\",\"-76.95148\",\"Big Flats\",\"NY\",\"New York\"
";

struct Fleet {
    store: Arc<InMemoryFleetStore>,
    cache: Arc<InMemoryAggregateCache>,
    state: web::Data<HttpState>,
}

fn code(raw: i64) -> LocationCode {
    LocationCode::new(raw).expect("location code")
}

#[fixture]
async fn fleet() -> Fleet {
    let store = Arc::new(InMemoryFleetStore::new());
    let cache = Arc::new(InMemoryAggregateCache::new());

    let mut csv = tempfile::NamedTempFile::new().expect("temp file");
    csv.write_all(LOCATIONS_CSV.as_bytes()).expect("write csv");
    let report = FleetSeeder::new(store.clone(), store.clone(), 0)
        .with_source(Arc::new(CsvLocationSource::new(csv.path())))
        .seed()
        .await
        .expect("seed locations");
    assert_eq!(report.locations_inserted, 3);

    let cars = [("1111A", 601, 600), ("2222B", 602, 700), ("3333C", 14814, 1000)];
    for (plate, location, capacity) in cars {
        let car = NewCar {
            plate: NumberPlate::new(plate).expect("plate"),
            location: code(location),
            capacity: Capacity::new(capacity).expect("capacity"),
        };
        CarRepository::create(store.as_ref(), &car).await.expect("car");
    }
    for (pickup, delivery, weight) in [(601, 602, 500), (601, 14814, 700), (602, 14814, 300)] {
        let cargo = NewCargo {
            pickup: code(pickup),
            delivery: code(delivery),
            weight: Weight::new(weight).expect("weight"),
            description: Description::new(format!("{pickup} to {delivery}")).expect("description"),
        };
        CargoRepository::create(store.as_ref(), &cargo).await.expect("cargo");
    }

    let matches = MatchingService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        cache.clone(),
        Duration::from_secs(300),
    );
    let mutations = Arc::new(FleetMutationService::new(
        store.clone(),
        store.clone(),
        cache.clone(),
    ));
    let state = HttpState::new(Arc::new(matches), mutations.clone(), mutations);
    let state = web::Data::new(state);
    Fleet {
        store,
        cache,
        state,
    }
}

async fn service(
    state: web::Data<HttpState>,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(state)
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .service(list_cargo)
                    .service(get_cargo)
                    .service(create_cargo)
                    .service(update_cargo)
                    .service(delete_cargo)
                    .service(update_car_location),
            ),
    )
    .await
}

/// Cargo id to nearby car count.
fn counts(body: &Value) -> HashMap<i64, i64> {
    body.as_array()
        .expect("list body")
        .iter()
        .map(|row| {
            (
                row["id"].as_i64().expect("id"),
                row["nearby_car_count"].as_i64().expect("count"),
            )
        })
        .collect()
}

/// Number plate to rounded distance.
fn distances(body: &Value) -> HashMap<String, f64> {
    body["cars"]
        .as_array()
        .expect("cars")
        .iter()
        .map(|car| {
            (
                car["number_plate"].as_str().expect("plate").to_owned(),
                car["distance"].as_f64().expect("distance"),
            )
        })
        .collect()
}

async fn get_json<S>(app: &S, uri: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::call_and_read_body_json(app, test::TestRequest::get().uri(uri).to_request()).await
}

#[rstest]
#[case::default_band("/api/v1/cargo", [(1, 3), (2, 3), (3, 3)])]
#[case::within_450_miles("/api/v1/cargo?distance_max=450", [(1, 2), (2, 2), (3, 2)])]
#[case::nearby_only("/api/v1/cargo?distance_max=10", [(1, 1), (2, 1), (3, 1)])]
#[actix_web::test]
async fn list_counts_cars_inside_the_band(
    #[future] fleet: Fleet,
    #[case] uri: &str,
    #[case] expected: [(i64, i64); 3],
) {
    let app = service(fleet.await.state).await;

    let body = get_json(&app, uri).await;

    assert_eq!(counts(&body), HashMap::from(expected));
}

#[rstest]
#[actix_web::test]
async fn weight_band_filters_cargo(#[future] fleet: Fleet) {
    let app = service(fleet.await.state).await;

    let body = get_json(&app, "/api/v1/cargo?weight_min=400&weight_max=600").await;

    assert_eq!(counts(&body), HashMap::from([(1, 3)]));
}

#[rstest]
#[actix_web::test]
async fn out_of_range_weight_is_rejected_with_a_trace_id(#[future] fleet: Fleet) {
    let app = service(fleet.await.state).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/cargo?weight_max=1500")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "weight_max");
    assert_eq!(body["traceId"], header.as_str());
}

#[rstest]
#[actix_web::test]
async fn detail_reports_every_car_distance(#[future] fleet: Fleet) {
    let app = service(fleet.await.state).await;

    let body = get_json(&app, "/api/v1/cargo/1").await;

    assert_eq!(body["weight"], 500);
    assert_eq!(
        distances(&body),
        HashMap::from([
            ("1111A".to_owned(), 0.0),
            ("2222B".to_owned(), 30.42),
            ("3333C".to_owned(), 1757.56),
        ])
    );
}

#[rstest]
#[actix_web::test]
async fn updates_are_visible_to_the_next_read(#[future] fleet: Fleet) {
    let app = service(fleet.await.state).await;
    let before = get_json(&app, "/api/v1/cargo/1").await;
    let light = get_json(&app, "/api/v1/cargo?weight_max=600").await;
    assert_eq!(before["weight"], 500);
    assert_eq!(counts(&light).len(), 2);

    let req = test::TestRequest::patch()
        .uri("/api/v1/cargo/1")
        .set_json(json!({ "weight": 650, "description": "heavier" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["weight"], 650);

    let after = get_json(&app, "/api/v1/cargo/1").await;
    assert_eq!(after["weight"], 650);
    assert_eq!(after["description"], "heavier");
    let light = get_json(&app, "/api/v1/cargo?weight_max=600").await;
    assert_eq!(counts(&light), HashMap::from([(3, 3)]));
}

#[rstest]
#[actix_web::test]
async fn created_cargo_appears_in_the_cached_list(#[future] fleet: Fleet) {
    let app = service(fleet.await.state).await;
    assert_eq!(counts(&get_json(&app, "/api/v1/cargo").await).len(), 3);

    let req = test::TestRequest::post()
        .uri("/api/v1/cargo")
        .set_json(json!({
            "pickup_location": 14814,
            "delivery_location": 601,
            "weight": 20,
            "description": "return load"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let listed = counts(&get_json(&app, "/api/v1/cargo?distance_max=10").await);
    assert_eq!(listed.get(&4), Some(&1));
}

#[rstest]
#[actix_web::test]
async fn deleted_cargo_is_gone(#[future] fleet: Fleet) {
    let app = service(fleet.await.state).await;
    get_json(&app, "/api/v1/cargo/2").await;

    let req = test::TestRequest::delete().uri("/api/v1/cargo/2").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri("/api/v1/cargo/2").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["resource"], "cargo");
    let listed = counts(&get_json(&app, "/api/v1/cargo").await);
    assert!(!listed.contains_key(&2));
}

#[rstest]
#[actix_web::test]
async fn moving_a_car_refreshes_nearby_counts(#[future] fleet: Fleet) {
    let app = service(fleet.await.state).await;
    let before = counts(&get_json(&app, "/api/v1/cargo?distance_max=10").await);
    assert_eq!(before.get(&1), Some(&1));

    let req = test::TestRequest::patch()
        .uri("/api/v1/cars/3")
        .set_json(json!({ "current_location": 601 }))
        .to_request();
    let car: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(car["current_location"], 601);

    let after = counts(&get_json(&app, "/api/v1/cargo?distance_max=10").await);
    assert_eq!(after, HashMap::from([(1, 2), (2, 2), (3, 1)]));
}

#[rstest]
#[actix_web::test]
async fn moving_a_car_to_an_unknown_location_is_404(#[future] fleet: Fleet) {
    let app = service(fleet.await.state).await;

    let req = test::TestRequest::patch()
        .uri("/api/v1/cars/1")
        .set_json(json!({ "current_location": 99999 }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["resource"], "location");
}

#[rstest]
#[actix_web::test]
async fn relocation_cycle_invalidates_cached_details(#[future] fleet: Fleet) {
    let fleet = fleet.await;
    let app = service(fleet.state.clone()).await;
    let before = distances(&get_json(&app, "/api/v1/cargo/1").await);

    let moved = PositionScheduler::new(
        fleet.store.clone(),
        fleet.store.clone(),
        fleet.cache.clone(),
        Duration::from_secs(180),
    )
    .with_rng(SmallRng::seed_from_u64(7))
    .run_cycle()
    .await
    .expect("cycle");
    assert_eq!(moved, 3);

    let after = distances(&get_json(&app, "/api/v1/cargo/1").await);
    for (plate, distance) in &before {
        assert_ne!(after.get(plate), Some(distance), "{plate} should have moved");
    }
}
