//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{Fleet, build_fleet};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use freight::Trace;
#[cfg(debug_assertions)]
use freight::doc::ApiDoc;
use freight::domain::SchedulerHandle;
use freight::inbound::http::cargo::{
    create_cargo, delete_cargo, get_cargo, list_cargo, update_cargo,
};
use freight::inbound::http::cars::update_car_location;
use freight::inbound::http::health::{HealthState, live, ready};
use freight::inbound::http::state::HttpState;
use freight::inbound::http::validation::{json_config, path_config, query_config};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(list_cargo)
        .service(get_cargo)
        .service(create_cargo)
        .service(update_cargo)
        .service(delete_cargo)
        .service(update_car_location);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Seed the fleet, start the position scheduler and bind the HTTP server.
///
/// Readiness is marked once the listener is bound. The returned
/// [`SchedulerHandle`] must be shut down after the server stops.
///
/// # Errors
///
/// Propagates seeding failures and [`std::io::Error`] from binding the
/// socket.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<(Server, SchedulerHandle)> {
    let Fleet {
        http_state,
        scheduler,
    } = build_fleet(&config).await?;

    let server_health_state = health_state.clone();
    let bound = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(config.bind_addr);
    let server = match bound {
        Ok(server) => server.run(),
        Err(err) => {
            scheduler.shutdown().await;
            return Err(err);
        }
    };

    health_state.mark_ready();
    Ok((server, scheduler))
}
