//! Server construction and wiring.
//!
//! Builds the dependency graph from [`ServerSettings`]: in-memory listing
//! storage, the Nominatim-backed resolver, the live update registry, and the
//! HTTP and WebSocket adapters on top of them.

mod config;

pub use config::{ServerSettings, SettingsError};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::{AddressResolver, ListingService};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::listings::{
    create_listing, get_listing, list_listings, nearest_listing, update_listing,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::ws;
use crate::inbound::ws::state::WsState;
use crate::live::SubscriberRegistry;
use crate::outbound::nominatim::NominatimHttpSource;
use crate::outbound::persistence::InMemoryListingRepository;
#[cfg(debug_assertions)]
use utoipa::OpenApi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
    } = deps;

    // `/listings/nearest` must precede `/listings/{id}` so "nearest" is not
    // captured as an identifier.
    let api = web::scope("/api/v1")
        .service(create_listing)
        .service(list_listings)
        .service(nearest_listing)
        .service(get_listing)
        .service(update_listing);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .service(api)
        .service(ws::ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.route(
        "/api-docs/openapi.json",
        web::get().to(|| async { web::Json(ApiDoc::openapi()) }),
    );

    app
}

fn build_geocoder(settings: &ServerSettings) -> std::io::Result<NominatimHttpSource> {
    let endpoint = settings.geocoder_endpoint().map_err(std::io::Error::other)?;
    NominatimHttpSource::with_identity(
        endpoint,
        settings.geocoder_timeout(),
        settings.geocoder_identity(),
    )
    .map_err(std::io::Error::other)
}

/// Construct an Actix HTTP server from the provided settings.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when the settings are malformed, the
/// geocoder client cannot be constructed, or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    settings: &ServerSettings,
) -> std::io::Result<Server> {
    let registry = Arc::new(SubscriberRegistry::new());
    let listings = Arc::new(ListingService::new(
        Arc::new(InMemoryListingRepository::new()),
        AddressResolver::new(Arc::new(build_geocoder(settings)?)),
        registry.clone(),
    ));

    let http_state = web::Data::new(HttpState::new(listings.clone()));
    let ws_state = web::Data::new(WsState::new(registry, listings));
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
