//! Listing handler tests against the full service with a mocked geocoder.

use std::sync::Arc;

use actix_web::{App, test, web};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::MockGeocodingSource;
use crate::domain::{AddressResolver, ListingService, ResolvedLocation};
use crate::live::SubscriberRegistry;
use crate::outbound::persistence::InMemoryListingRepository;

fn state_with(source: MockGeocodingSource) -> HttpState {
    let registry = Arc::new(SubscriberRegistry::new());
    let service = ListingService::new(
        Arc::new(InMemoryListingRepository::new()),
        AddressResolver::new(Arc::new(source)),
        registry,
    );
    HttpState::new(Arc::new(service))
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new().app_data(web::Data::new($state)).service(
                web::scope("/api/v1")
                    .service(create_listing)
                    .service(list_listings)
                    .service(nearest_listing)
                    .service(get_listing)
                    .service(update_listing),
            ),
        )
        .await
    };
}

fn paris_geocoder() -> MockGeocodingSource {
    let mut source = MockGeocodingSource::new();
    source
        .expect_resolve()
        .withf(|address| address == "Paris, France")
        .returning(|_| {
            Ok(ResolvedLocation {
                longitude: 2.3514,
                latitude: 48.8575,
                display_name: "Paris, Île-de-France, France".into(),
            })
        });
    source
}

#[actix_rt::test]
async fn create_returns_201_with_point_geometry() {
    let app = init_app!(state_with(paris_geocoder()));

    let request = test::TestRequest::post()
        .uri("/api/v1/listings")
        .set_json(json!({ "title": "Canal flat", "location": "Paris, France" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), 201);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["geometry"]["type"], "Point");
    let coordinates = body["geometry"]["coordinates"]
        .as_array()
        .expect("coordinate pair");
    let lon = coordinates[0].as_f64().expect("longitude");
    let lat = coordinates[1].as_f64().expect("latitude");
    assert!((lon - 2.35).abs() < 0.5);
    assert!((lat - 48.85).abs() < 0.5);
}

#[actix_rt::test]
async fn create_with_unresolvable_address_is_400_and_names_it() {
    let mut source = MockGeocodingSource::new();
    source
        .expect_resolve()
        .returning(|_| Err(crate::domain::ResolutionError::NotFound));
    let app = init_app!(state_with(source));

    let request = test::TestRequest::post()
        .uri("/api/v1/listings")
        .set_json(json!({ "title": "Nowhere house", "location": "???invalid???" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), 400);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert!(
        body["message"]
            .as_str()
            .expect("message")
            .contains("???invalid???")
    );
    assert_eq!(body["details"]["code"], "unresolvable_address");
}

#[actix_rt::test]
async fn update_with_failed_resolution_keeps_location_and_reports_it() {
    let mut source = paris_geocoder();
    source
        .expect_resolve()
        .withf(|address| address == "???invalid???")
        .returning(|_| Err(crate::domain::ResolutionError::NotFound));
    let app = init_app!(state_with(source));

    let create = test::TestRequest::post()
        .uri("/api/v1/listings")
        .set_json(json!({ "title": "Canal flat", "location": "Paris, France" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, create).await;
    let id = created["id"].as_str().expect("id");

    let update = test::TestRequest::put()
        .uri(&format!("/api/v1/listings/{id}"))
        .set_json(json!({ "location": "???invalid???" }))
        .to_request();
    let response = test::call_service(&app, update).await;

    assert_eq!(response.status(), 200);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["locationUpdated"], false);
    assert!(body["notice"].as_str().expect("notice").contains("kept"));
    assert_eq!(body["listing"]["location"], "Paris, France");
    assert_eq!(body["listing"]["geometry"], created["geometry"]);
}

#[actix_rt::test]
async fn nearest_with_empty_store_is_null_not_an_error() {
    let app = init_app!(state_with(MockGeocodingSource::new()));

    let request = test::TestRequest::get()
        .uri("/api/v1/listings/nearest?lat=48.85&lng=2.35")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), 200);
    let body: Value = test::read_body_json(response).await;
    assert!(body["nearest"].is_null());
}

#[actix_rt::test]
async fn nearest_returns_the_closest_listing_and_distance() {
    let mut source = paris_geocoder();
    source
        .expect_resolve()
        .withf(|address| address == "Lisbon, Portugal")
        .returning(|_| {
            Ok(ResolvedLocation {
                longitude: -9.14,
                latitude: 38.72,
                display_name: "Lisboa, Portugal".into(),
            })
        });
    let app = init_app!(state_with(source));

    for (title, location) in [
        ("Canal flat", "Paris, France"),
        ("Harbour loft", "Lisbon, Portugal"),
    ] {
        let request = test::TestRequest::post()
            .uri("/api/v1/listings")
            .set_json(json!({ "title": title, "location": location }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), 201);
    }

    // A viewer in Brussels is nearer to Paris than to Lisbon.
    let request = test::TestRequest::get()
        .uri("/api/v1/listings/nearest?lat=50.85&lng=4.35")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["nearest"]["listing"]["title"], "Canal flat");
    let distance = body["nearest"]["distanceKm"].as_f64().expect("distance");
    assert!(distance > 200.0 && distance < 350.0);
}

#[actix_rt::test]
async fn nearest_rejects_an_out_of_range_position() {
    let app = init_app!(state_with(MockGeocodingSource::new()));

    let request = test::TestRequest::get()
        .uri("/api/v1/listings/nearest?lat=120.0&lng=2.35")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), 400);
}

#[actix_rt::test]
async fn unknown_listing_id_is_404() {
    let app = init_app!(state_with(MockGeocodingSource::new()));

    let request = test::TestRequest::get()
        .uri("/api/v1/listings/00000000-0000-0000-0000-000000000000")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), 404);
}
