//! Listing HTTP handlers.
//!
//! ```text
//! POST /api/v1/listings
//! GET  /api/v1/listings
//! GET  /api/v1/listings/nearest
//! GET  /api/v1/listings/{id}
//! PUT  /api/v1/listings/{id}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Coordinate, Error, Listing, ListingId, LocationEditStatus, NearestListing, NewListing,
    UpdateListing,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request payload for creating a listing.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: String,
    /// Free-text address; must resolve for the create to succeed.
    pub location: String,
}

/// Request payload for editing a listing; absent fields are left untouched.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub location: Option<String>,
}

/// GeoJSON-style point, `[longitude, latitude]`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GeometryResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

/// Response payload for a listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: String,
    pub title: String,
    pub location: String,
    /// Absent while the address has never resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Listing> for ListingResponse {
    fn from(value: Listing) -> Self {
        let geometry = value.geometry.as_point().map(|point| GeometryResponse {
            kind: "Point".to_owned(),
            coordinates: point.lon_lat(),
        });
        Self {
            id: value.id.to_string(),
            title: value.title,
            location: value.address_text,
            geometry,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Response payload for an update, carrying the partial-failure notice.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingResponse {
    pub listing: ListingResponse,
    /// False when a supplied address failed to resolve; the previous
    /// location was kept and the rest of the edit committed.
    pub location_updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Query parameters for the nearest-listing search.
#[derive(Debug, Deserialize, IntoParams)]
pub struct NearestQuery {
    /// Viewer latitude in degrees.
    pub lat: f64,
    /// Viewer longitude in degrees.
    pub lng: f64,
}

/// One nearest-search hit.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearestListingResponse {
    pub listing: ListingResponse,
    pub distance_km: f64,
}

/// Nearest-search envelope; `nearest` is null for "no nearby listings".
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearestResponse {
    pub nearest: Option<NearestListingResponse>,
}

impl From<Option<NearestListing>> for NearestResponse {
    fn from(value: Option<NearestListing>) -> Self {
        Self {
            nearest: value.map(|hit| NearestListingResponse {
                listing: hit.listing.into(),
                distance_km: hit.distance_km,
            }),
        }
    }
}

fn parse_listing_id(raw: &str) -> Result<ListingId, Error> {
    raw.parse().map_err(|_| {
        Error::invalid_request("listing id must be a UUID").with_details(json!({
            "field": "id",
            "value": raw,
        }))
    })
}

fn parse_origin(query: &NearestQuery) -> Result<Coordinate, Error> {
    Coordinate::new(query.lng, query.lat).map_err(|error| {
        Error::invalid_request(format!("invalid viewer position: {error}")).with_details(json!({
            "lat": query.lat,
            "lng": query.lng,
        }))
    })
}

/// Create a listing. Creation requires a resolvable address.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created with resolved geometry", body = ListingResponse),
        (status = 400, description = "Blank title or unresolvable address", body = crate::domain::Error),
        (status = 503, description = "Listing store unavailable", body = crate::domain::Error)
    )
)]
#[post("/listings")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    payload: web::Json<CreateListingRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let listing = state
        .listings
        .create_listing(NewListing {
            title: request.title,
            address_text: request.location,
        })
        .await?;
    Ok(HttpResponse::Created().json(ListingResponse::from(listing)))
}

/// Fetch every listing, for map bootstrap.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    responses(
        (status = 200, description = "All listings", body = [ListingResponse])
    )
)]
#[get("/listings")]
pub async fn list_listings(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let listings = state.listings.list_listings().await?;
    let body: Vec<ListingResponse> = listings.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Find the nearest listing to the viewer's position.
#[utoipa::path(
    get,
    path = "/api/v1/listings/nearest",
    params(NearestQuery),
    responses(
        (status = 200, description = "Nearest listing, or null when none qualify", body = NearestResponse),
        (status = 400, description = "Invalid viewer position", body = crate::domain::Error)
    )
)]
#[get("/listings/nearest")]
pub async fn nearest_listing(
    state: web::Data<HttpState>,
    query: web::Query<NearestQuery>,
) -> ApiResult<HttpResponse> {
    let origin = parse_origin(&query)?;
    let nearest = state.listings.find_nearest(origin).await?;
    Ok(HttpResponse::Ok().json(NearestResponse::from(nearest)))
}

/// Fetch one listing.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "The listing", body = ListingResponse),
        (status = 404, description = "Unknown listing", body = crate::domain::Error)
    )
)]
#[get("/listings/{id}")]
pub async fn get_listing(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_listing_id(&path)?;
    let listing = state.listings.get_listing(id).await?;
    Ok(HttpResponse::Ok().json(ListingResponse::from(listing)))
}

/// Edit a listing. A failed address resolution keeps the previous location
/// while the rest of the edit commits.
#[utoipa::path(
    put,
    path = "/api/v1/listings/{id}",
    params(("id" = String, Path, description = "Listing id")),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Updated listing with location outcome", body = UpdateListingResponse),
        (status = 404, description = "Unknown listing", body = crate::domain::Error)
    )
)]
#[put("/listings/{id}")]
pub async fn update_listing(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateListingRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_listing_id(&path)?;
    let request = payload.into_inner();
    let outcome = state
        .listings
        .update_listing(
            id,
            UpdateListing {
                title: request.title,
                address_text: request.location,
            },
        )
        .await?;

    let location_updated = outcome.location != LocationEditStatus::ResolutionFailed;
    let notice = (outcome.location == LocationEditStatus::ResolutionFailed).then(|| {
        "The new address could not be resolved; the previous location was kept.".to_owned()
    });
    Ok(HttpResponse::Ok().json(UpdateListingResponse {
        listing: outcome.listing.into(),
        location_updated,
        notice,
    }))
}

#[cfg(test)]
#[path = "listings_tests.rs"]
mod tests;
