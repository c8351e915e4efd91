//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: the listing endpoints, the health probes, and the
//! shared error schema. Debug builds expose the generated document at
//! `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::listings::{
    CreateListingRequest, GeometryResponse, ListingResponse, NearestListingResponse,
    NearestResponse, UpdateListingRequest, UpdateListingResponse,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Listings backend API",
        description = "HTTP interface for listing management, proximity search, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::listings::create_listing,
        crate::inbound::http::listings::list_listings,
        crate::inbound::http::listings::nearest_listing,
        crate::inbound::http::listings::get_listing,
        crate::inbound::http::listings::update_listing,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateListingRequest,
        UpdateListingRequest,
        GeometryResponse,
        ListingResponse,
        UpdateListingResponse,
        NearestListingResponse,
        NearestResponse,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "listings", description = "Listing management and proximity search"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
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

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn openapi_lists_every_listing_endpoint() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/listings",
            "/api/v1/listings/nearest",
            "/api/v1/listings/{id}",
            "/health/ready",
            "/health/live",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path '{path}'"
            );
        }
    }
}
