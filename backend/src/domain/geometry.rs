//! The geometry invariant applied at every listing mutation.
//!
//! A listing's stored geometry is either explicitly `Unresolved` or matches
//! the most recent successful resolution of its address text. Creation
//! requires location proof; a failed update keeps the previous geometry and
//! the previous address text on purpose, so working coordinates are never
//! nulled out because a retry failed.

use serde_json::json;

use super::error::Error;
use super::geo::Coordinate;
use super::listing::Listing;
use super::resolution::{ResolutionError, ResolvedLocation};

/// What a mutation did to the listing's location fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationOutcome {
    /// Geometry and address text now reflect the new resolution.
    Updated(Coordinate),
    /// Resolution failed; geometry and address text kept their prior values.
    KeptPrevious,
}

impl LocationOutcome {
    /// True when the mutation changed the stored geometry.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

fn coordinate_from(resolution: &ResolvedLocation) -> Result<Coordinate, Error> {
    // Adapters validate ranges already; a failure here is a programming error
    // in an adapter, not a user-facing condition.
    Coordinate::new(resolution.longitude, resolution.latitude)
        .map_err(|error| Error::internal(format!("geocoder produced invalid coordinates: {error}")))
}

/// Rejection for a create whose address did not resolve, naming the
/// offending text so the caller can surface an actionable message.
pub fn creation_rejected(address_text: &str, error: &ResolutionError) -> Error {
    Error::invalid_request(format!("could not resolve address \"{address_text}\""))
        .with_details(json!({
            "field": "location",
            "value": address_text,
            "code": "unresolvable_address",
            "reason": error.to_string(),
        }))
}

/// Apply a create-time resolution outcome.
///
/// # Errors
///
/// A failed resolution rejects the whole mutation: a listing cannot be
/// created without a resolvable address.
pub fn geometry_for_create(
    address_text: &str,
    resolution: Result<ResolvedLocation, ResolutionError>,
) -> Result<Coordinate, Error> {
    match resolution {
        Ok(resolved) => coordinate_from(&resolved),
        Err(error) => Err(creation_rejected(address_text, &error)),
    }
}

/// Apply an update-time resolution outcome to the listing in place.
///
/// On success both `geometry` and `address_text` move forward together; on
/// failure both retain their prior values and the caller is told the
/// location was not updated (the rest of the edit still commits).
///
/// # Errors
///
/// Only when the resolved coordinates are out of range, which indicates a
/// faulty adapter.
pub fn apply_resolution(
    listing: &mut Listing,
    address_text: &str,
    resolution: Result<ResolvedLocation, ResolutionError>,
) -> Result<LocationOutcome, Error> {
    match resolution {
        Ok(resolved) => {
            let coordinate = coordinate_from(&resolved)?;
            listing.geometry = super::geo::Geometry::Point(coordinate);
            listing.address_text = address_text.to_owned();
            Ok(LocationOutcome::Updated(coordinate))
        }
        Err(_) => Ok(LocationOutcome::KeptPrevious),
    }
}
