//! Domain events emitted after committed mutations.

use super::geo::Coordinate;
use super::listing::ListingId;

/// A listing's geometry changed and every connected viewer should update its
/// marker for that listing in place.
///
/// Carries everything a viewer needs to redraw the marker; it implies nothing
/// about any other listing.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationChanged {
    pub listing_id: ListingId,
    pub title: String,
    pub address_text: String,
    pub coordinates: Coordinate,
}

impl LocationChanged {
    /// Build the event for a listing that has just committed with resolved
    /// geometry.
    pub fn for_listing(
        listing: &super::listing::Listing,
        coordinates: Coordinate,
    ) -> Self {
        Self {
            listing_id: listing.id,
            title: listing.title.clone(),
            address_text: listing.address_text.clone(),
            coordinates,
        }
    }
}
