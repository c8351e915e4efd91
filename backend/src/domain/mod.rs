//! Domain core: entities, invariants, services, and ports.
//!
//! Everything here is transport agnostic. Inbound adapters call the driving
//! service; driven adapters implement the ports. The only operation allowed
//! to wait on I/O for an externally bounded duration is the resolver's
//! outbound call, and it never holds a listing record while in flight.

pub mod error;
pub mod events;
pub mod geo;
pub mod geometry;
pub mod listing;
pub mod listing_service;
pub mod ports;
pub mod proximity;
pub mod resolution;

pub use self::error::{Error, ErrorCode};
pub use self::events::LocationChanged;
pub use self::geo::{Coordinate, CoordinateError, Geometry};
pub use self::listing::{Listing, ListingId};
pub use self::listing_service::{
    ListingService, ListingUpdate, LocationEditStatus, NearestListing, NewListing, UpdateListing,
};
pub use self::proximity::{NearestMatch, find_nearest, haversine_km};
pub use self::resolution::{AddressResolver, ResolutionError, ResolvedLocation};
