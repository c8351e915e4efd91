//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the geocoding provider, the listing store, the live-update fan-out).
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants.

mod geocoding_source;
mod listing_repository;
mod update_publisher;

pub use geocoding_source::GeocodingSource;
pub use listing_repository::{ListingRepository, ListingRepositoryError};
pub use update_publisher::UpdatePublisher;

#[cfg(test)]
pub use geocoding_source::MockGeocodingSource;
#[cfg(test)]
pub use listing_repository::MockListingRepository;
