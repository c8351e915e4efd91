//! Nominatim outbound adapter.
//!
//! A thin HTTP implementation of the `GeocodingSource` port.

mod dto;
mod http_source;

pub use http_source::{
    DEFAULT_GEOCODER_ENDPOINT, DEFAULT_RESOLVE_TIMEOUT, NominatimHttpSource, NominatimIdentity,
};
