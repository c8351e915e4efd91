//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **nominatim**: reqwest-backed geocoding source.
//! - **persistence**: the listing store (in-memory stand-in for the
//!   black-box document store).

pub mod nominatim;
pub mod persistence;
