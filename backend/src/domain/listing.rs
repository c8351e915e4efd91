//! The listing aggregate.
//!
//! The persistence collaborator owns listings; the core only touches
//! `geometry` and `address_text` through the repository port. `id` is
//! assigned at creation and immutable thereafter.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use super::geo::Geometry;

/// Opaque listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ListingId(Uuid);

impl ListingId {
    /// Allocate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ListingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A marketplace listing, restricted to the fields the geolocation core
/// reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    /// Display label used in viewer notifications.
    pub title: String,
    /// Human-entered location string. When a later edit fails to resolve,
    /// this keeps its previous value alongside the previous geometry.
    pub address_text: String,
    pub geometry: Geometry,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Build a new listing with freshly assigned id and timestamps.
    pub fn new(title: String, address_text: String, geometry: Geometry) -> Self {
        let now = Utc::now();
        Self {
            id: ListingId::generate(),
            title,
            address_text,
            geometry,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a mutation time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
