//! Listing mutation and query flows.
//!
//! Orchestrates resolver → geometry invariant → repository → live publish.
//! The resolver call always happens before any repository access so the
//! outbound wait (up to its full timeout) never holds the listing record.

use std::sync::Arc;

use tracing::info;

use super::error::Error;
use super::events::LocationChanged;
use super::geo::{Coordinate, Geometry};
use super::geometry::{self, LocationOutcome};
use super::listing::{Listing, ListingId};
use super::ports::{ListingRepository, ListingRepositoryError, UpdatePublisher};
use super::proximity;
use super::resolution::AddressResolver;

/// Input for creating a listing.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub address_text: String,
}

/// Input for editing a listing; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateListing {
    pub title: Option<String>,
    pub address_text: Option<String>,
}

/// What the edit did to the listing's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationEditStatus {
    /// No address was supplied; location untouched.
    Unchanged,
    /// The new address resolved and the geometry moved.
    Updated,
    /// Resolution failed; the prior geometry and address text were kept and
    /// the rest of the edit still committed.
    ResolutionFailed,
}

/// Result of a committed update.
#[derive(Debug, Clone)]
pub struct ListingUpdate {
    pub listing: Listing,
    pub location: LocationEditStatus,
}

/// A nearest-search hit joined back to its listing.
#[derive(Debug, Clone)]
pub struct NearestListing {
    pub listing: Listing,
    pub distance_km: f64,
}

/// Driving service for the geolocation core.
#[derive(Clone)]
pub struct ListingService {
    repository: Arc<dyn ListingRepository>,
    resolver: AddressResolver,
    updates: Arc<dyn UpdatePublisher>,
}

fn map_repository_error(error: ListingRepositoryError) -> Error {
    match error {
        ListingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("listing store unavailable: {message}"))
        }
        ListingRepositoryError::Query { message } => {
            Error::internal(format!("listing store error: {message}"))
        }
        ListingRepositoryError::NotFound { id } => Error::not_found(format!("listing {id} not found")),
    }
}

impl ListingService {
    pub fn new(
        repository: Arc<dyn ListingRepository>,
        resolver: AddressResolver,
        updates: Arc<dyn UpdatePublisher>,
    ) -> Self {
        Self {
            repository,
            resolver,
            updates,
        }
    }

    /// Create a listing. Creation requires location proof: an unresolvable
    /// address rejects the whole mutation and nothing is persisted.
    ///
    /// # Errors
    ///
    /// `invalid_request` for a blank title or an unresolvable address;
    /// repository failures map to their domain codes.
    pub async fn create_listing(&self, input: NewListing) -> Result<Listing, Error> {
        if input.title.trim().is_empty() {
            return Err(Error::invalid_request("title must not be empty"));
        }

        let resolution = self.resolver.resolve(&input.address_text).await;
        let coordinate = geometry::geometry_for_create(&input.address_text, resolution)?;

        let listing = Listing::new(
            input.title,
            input.address_text,
            Geometry::Point(coordinate),
        );
        self.repository
            .insert(listing.clone())
            .await
            .map_err(map_repository_error)?;

        info!(listing_id = %listing.id, "listing created");
        self.updates
            .publish(LocationChanged::for_listing(&listing, coordinate));
        Ok(listing)
    }

    /// Edit a listing. A supplied address is re-resolved; on failure the
    /// prior geometry and address text are retained while the rest of the
    /// edit commits, and the outcome reports the location was not updated.
    ///
    /// # Errors
    ///
    /// `not_found` for an unknown id; repository failures map to their
    /// domain codes.
    pub async fn update_listing(
        &self,
        id: ListingId,
        input: UpdateListing,
    ) -> Result<ListingUpdate, Error> {
        // Resolve before taking the record so the outbound wait holds no lock.
        let resolution = match &input.address_text {
            Some(address) => Some((address.clone(), self.resolver.resolve(address).await)),
            None => None,
        };

        let mut listing = self
            .repository
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("listing {id} not found")))?;

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(Error::invalid_request("title must not be empty"));
            }
            listing.title = title;
        }

        let (location, changed_coordinate) = match resolution {
            None => (LocationEditStatus::Unchanged, None),
            Some((address, outcome)) => {
                match geometry::apply_resolution(&mut listing, &address, outcome)? {
                    LocationOutcome::Updated(coordinate) => {
                        (LocationEditStatus::Updated, Some(coordinate))
                    }
                    LocationOutcome::KeptPrevious => (LocationEditStatus::ResolutionFailed, None),
                }
            }
        };

        listing.touch();
        self.repository
            .update(listing.clone())
            .await
            .map_err(map_repository_error)?;

        if let Some(coordinate) = changed_coordinate {
            info!(listing_id = %listing.id, "listing geometry updated");
            self.updates
                .publish(LocationChanged::for_listing(&listing, coordinate));
        }

        Ok(ListingUpdate { listing, location })
    }

    /// Fetch one listing.
    ///
    /// # Errors
    ///
    /// `not_found` for an unknown id.
    pub async fn get_listing(&self, id: ListingId) -> Result<Listing, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("listing {id} not found")))
    }

    /// Fetch every listing, for map bootstrap. Late subscribers load this
    /// instead of replaying missed events.
    ///
    /// # Errors
    ///
    /// Repository failures map to their domain codes.
    pub async fn list_listings(&self) -> Result<Vec<Listing>, Error> {
        self.repository.find_all().await.map_err(map_repository_error)
    }

    /// Find the nearest listing with resolved geometry to `origin`.
    ///
    /// `Ok(None)` is the normal "no nearby listings" outcome.
    ///
    /// # Errors
    ///
    /// Repository failures map to their domain codes.
    pub async fn find_nearest(
        &self,
        origin: Coordinate,
    ) -> Result<Option<NearestListing>, Error> {
        let listings = self.repository.find_all().await.map_err(map_repository_error)?;

        let candidates = listings
            .iter()
            .filter_map(|listing| listing.geometry.as_point().map(|point| (listing.id, point)));
        let Some(hit) = proximity::find_nearest(origin, candidates) else {
            return Ok(None);
        };

        let listing = listings
            .into_iter()
            .find(|listing| listing.id == hit.id)
            .ok_or_else(|| Error::internal("nearest candidate vanished from its own snapshot"))?;
        Ok(Some(NearestListing {
            listing,
            distance_km: hit.distance_km,
        }))
    }
}
