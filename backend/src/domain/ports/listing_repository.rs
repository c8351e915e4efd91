//! Driven port for the persistence collaborator.
//!
//! The store is a black box offering find/insert/update-by-id primitives.
//! Serialising concurrent writes to the same listing is the collaborator's
//! responsibility (last-writer-wins at the record level is acceptable).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::listing::{Listing, ListingId};

/// Errors surfaced by listing persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingRepositoryError {
    /// Store connectivity failures.
    #[error("listing store unavailable: {message}")]
    Connection { message: String },
    /// Read or write failures bubbling up from the adapter.
    #[error("listing store query failed: {message}")]
    Query { message: String },
    /// Update target does not exist.
    #[error("listing {id} not found")]
    NotFound { id: ListingId },
}

impl ListingRepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Find/insert/update primitives over the listing collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Fetch a listing by id.
    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Fetch every listing.
    async fn find_all(&self) -> Result<Vec<Listing>, ListingRepositoryError>;

    /// Insert a freshly created listing.
    async fn insert(&self, listing: Listing) -> Result<(), ListingRepositoryError>;

    /// Replace an existing listing by id.
    async fn update(&self, listing: Listing) -> Result<(), ListingRepositoryError>;
}
