//! In-memory listing repository.
//!
//! The persistence collaborator is a black box with find/insert/update
//! primitives; this adapter stands in for it. The whole-map write lock
//! serialises writes to a given listing, which is exactly the record-level
//! guarantee the collaborator owes the core (last-writer-wins).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{ListingRepository, ListingRepositoryError};
use crate::domain::{Listing, ListingId};

/// Map-backed [`ListingRepository`] adapter.
#[derive(Default)]
pub struct InMemoryListingRepository {
    listings: RwLock<HashMap<ListingId, Listing>>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, ListingRepositoryError> {
        Ok(self.listings.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Listing>, ListingRepositoryError> {
        Ok(self.listings.read().await.values().cloned().collect())
    }

    async fn insert(&self, listing: Listing) -> Result<(), ListingRepositoryError> {
        self.listings.write().await.insert(listing.id, listing);
        Ok(())
    }

    async fn update(&self, listing: Listing) -> Result<(), ListingRepositoryError> {
        let mut listings = self.listings.write().await;
        if !listings.contains_key(&listing.id) {
            return Err(ListingRepositoryError::NotFound { id: listing.id });
        }
        listings.insert(listing.id, listing);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Geometry;

    fn sample(title: &str) -> Listing {
        Listing::new(title.into(), "somewhere".into(), Geometry::Unresolved)
    }

    #[actix_rt::test]
    async fn insert_then_find_round_trips() {
        let repository = InMemoryListingRepository::new();
        let listing = sample("Canal flat");

        repository.insert(listing.clone()).await.expect("insert");

        let found = repository
            .find_by_id(listing.id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found, listing);
    }

    #[actix_rt::test]
    async fn update_of_missing_listing_is_not_found() {
        let repository = InMemoryListingRepository::new();
        let listing = sample("Canal flat");

        let error = repository.update(listing.clone()).await.expect_err("must fail");
        assert_eq!(error, ListingRepositoryError::NotFound { id: listing.id });
    }

    #[actix_rt::test]
    async fn find_all_returns_every_listing() {
        let repository = InMemoryListingRepository::new();
        repository.insert(sample("a")).await.expect("insert");
        repository.insert(sample("b")).await.expect("insert");

        let all = repository.find_all().await.expect("find_all");
        assert_eq!(all.len(), 2);
    }
}
