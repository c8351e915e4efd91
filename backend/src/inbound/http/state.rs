//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they depend
//! only on the driving service and remain testable without real I/O behind
//! it.

use std::sync::Arc;

use crate::domain::ListingService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub listings: Arc<ListingService>,
}

impl HttpState {
    /// Construct state from the driving service.
    pub fn new(listings: Arc<ListingService>) -> Self {
        Self { listings }
    }
}
