//! Driven port for the external geocoding provider.

use async_trait::async_trait;

use crate::domain::resolution::{ResolutionError, ResolvedLocation};

/// One bounded outbound lookup per call; no retry, no caching.
///
/// Implementations must map every transport fault, non-2xx status, empty
/// result set, and undecodable body into [`ResolutionError`] rather than
/// panicking or leaking adapter error types.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocodingSource: Send + Sync {
    /// Resolve a non-empty address to its first provider match.
    async fn resolve(&self, address: &str) -> Result<ResolvedLocation, ResolutionError>;
}
