//! Address resolution: outcome types and the resolver service.
//!
//! The resolver never raises past its boundary. Every failure mode of the
//! upstream geocoder collapses into [`ResolutionError`]; callers decide what
//! the user sees (reject a create, keep prior geometry on update).

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use super::ports::GeocodingSource;

/// A successful geocoder result, valid only at the moment of the call.
///
/// Components are already validated finite and in range by the adapter that
/// produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub longitude: f64,
    pub latitude: f64,
    /// Provider-supplied display label for the match.
    pub display_name: String,
}

/// Failure taxonomy for address resolution.
///
/// Beyond logging, callers cannot distinguish the upstream causes: every
/// variant means "treat the address as unresolved for this attempt".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The address was empty or whitespace-only; no lookup was attempted.
    #[error("address text must not be empty")]
    EmptyInput,
    /// The provider answered but had no match for the address.
    #[error("no location found for the address")]
    NotFound,
    /// The bounded wait (5 s) elapsed. Terminal for this attempt; no retry.
    #[error("geocoding timed out: {message}")]
    Timeout { message: String },
    /// Transport fault, non-2xx status, or an undecodable response body.
    #[error("geocoding upstream failure: {message}")]
    Upstream { message: String },
}

impl ResolutionError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

/// Resolves free-text addresses through a [`GeocodingSource`].
///
/// Owns the input guard and the structured logging of failures so every
/// adapter behind the port inherits them.
#[derive(Clone)]
pub struct AddressResolver {
    source: Arc<dyn GeocodingSource>,
}

impl AddressResolver {
    pub fn new(source: Arc<dyn GeocodingSource>) -> Self {
        Self { source }
    }

    /// Resolve an address to a location, or a tagged failure.
    ///
    /// Empty or whitespace-only input short-circuits to
    /// [`ResolutionError::EmptyInput`] without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] for empty input and for every upstream
    /// failure mode.
    pub async fn resolve(&self, address: &str) -> Result<ResolvedLocation, ResolutionError> {
        if address.trim().is_empty() {
            return Err(ResolutionError::EmptyInput);
        }

        self.source.resolve(address).await.inspect_err(|error| {
            warn!(address, error = %error, "address resolution failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockGeocodingSource;
    use rstest::rstest;

    fn resolver_with(source: MockGeocodingSource) -> AddressResolver {
        AddressResolver::new(Arc::new(source))
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    #[actix_rt::test]
    async fn empty_input_never_reaches_the_source(#[case] address: &str) {
        let mut source = MockGeocodingSource::new();
        source.expect_resolve().times(0);

        let outcome = resolver_with(source).resolve(address).await;
        assert_eq!(outcome, Err(ResolutionError::EmptyInput));
    }

    #[actix_rt::test]
    async fn successful_resolution_passes_through() {
        let mut source = MockGeocodingSource::new();
        source.expect_resolve().times(1).returning(|_| {
            Ok(ResolvedLocation {
                longitude: 2.3514,
                latitude: 48.8575,
                display_name: "Paris, Île-de-France, France".into(),
            })
        });

        let location = resolver_with(source)
            .resolve("Paris, France")
            .await
            .expect("resolvable address");
        assert!((-180.0..=180.0).contains(&location.longitude));
        assert!((-90.0..=90.0).contains(&location.latitude));
        assert!(location.longitude.is_finite() && location.latitude.is_finite());
    }

    #[actix_rt::test]
    async fn upstream_failures_are_returned_not_raised() {
        let mut source = MockGeocodingSource::new();
        source
            .expect_resolve()
            .times(1)
            .returning(|_| Err(ResolutionError::timeout("deadline elapsed")));

        let outcome = resolver_with(source).resolve("???invalid???").await;
        assert!(matches!(outcome, Err(ResolutionError::Timeout { .. })));
    }
}
