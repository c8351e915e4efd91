//! Reqwest-backed Nominatim source adapter.
//!
//! This adapter owns transport details only: query shaping, the bounded
//! wait, HTTP error mapping, and JSON decoding into the domain location.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::NominatimPlaceDto;
use crate::domain::ports::GeocodingSource;
use crate::domain::{ResolutionError, ResolvedLocation};

/// Hard upper bound on one resolution attempt. Exceeding it is terminal for
/// the mutation attempt; there is no retry.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Public Nominatim search endpoint used when no override is configured.
pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
const DEFAULT_USER_AGENT: &str = "listings-backend-geocoder/0.1 (ops@listings.invalid)";

/// Outbound identity settings for Nominatim requests. The provider requires
/// an identifying `User-Agent`.
pub struct NominatimIdentity {
    pub user_agent: String,
}

impl Default for NominatimIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Geocoding adapter performing one HTTP GET per resolution attempt.
pub struct NominatimHttpSource {
    client: Client,
    endpoint: Url,
    user_agent: String,
}

impl NominatimHttpSource {
    /// Build an adapter with an explicit endpoint and outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        endpoint: Url,
        timeout: Duration,
        identity: NominatimIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            user_agent: identity.user_agent,
        })
    }
}

#[async_trait]
impl GeocodingSource for NominatimHttpSource {
    async fn resolve(&self, address: &str) -> Result<ResolvedLocation, ResolutionError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_first_match(body.as_ref())
    }
}

fn parse_first_match(body: &[u8]) -> Result<ResolvedLocation, ResolutionError> {
    let mut places: Vec<NominatimPlaceDto> = serde_json::from_slice(body).map_err(|error| {
        ResolutionError::upstream(format!("invalid Nominatim JSON payload: {error}"))
    })?;
    if places.is_empty() {
        return Err(ResolutionError::NotFound);
    }
    // First match wins; lower precision is an accepted trade for simplicity.
    places
        .swap_remove(0)
        .into_resolved_location()
        .map_err(ResolutionError::upstream)
}

fn map_transport_error(error: reqwest::Error) -> ResolutionError {
    if error.is_timeout() {
        ResolutionError::timeout(error.to_string())
    } else {
        ResolutionError::upstream(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ResolutionError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ResolutionError::timeout(message)
        }
        _ => ResolutionError::upstream(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
