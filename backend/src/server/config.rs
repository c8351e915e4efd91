//! Server settings loaded via OrthoConfig.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::nominatim::{
    DEFAULT_GEOCODER_ENDPOINT, DEFAULT_RESOLVE_TIMEOUT, NominatimIdentity,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration values controlling the HTTP listener and the outbound
/// geocoder. Values come from environment variables with the `SERVER_`
/// prefix, falling back to the defaults below.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SERVER")]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Override for the geocoder search endpoint.
    pub geocoder_endpoint: Option<String>,
    /// `User-Agent` sent with geocoder requests; the public provider
    /// requires an identifying value.
    pub geocoder_user_agent: Option<String>,
    /// Per-request geocoder timeout in seconds.
    pub geocoder_timeout_secs: Option<u64>,
}

/// Settings that failed validation after loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid geocoder endpoint {value:?}: {source}")]
    GeocoderEndpoint {
        value: String,
        source: url::ParseError,
    },
}

impl ServerSettings {
    /// Return the configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Return the configured geocoder endpoint, falling back to the public
    /// Nominatim search endpoint.
    pub fn geocoder_endpoint(&self) -> Result<Url, SettingsError> {
        let value = self
            .geocoder_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODER_ENDPOINT);
        Url::parse(value).map_err(|source| SettingsError::GeocoderEndpoint {
            value: value.to_owned(),
            source,
        })
    }

    /// Return the outbound identity for geocoder requests.
    pub fn geocoder_identity(&self) -> NominatimIdentity {
        match &self.geocoder_user_agent {
            Some(user_agent) => NominatimIdentity {
                user_agent: user_agent.clone(),
            },
            None => NominatimIdentity::default(),
        }
    }

    /// Return the geocoder timeout, falling back to the default.
    pub fn geocoder_timeout(&self) -> Duration {
        self.geocoder_timeout_secs
            .map_or(DEFAULT_RESOLVE_TIMEOUT, Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("backend")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("SERVER_BIND_ADDR", None::<String>),
            ("SERVER_GEOCODER_ENDPOINT", None::<String>),
            ("SERVER_GEOCODER_USER_AGENT", None::<String>),
            ("SERVER_GEOCODER_TIMEOUT_SECS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("valid default"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("parse")
        );
        assert_eq!(
            settings.geocoder_endpoint().expect("valid default").as_str(),
            DEFAULT_GEOCODER_ENDPOINT
        );
        assert_eq!(settings.geocoder_timeout(), DEFAULT_RESOLVE_TIMEOUT);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SERVER_BIND_ADDR", Some("127.0.0.1:9100".to_owned())),
            (
                "SERVER_GEOCODER_ENDPOINT",
                Some("https://geocoder.internal/search".to_owned()),
            ),
            (
                "SERVER_GEOCODER_USER_AGENT",
                Some("staging-geocoder/1.0".to_owned()),
            ),
            ("SERVER_GEOCODER_TIMEOUT_SECS", Some("2".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("valid override"),
            "127.0.0.1:9100".parse::<SocketAddr>().expect("parse")
        );
        assert_eq!(
            settings.geocoder_endpoint().expect("valid override").as_str(),
            "https://geocoder.internal/search"
        );
        assert_eq!(
            settings.geocoder_identity().user_agent,
            "staging-geocoder/1.0"
        );
        assert_eq!(settings.geocoder_timeout(), Duration::from_secs(2));
    }

    #[rstest]
    fn malformed_bind_address_is_rejected() {
        let _guard = lock_env([("SERVER_BIND_ADDR", Some("not-an-address".to_owned()))]);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }
}

