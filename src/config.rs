//! Provider configuration.

use crate::error::{Error, Result};

/// Environment variable holding the provider access token.
pub const ACCESS_TOKEN_ENV: &str = "GEOCOMPLETE_ACCESS_TOKEN";

/// Environment variable overriding the provider base URL.
pub const BASE_URL_ENV: &str = "GEOCOMPLETE_BASE_URL";

/// Mapbox places endpoint, the default provider.
pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// Where and how to reach the geocoding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Endpoint that search paths are appended to
    pub base_url: String,
    /// Access token sent as the `access_token` option
    pub access_token: Option<String>,
    /// Request timeout for the HTTP fetcher
    pub timeout_seconds: u64,
}

impl ProviderConfig {
    /// Load provider settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the access token variable is
    /// unset or empty.
    pub fn from_env() -> Result<Self> {
        let access_token = std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::configuration(format!("{ACCESS_TOKEN_ENV} is not set")))?;

        Ok(Self {
            base_url: default_base_url(),
            access_token: Some(access_token),
            ..Self::default()
        })
    }

    /// Base URL without a trailing slash.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            timeout_seconds: 10,
        }
    }
}

/// Get the provider base URL, honouring [`BASE_URL_ENV`].
pub fn default_base_url() -> String {
    match std::env::var(BASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => url,
        _ => DEFAULT_BASE_URL.to_string(),
    }
}
