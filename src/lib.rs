//! # geocomplete
//!
//! Address autocomplete for text inputs, backed by a Mapbox-style geocoding
//! provider.
//!
//! The crate queries the provider as the user types, keeps a navigable
//! dropdown of suggestions and, once a suggestion is committed, turns the
//! provider's display name into structured address fields.
//!
//! ## Features
//!
//! - **Debounced search**: one provider request per pause in typing
//! - **Keyboard navigation**: wrapping focus, Enter to commit, Escape to dismiss
//! - **Address normalization**: road number, road name, city, postcode, country
//! - **Postcode lookups**: cities and localities get their postcode by reverse search
//! - **Pluggable transport**: any [`Fetch`] implementation, `reqwest` by default
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geocomplete::{Autocomplete, AutocompleteConfig, SearchOptions};
//!
//! # async fn run() -> geocomplete::Result<()> {
//! let autocomplete = Autocomplete::new(AutocompleteConfig::from_env()?)?;
//!
//! let records = autocomplete.search("10 rue de Paris", &SearchOptions::new()).await?;
//! if let Some(record) = records.first() {
//!     let address = autocomplete.normalizer().normalize(record).await;
//!     println!("{}", address.address());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod options;
pub mod session;
pub mod stats;
pub mod suggestions;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export main API
#[cfg(feature = "http")]
pub use client::HttpFetcher;
pub use client::{Fetch, GeocodeClient};
pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use normalizer::{
    AddressComponents, AddressNormalizer, NormalizationWarning, NormalizedAddress,
};
pub use options::{OptionValue, SearchOptions};
pub use session::{InputSessionController, KeyCommand, SelectionEvent, SessionState, WidgetEvent};
pub use suggestions::{DropdownState, SuggestionEntry, SuggestionListController};
pub use types::*;

/// Main entry point: a configured provider client plus factories for
/// normalizers and input sessions.
///
/// # Examples
///
/// ```rust,no_run
/// use geocomplete::{Autocomplete, AutocompleteConfig, SearchOptions};
///
/// let config = AutocompleteConfig::builder()
///     .access_token("pk.example")
///     .country("be")
///     .build();
/// let autocomplete = Autocomplete::new(config)?;
/// let session = autocomplete.into_session(SearchOptions::new());
/// # Ok::<(), geocomplete::Error>(())
/// ```
#[derive(Debug)]
pub struct Autocomplete<F> {
    config: AutocompleteConfig,
    client: GeocodeClient<F>,
}

#[cfg(feature = "http")]
impl Autocomplete<HttpFetcher> {
    /// Create an autocomplete talking to the provider over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL is not an HTTP(S) URL,
    /// or [`Error::Transport`] if the HTTP client cannot be built.
    pub fn new(config: AutocompleteConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.provider.timeout_seconds)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetch> Autocomplete<F> {
    /// Create an autocomplete using a custom transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL is not an HTTP(S) URL.
    pub fn with_fetcher(config: AutocompleteConfig, fetcher: F) -> Result<Self> {
        config.validate()?;
        let client = GeocodeClient::new(fetcher, &config);
        Ok(Self { config, client })
    }

    /// The provider client.
    pub fn client(&self) -> &GeocodeClient<F> {
        &self.client
    }

    /// Create a normalizer borrowing the provider client.
    pub fn normalizer(&self) -> AddressNormalizer<'_, F> {
        AddressNormalizer::new(&self.client)
    }

    /// Run a forward search directly, bypassing any session.
    ///
    /// # Errors
    ///
    /// See [`GeocodeClient::search`].
    pub async fn search(
        &self,
        term: &str,
        overrides: &SearchOptions,
    ) -> Result<Vec<RawPlaceRecord>> {
        self.client.search(term, overrides).await
    }

    /// Turn this autocomplete into the session of one input widget.
    pub fn into_session(self, overrides: SearchOptions) -> InputSessionController<F> {
        InputSessionController::new(self.client, overrides)
    }

    /// Get the configuration.
    pub fn config(&self) -> &AutocompleteConfig {
        &self.config
    }
}

/// Configuration for an [`Autocomplete`].
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteConfig {
    /// Provider endpoint and credentials
    pub provider: ProviderConfig,
    /// ISO country filter sent with every search
    pub country: Option<String>,
    /// Result language for forward searches
    pub language: Option<String>,
    /// Bounding box restricting forward searches
    pub bounding_box: Option<BoundingBox>,
    /// Maximum records per search
    pub limit: u32,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            country: Some("fr".to_string()),
            language: Some("fr".to_string()),
            bounding_box: Some(BoundingBox::FRANCE),
            limit: options::DEFAULT_LIMIT,
        }
    }
}

impl AutocompleteConfig {
    /// Create a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geocomplete::AutocompleteConfig;
    ///
    /// let config = AutocompleteConfig::builder()
    ///     .access_token("pk.example")
    ///     .limit(8)
    ///     .build();
    /// assert_eq!(config.limit, 8);
    /// ```
    pub fn builder() -> AutocompleteConfigBuilder {
        AutocompleteConfigBuilder::new()
    }

    /// Default configuration with provider settings read from the
    /// environment.
    ///
    /// # Errors
    ///
    /// See [`ProviderConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            provider: ProviderConfig::from_env()?,
            ..Self::default()
        })
    }

    /// Check that the provider base URL is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] unless the base URL starts with
    /// `http://` or `https://` and has a host.
    pub fn validate(&self) -> Result<()> {
        let url = self.provider.trimmed_base_url();
        let host = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(|| Error::invalid_url(format!("not an HTTP(S) URL: {url}")))?;
        if host.is_empty() {
            return Err(Error::invalid_url(format!("missing host: {url}")));
        }
        Ok(())
    }

    /// Options sent with every forward search.
    pub fn search_defaults(&self) -> SearchOptions {
        SearchOptions::forward_defaults(
            self.provider.access_token.as_deref(),
            self.country.as_deref(),
            self.language.as_deref(),
            self.bounding_box,
            self.limit,
        )
    }

    /// Options sent with every reverse search.
    pub fn reverse_defaults(&self) -> SearchOptions {
        SearchOptions::reverse_defaults(
            self.provider.access_token.as_deref(),
            self.country.as_deref(),
            self.limit,
        )
    }
}

/// Builder for AutocompleteConfig.
#[derive(Debug, Clone, Default)]
pub struct AutocompleteConfigBuilder {
    config: AutocompleteConfig,
}

impl AutocompleteConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.provider.access_token = Some(token.into());
        self
    }

    /// Set the provider base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.provider.base_url = url.into();
        self
    }

    /// Set the request timeout of the HTTP fetcher.
    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.provider.timeout_seconds = seconds;
        self
    }

    /// Set the whole provider configuration.
    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.config.provider = provider;
        self
    }

    /// Set the country filter.
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.config.country = Some(country.into());
        self
    }

    /// Set the result language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = Some(language.into());
        self
    }

    /// Set the bounding box for forward searches.
    pub fn bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.config.bounding_box = Some(bbox);
        self
    }

    /// Drop the country, language and bounding box restrictions.
    pub fn unrestricted(mut self) -> Self {
        self.config.country = None;
        self.config.language = None;
        self.config.bounding_box = None;
        self
    }

    /// Set the maximum number of records per search.
    pub fn limit(mut self, limit: u32) -> Self {
        self.config.limit = limit;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AutocompleteConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::test_support::{StubFetcher, record, test_config};

    #[test]
    fn test_config_defaults() {
        let config = AutocompleteConfig::default();
        assert_eq!(config.country.as_deref(), Some("fr"));
        assert_eq!(config.language.as_deref(), Some("fr"));
        assert_eq!(config.bounding_box, Some(BoundingBox::FRANCE));
        assert_eq!(config.limit, 5);
    }

    #[test]
    fn test_builder_unrestricted() {
        let config = AutocompleteConfig::builder()
            .access_token("pk.test")
            .unrestricted()
            .limit(3)
            .build();
        let query = config.search_defaults().to_query_string();

        assert!(query.contains("limit=3"));
        assert!(!query.contains("country="));
        assert!(!query.contains("bbox="));
        assert!(!query.contains("language="));
    }

    #[test]
    fn test_reverse_defaults_skip_language_and_bbox() {
        let query = test_config().reverse_defaults().to_query_string();
        assert!(query.contains("country=fr"));
        assert!(!query.contains("language="));
        assert!(!query.contains("bbox="));
    }

    #[test]
    fn test_validate_base_url() {
        assert!(test_config().validate().is_ok());

        let config = AutocompleteConfig::builder()
            .base_url("ftp://geo.test")
            .build();
        assert_matches!(config.validate(), Err(Error::InvalidUrl { .. }));

        let config = AutocompleteConfig::builder().base_url("https://").build();
        assert_matches!(
            Autocomplete::with_fetcher(config, StubFetcher::new()),
            Err(Error::InvalidUrl { .. })
        );
    }

    #[test]
    fn test_autocomplete_normalizes_through_its_client() {
        let autocomplete =
            Autocomplete::with_fetcher(test_config(), StubFetcher::new()).expect("valid config");
        let address = tokio_test::block_on(
            autocomplete
                .normalizer()
                .normalize(&record("postcode", "69005, Lyon, France")),
        );

        assert_eq!(address.address(), "Lyon, 69005, France");
        assert_eq!(autocomplete.client().stats().total_requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_into_session_keeps_client() {
        let autocomplete =
            Autocomplete::with_fetcher(test_config(), StubFetcher::new()).expect("valid config");
        let mut session = autocomplete.into_session(SearchOptions::new().limit(2));

        session.on_input("lille");
        session.flush().await;

        let calls = session.client().fetcher().calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("https://geo.test/places/lille.json?"));
        assert!(calls[0].contains("limit=2"));
    }
}
