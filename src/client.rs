//! Geocoding provider client.
//!
//! [`GeocodeClient`] builds forward and reverse search URLs, hands them to an
//! injected [`Fetch`] capability and turns the `features` array of the reply
//! into [`RawPlaceRecord`]s. It never retries; transport failures are
//! returned to the caller.

use std::future::Future;
use std::sync::LazyLock;
use std::time::Instant;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use serde_json::Value;

use crate::AutocompleteConfig;
use crate::error::{Error, Result};
use crate::options::SearchOptions;
use crate::stats::{RequestStats, StatsSnapshot};
use crate::types::{Coordinate, RawPlaceRecord};

/// Characters kept verbatim in the search-term path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

static ACCESS_TOKEN_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"access_token=[^&]*").expect("valid token pattern"));

/// Transport capability: GET a URL and return its JSON body.
///
/// Implementations report network failures, non-success statuses and
/// non-JSON bodies as [`Error`]s. The returned future does not need to be
/// `Send`; the widget runs on a single task.
pub trait Fetch {
    /// Fetch `url` and parse the body as JSON.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Value>>;
}

/// [`Fetch`] implementation backed by `reqwest`.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Create a fetcher with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be built.
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .user_agent(concat!("geocomplete/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http_status(status.as_u16(), redact_token(url)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(e.without_url().to_string()))?;

        serde_json::from_str(&body)
            .map_err(|e| Error::invalid_response(format!("body is not JSON: {e}")))
    }
}

/// Replace the access token in a URL so it can be logged.
pub fn redact_token(url: &str) -> String {
    ACCESS_TOKEN_PARAM
        .replace_all(url, "access_token=<redacted>")
        .into_owned()
}

/// Pull the `features` array out of a provider body.
///
/// A body without `features` (or with `null`) means zero results.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] when `features` is present but is not
/// a list of place records.
pub fn parse_features(body: Value) -> Result<Vec<RawPlaceRecord>> {
    let features = match body {
        Value::Object(mut map) => map.remove("features"),
        _ => None,
    };

    match features {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(features) => serde_json::from_value(features)
            .map_err(|e| Error::invalid_response(format!("malformed features array: {e}"))),
    }
}

/// Client for forward and reverse geocoding searches.
#[derive(Debug)]
pub struct GeocodeClient<F> {
    fetcher: F,
    base_url: String,
    search_defaults: SearchOptions,
    reverse_defaults: SearchOptions,
    stats: RequestStats,
}

impl<F: Fetch> GeocodeClient<F> {
    /// Create a client from an [`AutocompleteConfig`].
    pub fn new(fetcher: F, config: &AutocompleteConfig) -> Self {
        Self::with_defaults(
            fetcher,
            config.provider.trimmed_base_url(),
            config.search_defaults(),
            config.reverse_defaults(),
        )
    }

    /// Create a client with explicit default option sets.
    pub fn with_defaults(
        fetcher: F,
        base_url: &str,
        search_defaults: SearchOptions,
        reverse_defaults: SearchOptions,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            search_defaults,
            reverse_defaults,
            stats: RequestStats::new(),
        }
    }

    /// The injected transport.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Snapshot of the request counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// URL for a forward search: `{base}/{term}.json?{options}`.
    pub fn search_url(&self, term: &str, overrides: &SearchOptions) -> String {
        let options = self.search_defaults.merged(overrides);
        format!(
            "{}/{}.json?{}",
            self.base_url,
            utf8_percent_encode(term, PATH_SEGMENT),
            options.to_query_string()
        )
    }

    /// URL for a reverse search: `{base}/{longitude},{latitude}.json?{options}`.
    pub fn reverse_url(&self, coordinate: Coordinate, overrides: &SearchOptions) -> String {
        let options = self.reverse_defaults.merged(overrides);
        format!(
            "{}/{},{}.json?{}",
            self.base_url,
            coordinate.longitude,
            coordinate.latitude,
            options.to_query_string()
        )
    }

    /// Search for places matching free text.
    ///
    /// The minimum term length is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`Error`] unchanged, or
    /// [`Error::InvalidResponse`] when the features array is malformed.
    pub async fn search(
        &self,
        term: &str,
        overrides: &SearchOptions,
    ) -> Result<Vec<RawPlaceRecord>> {
        let url = self.search_url(term, overrides);
        let started = Instant::now();
        let result = self.fetch_features(&url).await;
        self.stats.record_forward(started.elapsed());
        result
    }

    /// Search for places at a coordinate.
    ///
    /// # Errors
    ///
    /// Same contract as [`GeocodeClient::search`].
    pub async fn reverse_search(
        &self,
        coordinate: Coordinate,
        overrides: &SearchOptions,
    ) -> Result<Vec<RawPlaceRecord>> {
        let url = self.reverse_url(coordinate, overrides);
        let started = Instant::now();
        let result = self.fetch_features(&url).await;
        self.stats.record_reverse(started.elapsed());
        result
    }

    async fn fetch_features(&self, url: &str) -> Result<Vec<RawPlaceRecord>> {
        tracing::debug!(url = %redact_token(url), "geocoding request");

        let records = self
            .fetcher
            .fetch(url)
            .await
            .and_then(parse_features)
            .inspect_err(|error| {
                self.stats.record_failure();
                tracing::debug!(%error, "geocoding request failed");
            })?;

        tracing::debug!(count = records.len(), "geocoding response");
        Ok(records)
    }
}
