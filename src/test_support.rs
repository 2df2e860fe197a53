//! Recording transport used by the unit tests.

use std::cell::RefCell;

use serde_json::{Value, json};

use crate::AutocompleteConfig;
use crate::client::{Fetch, GeocodeClient};
use crate::error::{Error, Result};
use crate::types::RawPlaceRecord;

/// Answers each URL with the body of the first route whose pattern it
/// contains, or `{}` when none match. Every requested URL is recorded.
#[derive(Debug, Default)]
pub(crate) struct StubFetcher {
    routes: Vec<(String, Value)>,
    calls: RefCell<Vec<String>>,
    fail: bool,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn route(mut self, pattern: &str, body: Value) -> Self {
        self.routes.push((pattern.to_string(), body));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }
}

impl Fetch for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Value> {
        self.calls.borrow_mut().push(url.to_string());
        if self.fail {
            return Err(Error::transport("connection refused"));
        }
        Ok(self
            .routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map_or_else(|| json!({}), |(_, body)| body.clone()))
    }
}

pub(crate) fn test_config() -> AutocompleteConfig {
    AutocompleteConfig::builder()
        .access_token("pk.test")
        .base_url("https://geo.test/places/")
        .build()
}

pub(crate) fn test_client(fetcher: StubFetcher) -> GeocodeClient<StubFetcher> {
    GeocodeClient::new(fetcher, &test_config())
}

pub(crate) fn record(place_type: &str, place_name: &str) -> RawPlaceRecord {
    RawPlaceRecord {
        place_type: vec![place_type.to_string()],
        place_name: place_name.to_string(),
        center: [2.3522, 48.8566],
        ..RawPlaceRecord::default()
    }
}

/// Reverse-lookup body answering a postcode query.
pub(crate) fn postcode_body(code: &str) -> Value {
    json!({ "features": [
        { "place_type": ["postcode"], "text": code, "place_name": format!("{code}, Paris, France") }
    ]})
}
