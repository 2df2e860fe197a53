//! Search options and query-string serialization.
//!
//! A [`SearchOptions`] is an ordered mapping from option name to value. Keys
//! can also be explicitly unset, which removes them when one option set is
//! laid over another.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::types::{BoundingBox, Category};

/// Characters left as-is in query parameters, matching form encoding.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'*');

/// Default number of results requested from the provider.
pub const DEFAULT_LIMIT: u32 = 5;

/// A single option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Free text
    Text(String),
    /// Whole number
    Integer(i64),
    /// Decimal number
    Number(f64),
    /// List serialized as one comma-joined parameter
    List(Vec<OptionValue>),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Text(text) => f.write_str(text),
            OptionValue::Integer(value) => write!(f, "{value}"),
            OptionValue::Number(value) => write!(f, "{value}"),
            OptionValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Integer(i64::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<BoundingBox> for OptionValue {
    fn from(bbox: BoundingBox) -> Self {
        OptionValue::List(
            bbox.to_array()
                .into_iter()
                .map(OptionValue::Number)
                .collect(),
        )
    }
}

impl From<&[Category]> for OptionValue {
    fn from(categories: &[Category]) -> Self {
        OptionValue::List(
            categories
                .iter()
                .map(|c| OptionValue::Text(c.as_str().to_string()))
                .collect(),
        )
    }
}

/// Ordered option mapping for one provider request.
///
/// An entry whose value is `None` is an explicit unset: when laid over
/// another set with [`SearchOptions::merged`] it drops the key entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    entries: Vec<(String, Option<OptionValue>)>,
}

impl SearchOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any earlier value for the key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key.into(), Some(value.into()));
        self
    }

    /// Explicitly unset an option.
    pub fn without(mut self, key: impl Into<String>) -> Self {
        self.insert(key.into(), None);
        self
    }

    /// Set the access token.
    pub fn access_token(self, token: impl Into<String>) -> Self {
        self.with("access_token", Into::<String>::into(token))
    }

    /// Restrict results to the given categories.
    pub fn types(self, categories: &[Category]) -> Self {
        self.with("types", categories)
    }

    /// Limit the number of results.
    pub fn limit(self, limit: u32) -> Self {
        self.with("limit", limit)
    }

    /// Restrict results to a bounding box.
    pub fn bounding_box(self, bbox: BoundingBox) -> Self {
        self.with("bbox", bbox)
    }

    /// Restrict results to a country code.
    pub fn country(self, country: impl Into<String>) -> Self {
        self.with("country", Into::<String>::into(country))
    }

    /// Set the result language.
    pub fn language(self, language: impl Into<String>) -> Self {
        self.with("language", Into::<String>::into(language))
    }

    fn insert(&mut self, key: String, value: Option<OptionValue>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value for a key, `None` when absent or unset.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Whether no key carries a value.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.is_none())
    }

    /// Lay `overrides` over `self` and drop every unset key.
    ///
    /// Keys keep their first position; new keys from `overrides` are
    /// appended in their own order.
    pub fn merged(&self, overrides: &SearchOptions) -> SearchOptions {
        let mut merged = self.clone();
        for (key, value) in &overrides.entries {
            merged.insert(key.clone(), value.clone());
        }
        merged.entries.retain(|(_, v)| v.is_some());
        merged
    }

    /// Iterate over the set keys and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    /// Serialize into a URL query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, QUERY_VALUE),
                    utf8_percent_encode(&value.to_string(), QUERY_VALUE)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Defaults for forward searches.
    pub fn forward_defaults(
        access_token: Option<&str>,
        country: Option<&str>,
        language: Option<&str>,
        bbox: Option<BoundingBox>,
        limit: u32,
    ) -> SearchOptions {
        let mut options = SearchOptions::new();
        options.insert("access_token".into(), access_token.map(Into::into));
        options.insert("types".into(), Some(Category::ALL.as_slice().into()));
        options.insert("limit".into(), Some(limit.into()));
        options.insert("bbox".into(), bbox.map(Into::into));
        options.insert("country".into(), country.map(Into::into));
        options.insert("language".into(), language.map(Into::into));
        options
    }

    /// Defaults for reverse (coordinate) searches.
    pub fn reverse_defaults(
        access_token: Option<&str>,
        country: Option<&str>,
        limit: u32,
    ) -> SearchOptions {
        let mut options = SearchOptions::new();
        options.insert("access_token".into(), access_token.map(Into::into));
        options.insert("types".into(), Some(Category::ALL.as_slice().into()));
        options.insert("limit".into(), Some(limit.into()));
        options.insert("country".into(), country.map(Into::into));
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_defaults_query_string() {
        let options = SearchOptions::forward_defaults(
            Some("pk.test"),
            Some("fr"),
            Some("fr"),
            Some(BoundingBox::FRANCE),
            DEFAULT_LIMIT,
        );

        assert_eq!(
            options.to_query_string(),
            "access_token=pk.test\
             &types=place%2Cpostcode%2Caddress%2Cpoi%2Clocality\
             &limit=5\
             &bbox=-5.47%2C41.03%2C11.23%2C51.66\
             &country=fr\
             &language=fr"
        );
    }

    #[test]
    fn test_overrides_win_and_keep_position() {
        let defaults = SearchOptions::new().limit(5).country("fr");
        let overrides = SearchOptions::new().country("be").language("nl");

        let merged = defaults.merged(&overrides);
        assert_eq!(merged.to_query_string(), "limit=5&country=be&language=nl");
    }

    #[test]
    fn test_unset_override_drops_key() {
        let defaults = SearchOptions::new()
            .access_token("pk.test")
            .bounding_box(BoundingBox::FRANCE)
            .country("fr");
        let overrides = SearchOptions::new().without("bbox").without("proximity");

        let merged = defaults.merged(&overrides);
        let query = merged.to_query_string();
        assert!(!query.contains("bbox"));
        assert!(!query.contains("proximity"));
        assert_eq!(query, "access_token=pk.test&country=fr");
    }

    #[test]
    fn test_missing_defaults_never_serialize() {
        let options = SearchOptions::forward_defaults(None, None, None, None, 3);
        let merged = options.merged(&SearchOptions::new());
        assert_eq!(
            merged.to_query_string(),
            "types=place%2Cpostcode%2Caddress%2Cpoi%2Clocality&limit=3"
        );
        assert_eq!(merged.get("access_token"), None);
    }

    #[test]
    fn test_text_values_are_encoded() {
        let options = SearchOptions::new()
            .with("proximity", "ip")
            .with("q", "a b&c");
        assert_eq!(options.to_query_string(), "proximity=ip&q=a%20b%26c");
    }

    #[test]
    fn test_is_empty() {
        assert!(SearchOptions::new().is_empty());
        assert!(SearchOptions::new().without("bbox").is_empty());
        assert!(!SearchOptions::new().limit(1).is_empty());
    }
}
