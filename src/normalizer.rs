//! Address normalization functionality.
//!
//! Turns a [`RawPlaceRecord`] into a [`NormalizedAddress`]. The display name
//! is split on `", "` and read according to the record's category. Places
//! and localities carry no postcode in their display name, so one reverse
//! lookup at the record's center fills it in.
//!
//! Normalization never fails. Anything unexpected is recorded as a
//! [`NormalizationWarning`] on the result and logged.

use std::sync::LazyLock;

use futures::future::join_all;
use regex::Regex;
use serde::Serialize;

use crate::client::{Fetch, GeocodeClient};
use crate::options::SearchOptions;
use crate::types::{Category, RawPlaceRecord};

/// Separator between display-name segments.
const SEGMENT_SEPARATOR: &str = ", ";

/// Optional leading number, optional single space, then the rest.
static NUMBER_AND_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)?\s?(.+)$").expect("valid number-and-words pattern"));

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit pattern"));

/// Soft problems found while normalizing a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizationWarning {
    /// None of the record's tags is a recognized category
    #[error("unrecognized suggestion category {tags:?}")]
    UnrecognizedCategory {
        /// Tags carried by the record
        tags: Vec<String>,
    },

    /// The display name has fewer segments than the category expects
    #[error("{category} display name has {found} segments, expected {expected}")]
    MalformedRecord {
        /// Category the record was parsed as
        category: Category,
        /// Segments the category rule reads
        expected: usize,
        /// Segments actually present
        found: usize,
    },

    /// The postcode reverse lookup produced nothing usable
    #[error("postcode unavailable: {reason}")]
    PostcodeUnavailable {
        /// Why the lookup gave no postcode
        reason: String,
    },
}

/// Structured fields extracted from a record.
///
/// Every field is `None` unless extraction produced a non-empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressComponents {
    /// Street number, e.g. `10`
    pub road_number: Option<String>,
    /// Street name, e.g. `Rue de Paris`
    pub road_name: Option<String>,
    /// City
    pub city: Option<String>,
    /// Postal code
    pub postcode: Option<String>,
    /// Country name
    pub country: Option<String>,
    /// Upper-case ISO country code
    pub country_code: Option<String>,
    /// Sub-city locality
    pub locality: Option<String>,
}

impl AddressComponents {
    /// Single-line address: set fields joined by `", "` in the order road
    /// number, road name, city, locality, postcode, country.
    pub fn compose(&self) -> String {
        [
            &self.road_number,
            &self.road_name,
            &self.city,
            &self.locality,
            &self.postcode,
            &self.country,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
    }

    /// Check if no field was extracted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Uniform address produced from a committed suggestion.
///
/// The `address` line is computed once from the components at construction
/// and cannot be changed independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAddress {
    #[serde(flatten)]
    components: AddressComponents,
    address: String,
    category: Option<Category>,
    raw: RawPlaceRecord,
    warnings: Vec<NormalizationWarning>,
}

impl NormalizedAddress {
    /// Build a normalized address and compute its single-line form.
    pub fn new(
        components: AddressComponents,
        category: Option<Category>,
        raw: RawPlaceRecord,
        warnings: Vec<NormalizationWarning>,
    ) -> Self {
        Self {
            address: components.compose(),
            components,
            category,
            raw,
            warnings,
        }
    }

    /// Extracted fields.
    pub fn components(&self) -> &AddressComponents {
        &self.components
    }

    /// Single-line address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Category the record was parsed as, `None` when unrecognized.
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// The originating provider record.
    pub fn raw(&self) -> &RawPlaceRecord {
        &self.raw
    }

    /// Problems met while normalizing.
    pub fn warnings(&self) -> &[NormalizationWarning] {
        &self.warnings
    }

    /// Check if no field was extracted.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Fields read from the display name alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Extracted fields
    pub components: AddressComponents,
    /// Problems found in the display name
    pub warnings: Vec<NormalizationWarning>,
}

/// Split a leading house or postal number from the words after it.
///
/// `"10 Rue de Paris"` gives `(Some("10"), Some("Rue de Paris"))`; a string
/// without a leading number gives `(None, Some(whole))`.
pub fn split_number_and_words(text: &str) -> (Option<String>, Option<String>) {
    match NUMBER_AND_WORDS.captures(text) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().to_string()),
            caps.get(2).map(|m| m.as_str().to_string()),
        ),
        None => (None, None),
    }
}

/// First run of digits in `text`.
pub fn first_digit_run(text: &str) -> Option<String> {
    DIGIT_RUN.find(text).map(|m| m.as_str().to_string())
}

/// Upper-cased short code of the last `country.*` context entry.
pub fn country_code(record: &RawPlaceRecord) -> Option<String> {
    record
        .context
        .iter()
        .rfind(|entry| entry.id.starts_with("country."))
        .and_then(|entry| entry.short_code.as_deref())
        .filter(|code| !code.is_empty())
        .map(str::to_uppercase)
}

/// Whether the category's display name lacks the postcode.
pub fn needs_postcode_lookup(category: Category) -> bool {
    matches!(category, Category::Place | Category::Locality)
}

struct Segments<'s> {
    parts: Vec<&'s str>,
}

impl<'s> Segments<'s> {
    fn new(display_name: &'s str) -> Self {
        Self {
            parts: display_name.split(SEGMENT_SEPARATOR).collect(),
        }
    }

    fn len(&self) -> usize {
        self.parts.len()
    }

    fn raw(&self, index: usize) -> Option<&'s str> {
        self.parts.get(index).copied().filter(|s| !s.is_empty())
    }

    fn get(&self, index: usize) -> Option<String> {
        self.raw(index).map(str::to_string)
    }

    fn last(&self) -> Option<String> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }
}

/// Read the display name of `record` according to `category`.
///
/// The postcode of places and localities is left empty; see
/// [`needs_postcode_lookup`].
pub fn extract(category: Category, record: &RawPlaceRecord) -> Extraction {
    let segments = Segments::new(&record.place_name);
    let mut components = AddressComponents::default();

    let expected = match category {
        Category::Place => {
            components.city = segments.get(0);
            components.country = segments.last();
            1
        }
        Category::Postcode => {
            components.postcode = segments.get(0);
            components.city = segments.get(1);
            components.country = segments.get(2);
            3
        }
        Category::Address => {
            let road = segments.raw(0).unwrap_or_default();
            (components.road_number, components.road_name) = split_number_and_words(road);
            let full_city = segments.raw(1).unwrap_or_default();
            (components.postcode, components.city) = split_number_and_words(full_city);
            components.country = segments.get(2);
            components.country_code = country_code(record);
            3
        }
        Category::Poi => {
            // Five-segment names lead with the venue name.
            let offset = usize::from(segments.len() != 4);
            let road = segments.raw(offset).unwrap_or_default();
            (components.road_number, components.road_name) = split_number_and_words(road);
            components.city = segments.get(offset + 1);
            components.postcode = segments.raw(offset + 2).and_then(first_digit_run);
            components.country = segments.get(offset + 3);
            4
        }
        Category::Locality => {
            components.locality = segments.get(0);
            components.city = segments.get(1);
            components.country = segments.get(2);
            3
        }
    };

    let mut warnings = Vec::new();
    if segments.len() < expected || record.place_name.is_empty() {
        warnings.push(NormalizationWarning::MalformedRecord {
            category,
            expected,
            found: if record.place_name.is_empty() {
                0
            } else {
                segments.len()
            },
        });
    }

    Extraction {
        components,
        warnings,
    }
}

/// Normalizes provider records, issuing postcode lookups through a
/// [`GeocodeClient`] when the display name lacks one.
#[derive(Debug)]
pub struct AddressNormalizer<'a, F> {
    client: &'a GeocodeClient<F>,
}

impl<'a, F: Fetch> AddressNormalizer<'a, F> {
    /// Create a normalizer that looks postcodes up through `client`.
    pub fn new(client: &'a GeocodeClient<F>) -> Self {
        Self { client }
    }

    /// Normalize a provider record.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use geocomplete::{Autocomplete, AutocompleteConfig, RawPlaceRecord};
    ///
    /// # async fn demo(record: RawPlaceRecord) -> geocomplete::Result<()> {
    /// let autocomplete = Autocomplete::new(AutocompleteConfig::from_env()?)?;
    /// let normalized = autocomplete.normalizer().normalize(&record).await;
    /// println!("{}", normalized.address());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn normalize(&self, record: &RawPlaceRecord) -> NormalizedAddress {
        let Some(category) = record.category() else {
            let warning = NormalizationWarning::UnrecognizedCategory {
                tags: record.place_type.clone(),
            };
            tracing::warn!(%warning, place_name = %record.place_name, "cannot normalize suggestion");
            return NormalizedAddress::new(
                AddressComponents::default(),
                None,
                record.clone(),
                vec![warning],
            );
        };

        let Extraction {
            mut components,
            mut warnings,
        } = extract(category, record);

        if needs_postcode_lookup(category) {
            match self.lookup_postcode(record).await {
                Ok(postcode) => components.postcode = Some(postcode),
                Err(warning) => warnings.push(warning),
            }
        }

        for warning in &warnings {
            tracing::warn!(%warning, place_name = %record.place_name, "partial normalization");
        }

        NormalizedAddress::new(components, Some(category), record.clone(), warnings)
    }

    /// Normalize several records concurrently on the current task.
    ///
    /// Results come back in input order.
    pub async fn normalize_batch(&self, records: &[RawPlaceRecord]) -> Vec<NormalizedAddress> {
        join_all(records.iter().map(|record| self.normalize(record))).await
    }

    async fn lookup_postcode(
        &self,
        record: &RawPlaceRecord,
    ) -> Result<String, NormalizationWarning> {
        let overrides = SearchOptions::new().types(&[Category::Postcode]);
        let results = self
            .client
            .reverse_search(record.coordinate(), &overrides)
            .await
            .map_err(|e| NormalizationWarning::PostcodeUnavailable {
                reason: e.to_string(),
            })?;

        results
            .first()
            .and_then(|first| first.text.as_deref())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| NormalizationWarning::PostcodeUnavailable {
                reason: "reverse lookup returned no postcode".to_string(),
            })
    }
}
