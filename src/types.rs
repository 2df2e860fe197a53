//! Common types for geocoding records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Place categories the normalizer knows how to parse.
///
/// The provider tags every record with one or more categories; only these
/// five carry a parsing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// City or town
    Place,
    /// Postal code area
    Postcode,
    /// Street address
    Address,
    /// Point of interest
    Poi,
    /// Sub-city locality
    Locality,
}

impl Category {
    /// All recognized categories, in the order they are sent to the provider.
    pub const ALL: [Category; 5] = [
        Category::Place,
        Category::Postcode,
        Category::Address,
        Category::Poi,
        Category::Locality,
    ];

    /// Provider tag for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Place => "place",
            Category::Postcode => "postcode",
            Category::Address => "address",
            Category::Poi => "poi",
            Category::Locality => "locality",
        }
    }

    /// Pick the primary category of a tag list.
    ///
    /// Tags are scanned in the record's own order and the first recognized
    /// one wins. Returns `None` when no tag is recognized.
    pub fn primary<S: AsRef<str>>(tags: &[S]) -> Option<Category> {
        tags.iter().find_map(|tag| tag.as_ref().parse().ok())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "place" => Ok(Category::Place),
            "postcode" => Ok(Category::Postcode),
            "address" => Ok(Category::Address),
            "poi" => Ok(Category::Poi),
            "locality" => Ok(Category::Locality),
            _ => Err(UnknownCategory(tag.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category tag that is not one of [`Category::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown place category `{}`", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Search area as `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western edge
    pub min_longitude: f64,
    /// Southern edge
    pub min_latitude: f64,
    /// Eastern edge
    pub max_longitude: f64,
    /// Northern edge
    pub max_latitude: f64,
}

impl BoundingBox {
    /// Metropolitan France, the default search area.
    pub const FRANCE: BoundingBox = BoundingBox::new(-5.47, 41.03, 11.23, 51.66);

    /// Create a bounding box from its four edges.
    pub const fn new(
        min_longitude: f64,
        min_latitude: f64,
        max_longitude: f64,
        max_latitude: f64,
    ) -> Self {
        Self {
            min_longitude,
            min_latitude,
            max_longitude,
            max_latitude,
        }
    }

    /// Edges in provider order.
    pub fn to_array(self) -> [f64; 4] {
        [
            self.min_longitude,
            self.min_latitude,
            self.max_longitude,
            self.max_latitude,
        ]
    }
}

/// Ancestor administrative region attached to a record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContextEntry {
    /// Provider identifier such as `country.8781`
    #[serde(default)]
    pub id: String,
    /// Short code such as `fr`, present on some regions
    #[serde(default)]
    pub short_code: Option<String>,
    /// Region name
    #[serde(default)]
    pub text: Option<String>,
}

/// Place record as returned by the geocoding provider.
///
/// Only the fields the normalizer reads are typed; everything else in the
/// provider payload is ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPlaceRecord {
    /// Provider feature identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Category tags, e.g. `["address"]`
    #[serde(default)]
    pub place_type: Vec<String>,
    /// Comma-delimited display name
    #[serde(default)]
    pub place_name: String,
    /// Primary label of the feature (a postcode record's label is the code)
    #[serde(default)]
    pub text: Option<String>,
    /// `[longitude, latitude]`
    #[serde(default)]
    pub center: [f64; 2],
    /// Ancestor regions, innermost first
    #[serde(default)]
    pub context: Vec<ContextEntry>,
}

impl RawPlaceRecord {
    /// Center of the record as a [`Coordinate`].
    pub fn coordinate(&self) -> Coordinate {
        let [longitude, latitude] = self.center;
        Coordinate::new(latitude, longitude)
    }

    /// Primary recognized category of the record, if any.
    pub fn category(&self) -> Option<Category> {
        Category::primary(&self.place_type)
    }
}
