#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Listing types for each stage of the analysis pipeline.
//!
//! A snapshot arrives as [`RawListing`] rows with every field optional.
//! The cleaner turns the survivors into [`CleanedListing`] values, and the
//! projection/proximity stage wraps those into immutable [`Listing`]
//! values carrying planar coordinates and landmark distances.

use hotspot_geography_models::{GeoPoint, PlanarPoint};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Neighborhood label given to listings that arrive without one.
pub const UNKNOWN_NEIGHBORHOOD: &str = "Unknown";

/// One row of a listings snapshot, before any validation.
///
/// Column names follow the Inside Airbnb `listings.csv` export, with
/// American spellings accepted as aliases. Unknown columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    /// Listing identifier. Numeric IDs are stringified.
    #[serde(default, deserialize_with = "deserialize_identifier")]
    pub id: Option<String>,
    /// Latitude in degrees.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Nightly price. Accepts plain numbers or `"$1,234.00"` strings.
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: Option<f64>,
    /// Room type label (e.g. "Entire home/apt").
    #[serde(default)]
    pub room_type: Option<String>,
    /// Neighborhood name.
    #[serde(default, rename = "neighbourhood", alias = "neighborhood")]
    pub neighborhood: Option<String>,
    /// Neighborhood group (borough, arrondissement, ...).
    #[serde(
        default,
        rename = "neighbourhood_group",
        alias = "neighborhood_group"
    )]
    pub neighborhood_group: Option<String>,
    /// Total number of reviews.
    #[serde(default, rename = "number_of_reviews", alias = "review_count")]
    pub review_count: Option<u32>,
    /// Days available in the next 365.
    #[serde(default, rename = "availability_365", alias = "availability")]
    pub availability: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdentifierField {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceField {
    Number(f64),
    Text(String),
}

fn deserialize_identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<IdentifierField>::deserialize(deserializer)?;
    Ok(field.and_then(|field| {
        let id = match field {
            IdentifierField::Unsigned(n) => n.to_string(),
            IdentifierField::Signed(n) => n.to_string(),
            IdentifierField::Text(s) => s.trim().to_string(),
        };
        if id.is_empty() { None } else { Some(id) }
    }))
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<PriceField>::deserialize(deserializer)?;
    Ok(field.and_then(|field| match field {
        PriceField::Number(n) => Some(n),
        PriceField::Text(s) => parse_price(&s),
    }))
}

/// Parses a price string such as `"$1,234.00"` or `"250"`.
///
/// Currency symbols, thousands separators, and surrounding whitespace are
/// ignored. Returns `None` for empty or unparseable input.
#[must_use]
pub fn parse_price(s: &str) -> Option<f64> {
    let digits: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}

/// Listing room type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum RoomType {
    /// The whole place.
    #[serde(rename = "Entire home/apt")]
    #[strum(serialize = "Entire home/apt")]
    EntireHome,
    /// A private room in a shared place.
    #[serde(rename = "Private room")]
    #[strum(serialize = "Private room")]
    PrivateRoom,
    /// A shared room.
    #[serde(rename = "Shared room")]
    #[strum(serialize = "Shared room")]
    SharedRoom,
    /// A hotel room.
    #[serde(rename = "Hotel room")]
    #[strum(serialize = "Hotel room")]
    HotelRoom,
    /// Anything else, including a missing label.
    #[serde(rename = "Other")]
    #[strum(serialize = "Other")]
    Other,
}

impl RoomType {
    /// Maps a free-form label onto a room type, falling back to
    /// [`RoomType::Other`].
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        label
            .map(str::trim)
            .and_then(|l| l.parse().ok())
            .unwrap_or(Self::Other)
    }
}

/// A listing that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanedListing {
    /// Unique listing identifier.
    pub id: String,
    /// Geographic location.
    pub location: GeoPoint,
    /// Nightly price, positive and finite.
    pub price: f64,
    /// Room type.
    pub room_type: RoomType,
    /// Neighborhood name ([`UNKNOWN_NEIGHBORHOOD`] when missing).
    pub neighborhood: String,
    /// Neighborhood group, if the snapshot provides one.
    pub neighborhood_group: Option<String>,
    /// Number of reviews (0 when missing).
    pub review_count: u32,
    /// Days available in the next 365, clamped to `0..=365`.
    pub availability: Option<u32>,
}

impl CleanedListing {
    /// Occupancy proxy in `0.0..=1.0` derived from availability.
    ///
    /// A listing available all year has occupancy 0.
    #[must_use]
    pub fn occupancy(&self) -> Option<f64> {
        self.availability
            .map(|days| 1.0 - f64::from(days.min(365)) / 365.0)
    }
}

/// Distance from a listing to one configured landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkDistance {
    /// Landmark name.
    pub landmark: String,
    /// Planar distance in meters.
    pub meters: f64,
}

/// A cleaned listing with planar coordinates and landmark distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// The validated source record.
    pub record: CleanedListing,
    /// Web Mercator position in meters.
    pub position: PlanarPoint,
    /// Distances to every landmark, in configuration order.
    pub landmark_distances: Vec<LandmarkDistance>,
    /// Distance to the closest landmark, absent when the city has none.
    pub nearest_landmark_meters: Option<f64>,
}

impl Listing {
    /// Listing identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Nightly price.
    #[must_use]
    pub const fn price(&self) -> f64 {
        self.record.price
    }

    /// Distance to the named landmark, if it was measured.
    #[must_use]
    pub fn distance_to(&self, landmark: &str) -> Option<f64> {
        self.landmark_distances
            .iter()
            .find(|d| d.landmark == landmark)
            .map(|d| d.meters)
    }
}
