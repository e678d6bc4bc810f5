#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City configuration types.
//!
//! A [`CityConfig`] is an immutable value describing one city: its
//! plausible bounding box, the landmarks used for proximity scoring, the
//! ordered price tiers with their clustering parameters, and the scoring
//! options. Configurations are deserialized from TOML and must pass
//! [`CityConfig::validate`] before an analysis run starts.

use std::collections::BTreeSet;

use hotspot_geography_models::{BoundingBox, GeoPoint};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Default source coordinate reference for listing coordinates.
pub const DEFAULT_COORDINATE_REFERENCE: &str = "EPSG:4326";

/// Errors describing an unusable city configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CityConfigError {
    /// The city code is blank.
    #[error("City code must not be empty")]
    MissingCode,

    /// The bounding box is inverted, non-finite, or out of range.
    #[error("Invalid bounding box for city {city}")]
    InvalidBounds {
        /// City code.
        city: String,
    },

    /// A landmark has a blank name or unusable coordinates.
    #[error("Invalid landmark '{name}': {message}")]
    InvalidLandmark {
        /// Landmark name as configured.
        name: String,
        /// Description of what is wrong.
        message: String,
    },

    /// Two landmarks share a name.
    #[error("Duplicate landmark '{name}'")]
    DuplicateLandmark {
        /// The repeated name.
        name: String,
    },

    /// No price tiers were configured.
    #[error("City {city} defines no price tiers")]
    NoTiers {
        /// City code.
        city: String,
    },

    /// A tier has unusable bounds or clustering parameters.
    #[error("Malformed tier '{name}': {message}")]
    MalformedTier {
        /// Tier name as configured.
        name: String,
        /// Description of what is wrong.
        message: String,
    },

    /// Two tiers share a name.
    #[error("Duplicate tier '{name}'")]
    DuplicateTier {
        /// The repeated name.
        name: String,
    },

    /// Adjacent tiers overlap or are not in ascending price order.
    #[error("Tiers '{lower}' and '{upper}' overlap or are out of order")]
    OverlappingTiers {
        /// The earlier tier in configuration order.
        lower: String,
        /// The later tier in configuration order.
        upper: String,
    },

    /// Cleaning options are unusable.
    #[error("Invalid cleaning options: {message}")]
    InvalidCleaning {
        /// Description of what is wrong.
        message: String,
    },

    /// Scoring options are unusable.
    #[error("Invalid scoring options: {message}")]
    InvalidScoring {
        /// Description of what is wrong.
        message: String,
    },

    /// A caller-supplied premium threshold cannot be applied.
    #[error("Invalid premium threshold {value}: {message}")]
    InvalidPremiumThreshold {
        /// The rejected threshold.
        value: f64,
        /// Description of what is wrong.
        message: String,
    },
}

/// A named point of interest used for proximity scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Display name (unique within a city).
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Landmark {
    /// The landmark's geographic location.
    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// A nightly-price band with its own density-clustering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDefinition {
    /// Tier name (e.g. "premium").
    pub name: String,
    /// Inclusive lower price bound.
    pub min_price: f64,
    /// Upper price bound.
    pub max_price: f64,
    /// Whether `max_price` itself belongs to this tier.
    #[serde(default)]
    pub upper_inclusive: bool,
    /// Neighborhood radius in projected meters.
    pub eps_meters: f64,
    /// Minimum listings (including the point itself) within
    /// `eps_meters` for a core point.
    pub min_points: usize,
}

impl TierDefinition {
    /// Whether `price` falls inside this tier's range.
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        if price < self.min_price {
            return false;
        }
        if self.upper_inclusive {
            price <= self.max_price
        } else {
            price < self.max_price
        }
    }

    fn validate(&self) -> Result<(), CityConfigError> {
        let malformed = |message: &str| CityConfigError::MalformedTier {
            name: self.name.clone(),
            message: message.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(malformed("name must not be empty"));
        }
        if !self.min_price.is_finite() || self.min_price < 0.0 {
            return Err(malformed("min_price must be a finite, non-negative number"));
        }
        if !self.max_price.is_finite() || self.max_price <= self.min_price {
            return Err(malformed("max_price must be finite and above min_price"));
        }
        if !self.eps_meters.is_finite() || self.eps_meters <= 0.0 {
            return Err(malformed("eps_meters must be positive"));
        }
        if self.min_points == 0 {
            return Err(malformed("min_points must be at least 1"));
        }
        Ok(())
    }
}

/// Record-level filtering options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningOptions {
    /// Listings priced above this are treated as outliers and dropped.
    #[serde(default)]
    pub max_price: Option<f64>,
}

/// How raw neighborhood signals are mapped onto the 0–100 scale.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NormalizationStrategy {
    /// `(v - min) / (max - min) * 100`.
    #[default]
    MinMax,
    /// `v / max * 100`.
    MaxRatio,
    /// Min-max over `ln(1 + v)`.
    Log,
}

/// Relative weights of the three sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the price sub-score.
    pub price: f64,
    /// Weight of the location sub-score.
    pub location: f64,
    /// Weight of the demand sub-score.
    pub demand: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            price: 0.4,
            location: 0.3,
            demand: 0.3,
        }
    }
}

/// Neighborhood scoring options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    /// Sub-score weights.
    pub weights: ScoreWeights,
    /// Normalization applied to every raw signal.
    pub normalization: NormalizationStrategy,
    /// Quantile of city-wide prices at which neighborhood average prices
    /// are capped before normalization.
    pub price_cap_quantile: f64,
    /// Landmark distance under which a listing gets full proximity credit.
    pub proximity_radius_meters: f64,
    /// Share of the demand signal taken from review counts; the rest
    /// comes from occupancy.
    pub review_weight: f64,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            normalization: NormalizationStrategy::default(),
            price_cap_quantile: 0.95,
            proximity_radius_meters: 2_000.0,
            review_weight: 0.7,
        }
    }
}

impl ScoringOptions {
    fn validate(&self) -> Result<(), CityConfigError> {
        let invalid = |message: &str| CityConfigError::InvalidScoring {
            message: message.to_string(),
        };

        let ScoreWeights {
            price,
            location,
            demand,
        } = self.weights;
        if [price, location, demand]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(invalid("weights must be finite and non-negative"));
        }
        if (price + location + demand - 1.0).abs() > 1e-6 {
            return Err(invalid("weights must sum to 1"));
        }
        if !(0.0..=1.0).contains(&self.price_cap_quantile) {
            return Err(invalid("price_cap_quantile must be within 0..=1"));
        }
        if !self.proximity_radius_meters.is_finite() || self.proximity_radius_meters <= 0.0 {
            return Err(invalid("proximity_radius_meters must be positive"));
        }
        if !(0.0..=1.0).contains(&self.review_weight) {
            return Err(invalid("review_weight must be within 0..=1"));
        }
        Ok(())
    }
}

fn default_coordinate_reference() -> String {
    DEFAULT_COORDINATE_REFERENCE.to_string()
}

/// Everything the analysis core needs to know about one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityConfig {
    /// Short city code (e.g. "nyc").
    pub code: String,
    /// Display name (e.g. "New York City").
    pub name: String,
    /// Coordinate reference of listing and landmark coordinates.
    #[serde(default = "default_coordinate_reference")]
    pub coordinate_reference: String,
    /// Plausible area for listing coordinates.
    pub bounds: BoundingBox,
    /// Landmarks in reporting order.
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    /// Price tiers in ascending price order.
    pub tiers: Vec<TierDefinition>,
    /// Record filtering options.
    #[serde(default)]
    pub cleaning: CleaningOptions,
    /// Neighborhood scoring options.
    #[serde(default)]
    pub scoring: ScoringOptions,
}

impl CityConfig {
    /// Checks every invariant the analysis relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`CityConfigError`] found.
    pub fn validate(&self) -> Result<(), CityConfigError> {
        if self.code.trim().is_empty() {
            return Err(CityConfigError::MissingCode);
        }
        if !self.bounds.is_valid() {
            return Err(CityConfigError::InvalidBounds {
                city: self.code.clone(),
            });
        }

        let mut landmark_names = BTreeSet::new();
        for landmark in &self.landmarks {
            if landmark.name.trim().is_empty() {
                return Err(CityConfigError::InvalidLandmark {
                    name: landmark.name.clone(),
                    message: "name must not be empty".to_string(),
                });
            }
            if !landmark.location().is_valid() {
                return Err(CityConfigError::InvalidLandmark {
                    name: landmark.name.clone(),
                    message: format!(
                        "coordinates ({}, {}) are not a valid latitude/longitude",
                        landmark.latitude, landmark.longitude
                    ),
                });
            }
            if !landmark_names.insert(landmark.name.as_str()) {
                return Err(CityConfigError::DuplicateLandmark {
                    name: landmark.name.clone(),
                });
            }
        }

        self.validate_tiers()?;

        if let Some(max_price) = self.cleaning.max_price
            && (!max_price.is_finite() || max_price <= 0.0)
        {
            return Err(CityConfigError::InvalidCleaning {
                message: format!("max_price {max_price} must be positive"),
            });
        }

        self.scoring.validate()
    }

    fn validate_tiers(&self) -> Result<(), CityConfigError> {
        if self.tiers.is_empty() {
            return Err(CityConfigError::NoTiers {
                city: self.code.clone(),
            });
        }

        let mut tier_names = BTreeSet::new();
        for tier in &self.tiers {
            tier.validate()?;
            if !tier_names.insert(tier.name.as_str()) {
                return Err(CityConfigError::DuplicateTier {
                    name: tier.name.clone(),
                });
            }
        }

        for pair in self.tiers.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            let touches_inclusively = lower.upper_inclusive && lower.max_price >= upper.min_price;
            if lower.max_price > upper.min_price || touches_inclusively {
                return Err(CityConfigError::OverlappingTiers {
                    lower: lower.name.clone(),
                    upper: upper.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// The first (lowest) tier's lower bound.
    #[must_use]
    pub fn premium_threshold(&self) -> Option<f64> {
        self.tiers.first().map(|t| t.min_price)
    }

    /// Returns a copy with the first tier's lower bound replaced by
    /// `threshold`, validated.
    ///
    /// # Errors
    ///
    /// Returns [`CityConfigError::InvalidPremiumThreshold`] if the
    /// threshold is not positive and finite or does not sit below the
    /// first tier's upper bound, or any other validation error.
    pub fn with_premium_threshold(&self, threshold: f64) -> Result<Self, CityConfigError> {
        let invalid = |message: &str| CityConfigError::InvalidPremiumThreshold {
            value: threshold,
            message: message.to_string(),
        };

        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(invalid("threshold must be positive"));
        }

        let mut config = self.clone();
        let Some(first) = config.tiers.first_mut() else {
            return Err(CityConfigError::NoTiers {
                city: self.code.clone(),
            });
        };
        if threshold >= first.max_price {
            return Err(invalid(&format!(
                "threshold must be below the '{}' tier upper bound {}",
                first.name, first.max_price
            )));
        }
        first.min_price = threshold;

        config.validate()?;
        Ok(config)
    }

    /// Finds the tier whose range contains `price`.
    #[must_use]
    pub fn tier_for_price(&self, price: f64) -> Option<&TierDefinition> {
        self.tiers.iter().find(|t| t.contains(price))
    }
}
