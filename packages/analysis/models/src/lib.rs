#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analysis result types.
//!
//! Everything an analysis run hands back to its caller: price-tier
//! clusters, ranked neighborhood scores, cleaning counts, supporting price
//! statistics, and the per-listing landmark distance table used by map
//! layers. All types serialize to camelCase JSON.

use std::collections::BTreeMap;

use hotspot_geography_models::{GeoPoint, PlanarPoint};
use hotspot_listing_models::{LandmarkDistance, RoomType};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A density cluster of listings within one price tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Tier name the cluster belongs to.
    pub tier: String,
    /// Cluster id, unique within the tier, in discovery order from 0.
    pub cluster_id: u32,
    /// Member listing ids in cleaned order.
    pub member_ids: Vec<String>,
    /// Number of members.
    pub listing_count: usize,
    /// Mean nightly price of members.
    pub average_price: f64,
    /// Sum of member nightly prices.
    pub total_value: f64,
    /// Cheapest member price.
    pub min_price: f64,
    /// Most expensive member price.
    pub max_price: f64,
    /// Mean projected position of members.
    pub centroid: PlanarPoint,
    /// The centroid converted back to latitude/longitude.
    pub centroid_location: GeoPoint,
}

/// Per-tier clustering outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSummary {
    /// Tier name.
    pub tier: String,
    /// Inclusive lower price bound.
    pub min_price: f64,
    /// Upper price bound.
    pub max_price: f64,
    /// Whether `max_price` belongs to the tier.
    pub upper_inclusive: bool,
    /// Clustering radius in projected meters.
    pub eps_meters: f64,
    /// Minimum neighborhood size for a core point.
    pub min_points: usize,
    /// Listings whose price falls in the tier.
    pub listing_count: usize,
    /// Listings assigned to some cluster.
    pub clustered_count: usize,
    /// Listings in the tier left as noise.
    pub noise_count: usize,
    /// Number of clusters found.
    pub cluster_count: usize,
    /// Clusters sorted by descending size, then descending average
    /// price, then ascending id.
    pub clusters: Vec<Cluster>,
}

/// Investment score for one neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodScore {
    /// Neighborhood name.
    pub neighborhood: String,
    /// Number of cleaned listings in the neighborhood.
    pub listing_count: usize,
    /// Mean nightly price (uncapped).
    pub average_price: f64,
    /// Mean distance to the nearest landmark, absent without landmarks.
    pub average_nearest_landmark_meters: Option<f64>,
    /// Mean review count.
    pub average_review_count: f64,
    /// Mean occupancy proxy, absent when no listing reports availability.
    pub average_occupancy: Option<f64>,
    /// Price sub-score, 0–100.
    pub price_score: f64,
    /// Location sub-score, 0–100.
    pub location_score: f64,
    /// Demand sub-score, 0–100.
    pub demand_score: f64,
    /// Weighted combination of the three sub-scores.
    pub investment_score: f64,
    /// 1-based rank, best first.
    pub rank: usize,
}

/// Counts of records the cleaner kept and dropped, by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningReport {
    /// Records handed to the cleaner.
    pub input_count: usize,
    /// Records that survived.
    pub kept_count: usize,
    /// Dropped for a missing identifier.
    pub missing_id: usize,
    /// Dropped for a missing, non-finite, or non-positive price.
    pub invalid_price: usize,
    /// Dropped for exceeding the configured price ceiling.
    pub above_max_price: usize,
    /// Dropped for missing or non-finite coordinates.
    pub missing_coordinates: usize,
    /// Dropped for falling outside the city bounding box.
    pub out_of_bounds: usize,
    /// Dropped as a repeat of an earlier identifier.
    pub duplicate_id: usize,
}

impl CleaningReport {
    /// Total records dropped for any reason.
    #[must_use]
    pub const fn dropped_count(&self) -> usize {
        self.missing_id
            + self.invalid_price
            + self.above_max_price
            + self.missing_coordinates
            + self.out_of_bounds
            + self.duplicate_id
    }
}

/// Summary statistics over a set of prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStats {
    /// Number of prices.
    pub count: usize,
    /// Lowest price.
    pub min: f64,
    /// Highest price.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (mean of the two middle values for even counts).
    pub median: f64,
}

/// Price statistics for one neighborhood group (borough).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPriceStats {
    /// Group name.
    pub group: String,
    /// Prices of listings in the group.
    pub prices: PriceStats,
}

/// Nearest-landmark distance bands. Upper bounds are inclusive.
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
pub enum DistanceBand {
    /// Up to 2 km.
    #[serde(rename = "<2km")]
    #[strum(serialize = "<2km")]
    Under2Km,
    /// Over 2 km, up to 5 km.
    #[serde(rename = "2-5km")]
    #[strum(serialize = "2-5km")]
    From2To5Km,
    /// Over 5 km, up to 10 km.
    #[serde(rename = "5-10km")]
    #[strum(serialize = "5-10km")]
    From5To10Km,
    /// Over 10 km.
    #[serde(rename = ">10km")]
    #[strum(serialize = ">10km")]
    Over10Km,
}

impl DistanceBand {
    /// All bands, nearest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Under2Km,
            Self::From2To5Km,
            Self::From5To10Km,
            Self::Over10Km,
        ]
    }

    /// The band a distance in meters falls into.
    #[must_use]
    pub fn for_meters(meters: f64) -> Self {
        if meters <= 2_000.0 {
            Self::Under2Km
        } else if meters <= 5_000.0 {
            Self::From2To5Km
        } else if meters <= 10_000.0 {
            Self::From5To10Km
        } else {
            Self::Over10Km
        }
    }
}

/// Price statistics for listings in one distance band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceBandStats {
    /// The band.
    pub band: DistanceBand,
    /// Prices of listings in the band.
    pub prices: PriceStats,
}

/// One row of the per-listing output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRow {
    /// Listing identifier.
    pub id: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Projected easting in meters.
    pub x: f64,
    /// Projected northing in meters.
    pub y: f64,
    /// Nightly price.
    pub price: f64,
    /// Room type.
    pub room_type: RoomType,
    /// Neighborhood name.
    pub neighborhood: String,
    /// Neighborhood group, if any.
    pub neighborhood_group: Option<String>,
    /// Tier the price falls in, if any.
    pub tier: Option<String>,
    /// Cluster id within the tier; absent for noise or untiered listings.
    pub cluster_id: Option<u32>,
    /// Distances to each landmark in configuration order.
    pub landmark_distances: Vec<LandmarkDistance>,
    /// Distance to the nearest landmark.
    pub nearest_landmark_meters: Option<f64>,
}

/// Complete, immutable result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// City code.
    pub city_code: String,
    /// City display name.
    pub city_name: String,
    /// Snapshot date label, passed through untouched.
    pub snapshot_date: Option<String>,
    /// Lower price bound of the first tier used for this run.
    pub premium_threshold: f64,
    /// Records supplied by the caller, before any `max_listings` cap.
    pub total_listings_received: usize,
    /// Records handed to the cleaner.
    pub total_listings_before_cleaning: usize,
    /// Records that survived cleaning.
    pub total_listings_after_cleaning: usize,
    /// Cleaning breakdown.
    pub cleaning: CleaningReport,
    /// Median price of cleaned listings.
    pub median_price: Option<f64>,
    /// Price statistics of cleaned listings.
    pub price_stats: Option<PriceStats>,
    /// Per-tier clustering results, in configuration order.
    pub tiers: Vec<TierSummary>,
    /// Ranked neighborhood scores.
    pub neighborhoods: Vec<NeighborhoodScore>,
    /// Price statistics by neighborhood group, sorted by group name.
    pub group_price_stats: Vec<GroupPriceStats>,
    /// Price statistics by nearest-landmark distance band.
    pub distance_bands: Vec<DistanceBandStats>,
    /// Per-listing table in cleaned order.
    pub listings: Vec<ListingRow>,
}

impl AnalysisSummary {
    /// Cluster count per tier name.
    #[must_use]
    pub fn tier_cluster_counts(&self) -> BTreeMap<String, usize> {
        self.tiers
            .iter()
            .map(|t| (t.tier.clone(), t.cluster_count))
            .collect()
    }

    /// Total clusters across all tiers.
    #[must_use]
    pub fn total_clusters(&self) -> usize {
        self.tiers.iter().map(|t| t.cluster_count).sum()
    }

    /// Looks up a tier's results by name.
    #[must_use]
    pub fn tier(&self, name: &str) -> Option<&TierSummary> {
        self.tiers.iter().find(|t| t.tier == name)
    }

    /// The best-ranked neighborhood.
    #[must_use]
    pub fn top_neighborhood(&self) -> Option<&NeighborhoodScore> {
        self.neighborhoods.first()
    }
}
