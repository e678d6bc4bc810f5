#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rental listing hotspot analysis.
//!
//! Turns raw short-term-rental listings for one city into price-tier
//! density clusters and ranked neighborhood investment scores:
//!
//! 1. [`clean`] drops unusable records and counts why.
//! 2. [`proximity`] projects listings to Web Mercator meters and measures
//!    landmark distances.
//! 3. [`tiering`] partitions listings into price tiers and runs DBSCAN
//!    per tier.
//! 4. [`aggregate`] summarizes each cluster.
//! 5. [`scoring`] scores and ranks neighborhoods.
//! 6. [`stats`] adds supporting price statistics.
//!
//! [`pipeline::analyze`] runs all of it and returns an
//! [`AnalysisSummary`](hotspot_analysis_models::AnalysisSummary).

pub mod aggregate;
pub mod clean;
pub mod pipeline;
pub mod progress;
pub mod proximity;
pub mod scoring;
pub mod stats;
pub mod tiering;

#[cfg(test)]
mod test_support;

use hotspot_city_models::CityConfigError;
use hotspot_spatial::ProjectionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use pipeline::analyze;

/// Errors that abort an analysis run before any stage executes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The city configuration or an override is invalid.
    #[error("Invalid city configuration: {0}")]
    Config(#[from] CityConfigError),
    /// No projection exists for the configured coordinate reference.
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),
}

impl AnalysisError {
    /// Whether the error stems from configuration rather than data.
    ///
    /// Bad data never raises; it is dropped and counted by the cleaner,
    /// so today every variant is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Projection(_))
    }
}

/// Per-run options supplied alongside the city configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Opaque snapshot label copied into the summary.
    pub snapshot_date: Option<String>,
    /// Replaces the first tier's lower price bound for this run.
    pub premium_threshold: Option<f64>,
    /// Only the first `max_listings` raw records are analyzed.
    pub max_listings: Option<usize>,
}
