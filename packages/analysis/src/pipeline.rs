//! End-to-end analysis run.
//!
//! Validates configuration up front, then runs every stage in order:
//! clean, project, cluster, aggregate, score, and summarize. Configuration
//! errors abort before any stage starts; bad data never does.

use std::sync::Arc;

use hotspot_analysis_models::{AnalysisSummary, ListingRow, TierSummary};
use hotspot_city_models::{CityConfig, CityConfigError};
use hotspot_listing_models::{Listing, RawListing};
use hotspot_spatial::WebMercator;

use crate::clean::{CleanOutcome, clean_listings};
use crate::progress::ProgressCallback;
use crate::tiering::TierAssignment;
use crate::{AnalysisError, AnalysisOptions, aggregate, proximity, scoring, stats, tiering};

/// Number of progress units reported by [`analyze`].
pub const STAGE_COUNT: u64 = 6;

/// Runs the full analysis of `raw` for the city described by `config`.
///
/// # Errors
///
/// * [`AnalysisError::Config`] if `config` is invalid or the premium
///   threshold override is rejected
/// * [`AnalysisError::Projection`] if the configured coordinate reference
///   is unsupported
pub fn analyze(
    raw: &[RawListing],
    config: &CityConfig,
    options: &AnalysisOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<AnalysisSummary, AnalysisError> {
    let config = effective_config(config, options)?;
    let projection = WebMercator::for_source(&config.coordinate_reference)?;
    let premium_threshold = config
        .premium_threshold()
        .ok_or_else(|| CityConfigError::NoTiers {
            city: config.code.clone(),
        })?;

    let input = match options.max_listings {
        Some(max) if max < raw.len() => {
            log::info!("Limiting input to the first {max} of {} listings", raw.len());
            &raw[..max]
        }
        _ => raw,
    };

    log::info!(
        "Analyzing {} listings for {} ({})",
        input.len(),
        config.name,
        config.code
    );
    progress.set_total(STAGE_COUNT);

    progress.set_message("Cleaning listings".to_string());
    let CleanOutcome {
        listings: cleaned,
        report: cleaning,
    } = clean_listings(input, &config.bounds, &config.cleaning);
    log::info!(
        "Cleaned: kept {} of {} listings",
        cleaning.kept_count,
        cleaning.input_count
    );
    progress.inc(1);

    progress.set_message("Projecting coordinates".to_string());
    let listings = proximity::locate_listings(cleaned, &config.landmarks, &projection);
    progress.inc(1);

    progress.set_message("Clustering price tiers".to_string());
    let assignments = tiering::cluster_tiers(&listings, &config.tiers);
    progress.inc(1);

    progress.set_message("Aggregating clusters".to_string());
    let tiers: Vec<TierSummary> = assignments
        .iter()
        .map(|a| aggregate::summarize_tier(&listings, a, &projection))
        .collect();
    for tier in &tiers {
        log::info!(
            "Tier '{}': {} clusters from {} listings ({} noise)",
            tier.tier,
            tier.cluster_count,
            tier.listing_count,
            tier.noise_count
        );
    }
    progress.inc(1);

    progress.set_message("Scoring neighborhoods".to_string());
    let neighborhoods = scoring::score_neighborhoods(&listings, &config.scoring);
    progress.inc(1);

    progress.set_message("Computing statistics".to_string());
    let prices: Vec<f64> = listings.iter().map(Listing::price).collect();
    let summary = AnalysisSummary {
        city_code: config.code.clone(),
        city_name: config.name.clone(),
        snapshot_date: options.snapshot_date.clone(),
        premium_threshold,
        total_listings_received: raw.len(),
        total_listings_before_cleaning: cleaning.input_count,
        total_listings_after_cleaning: cleaning.kept_count,
        median_price: stats::median(&prices),
        price_stats: stats::price_stats(&prices),
        group_price_stats: stats::group_price_stats(&listings),
        distance_bands: stats::distance_band_stats(&listings),
        listings: listing_rows(&listings, &config, &assignments),
        cleaning,
        tiers,
        neighborhoods,
    };
    progress.inc(1);

    progress.finish(format!(
        "Analyzed {} listings: {} clusters, {} neighborhoods",
        summary.total_listings_after_cleaning,
        summary.total_clusters(),
        summary.neighborhoods.len()
    ));

    Ok(summary)
}

fn effective_config(
    config: &CityConfig,
    options: &AnalysisOptions,
) -> Result<CityConfig, CityConfigError> {
    config.validate()?;
    match options.premium_threshold {
        Some(threshold) => {
            log::info!("Overriding premium threshold with ${threshold}");
            config.with_premium_threshold(threshold)
        }
        None => Ok(config.clone()),
    }
}

fn listing_rows(
    listings: &[Listing],
    config: &CityConfig,
    assignments: &[TierAssignment],
) -> Vec<ListingRow> {
    listings
        .iter()
        .enumerate()
        .map(|(i, listing)| {
            let tier = config.tier_for_price(listing.price());
            let cluster_id = tier.and_then(|t| {
                assignments
                    .iter()
                    .find(|a| a.tier.name == t.name)
                    .and_then(|a| a.label_of(i))
            });
            let record = &listing.record;

            ListingRow {
                id: record.id.clone(),
                latitude: record.location.latitude,
                longitude: record.location.longitude,
                x: listing.position.x,
                y: listing.position.y,
                price: record.price,
                room_type: record.room_type,
                neighborhood: record.neighborhood.clone(),
                neighborhood_group: record.neighborhood_group.clone(),
                tier: tier.map(|t| t.name.clone()),
                cluster_id,
                landmark_distances: listing.landmark_distances.clone(),
                nearest_landmark_meters: listing.nearest_landmark_meters,
            }
        })
        .collect()
}
