//! Price statistics.
//!
//! Small order-statistics helpers plus the supporting breakdowns reported
//! next to the clusters: overall prices, prices by neighborhood group, and
//! prices by nearest-landmark distance band.

use std::collections::BTreeMap;

use hotspot_analysis_models::{DistanceBand, DistanceBandStats, GroupPriceStats, PriceStats};
use hotspot_listing_models::Listing;

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; the mean of the two middle values for even lengths.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// The `q` quantile (`0.0..=1.0`) using linear interpolation between
/// closest ranks.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - rank.floor();

    Some(fraction.mul_add(sorted[upper] - sorted[lower], sorted[lower]))
}

/// Count, min, max, mean, and median of `prices`.
#[must_use]
pub fn price_stats(prices: &[f64]) -> Option<PriceStats> {
    Some(PriceStats {
        count: prices.len(),
        min: prices.iter().copied().min_by(f64::total_cmp)?,
        max: prices.iter().copied().max_by(f64::total_cmp)?,
        mean: mean(prices)?,
        median: median(prices)?,
    })
}

/// Price statistics per neighborhood group, sorted by group name.
/// Listings without a group are skipped.
#[must_use]
pub fn group_price_stats(listings: &[Listing]) -> Vec<GroupPriceStats> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for listing in listings {
        if let Some(group) = listing.record.neighborhood_group.as_deref() {
            groups.entry(group).or_default().push(listing.price());
        }
    }

    groups
        .into_iter()
        .filter_map(|(group, prices)| {
            Some(GroupPriceStats {
                group: group.to_string(),
                prices: price_stats(&prices)?,
            })
        })
        .collect()
}

/// Price statistics per nearest-landmark distance band, nearest band
/// first. Bands without listings are omitted, so the result is empty when
/// the city has no landmarks.
#[must_use]
pub fn distance_band_stats(listings: &[Listing]) -> Vec<DistanceBandStats> {
    let mut bands: BTreeMap<DistanceBand, Vec<f64>> = BTreeMap::new();
    for listing in listings {
        if let Some(meters) = listing.nearest_landmark_meters {
            bands
                .entry(DistanceBand::for_meters(meters))
                .or_default()
                .push(listing.price());
        }
    }

    bands
        .into_iter()
        .filter_map(|(band, prices)| {
            Some(DistanceBandStats {
                band,
                prices: price_stats(&prices)?,
            })
        })
        .collect()
}
