//! Neighborhood investment scoring.
//!
//! Three raw signals are computed per neighborhood and normalized to 0–100
//! across the neighborhoods of the current run:
//!
//! * price: average price, capped at a configured quantile of all prices
//! * location: average nearest-landmark distance mapped through a strictly
//!   decreasing proximity curve, so a closer average always scores higher
//! * demand: reviews blended with an occupancy proxy from availability
//!
//! The investment score is their weighted sum. Neighborhoods are ranked by
//! descending score with ties broken by name.

use std::collections::BTreeMap;

use hotspot_analysis_models::NeighborhoodScore;
use hotspot_city_models::{NormalizationStrategy, ScoringOptions};
use hotspot_listing_models::Listing;

use crate::stats;

/// Score given to every neighborhood when a signal does not vary.
pub const UNIFORM_SCORE: f64 = 100.0;

/// Relative spread below which a signal counts as constant.
const SPREAD_TOLERANCE: f64 = 1e-9;

/// Proximity quality in `0.0..=1.0` for an average landmark distance.
///
/// `1 / (1 + d / radius)`: 1 at the landmark, 0.5 at `radius`, and
/// decaying toward 0 beyond it. Strictly decreasing in `d`. Without
/// landmarks the quality is 1.
#[must_use]
pub fn proximity_quality(average_nearest_meters: Option<f64>, radius: f64) -> f64 {
    average_nearest_meters.map_or(1.0, |d| 1.0 / (1.0 + d.max(0.0) / radius))
}

/// Maps `values` onto 0–100 with `strategy`.
///
/// When every value is the same (including a single value) each one maps
/// to [`UNIFORM_SCORE`].
#[must_use]
pub fn normalize(values: &[f64], strategy: NormalizationStrategy) -> Vec<f64> {
    let transformed: Vec<f64> = match strategy {
        NormalizationStrategy::MinMax => values.to_vec(),
        NormalizationStrategy::MaxRatio => values.iter().map(|v| v.max(0.0)).collect(),
        NormalizationStrategy::Log => values.iter().map(|v| v.max(0.0).ln_1p()).collect(),
    };

    let min = transformed.iter().copied().fold(f64::INFINITY, f64::min);
    let max = transformed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;

    if transformed.is_empty() || spread <= SPREAD_TOLERANCE * max.abs().max(1.0) {
        return vec![UNIFORM_SCORE; transformed.len()];
    }

    match strategy {
        NormalizationStrategy::MaxRatio => transformed.iter().map(|v| v / max * 100.0).collect(),
        NormalizationStrategy::MinMax | NormalizationStrategy::Log => transformed
            .iter()
            .map(|v| (v - min) / spread * 100.0)
            .collect(),
    }
}

struct RawSignals<'a> {
    neighborhood: &'a str,
    listing_count: usize,
    average_price: f64,
    capped_price: f64,
    proximity: f64,
    average_nearest_landmark_meters: Option<f64>,
    average_review_count: f64,
    average_occupancy: Option<f64>,
}

/// Scores and ranks every neighborhood present in `listings`.
#[must_use]
pub fn score_neighborhoods(
    listings: &[Listing],
    options: &ScoringOptions,
) -> Vec<NeighborhoodScore> {
    let all_prices: Vec<f64> = listings.iter().map(Listing::price).collect();
    let Some(price_cap) = stats::quantile(&all_prices, options.price_cap_quantile) else {
        return Vec::new();
    };

    let mut groups: BTreeMap<&str, Vec<&Listing>> = BTreeMap::new();
    for listing in listings {
        groups
            .entry(listing.record.neighborhood.as_str())
            .or_default()
            .push(listing);
    }

    let signals: Vec<RawSignals> = groups
        .into_iter()
        .filter_map(|(neighborhood, members)| {
            raw_signals(neighborhood, &members, price_cap, options.proximity_radius_meters)
        })
        .collect();

    let price_scores = normalize(
        &signals.iter().map(|s| s.capped_price).collect::<Vec<_>>(),
        options.normalization,
    );
    let location_scores = normalize(
        &signals.iter().map(|s| s.proximity).collect::<Vec<_>>(),
        options.normalization,
    );
    let demand_scores = demand_scores(&signals, options);

    let weights = options.weights;
    let mut scores: Vec<NeighborhoodScore> = signals
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let investment_score = weights.demand.mul_add(
                demand_scores[i],
                weights
                    .price
                    .mul_add(price_scores[i], weights.location * location_scores[i]),
            );
            NeighborhoodScore {
                neighborhood: s.neighborhood.to_string(),
                listing_count: s.listing_count,
                average_price: s.average_price,
                average_nearest_landmark_meters: s.average_nearest_landmark_meters,
                average_review_count: s.average_review_count,
                average_occupancy: s.average_occupancy,
                price_score: price_scores[i],
                location_score: location_scores[i],
                demand_score: demand_scores[i],
                investment_score,
                rank: 0,
            }
        })
        .collect();

    scores.sort_by(|a, b| {
        b.investment_score
            .total_cmp(&a.investment_score)
            .then_with(|| a.neighborhood.cmp(&b.neighborhood))
    });
    for (i, score) in scores.iter_mut().enumerate() {
        score.rank = i + 1;
    }

    if let Some(top) = scores.first() {
        log::info!(
            "Scored {} neighborhoods; top: {} ({:.1})",
            scores.len(),
            top.neighborhood,
            top.investment_score
        );
    }

    scores
}

fn raw_signals<'a>(
    neighborhood: &'a str,
    members: &[&Listing],
    price_cap: f64,
    radius: f64,
) -> Option<RawSignals<'a>> {
    let prices: Vec<f64> = members.iter().map(|l| l.price()).collect();
    let nearest: Vec<f64> = members
        .iter()
        .filter_map(|l| l.nearest_landmark_meters)
        .collect();
    let reviews: Vec<f64> = members
        .iter()
        .map(|l| f64::from(l.record.review_count))
        .collect();
    let occupancy: Vec<f64> = members
        .iter()
        .filter_map(|l| l.record.occupancy())
        .collect();

    let average_price = stats::mean(&prices)?;
    let average_nearest_landmark_meters = stats::mean(&nearest);

    Some(RawSignals {
        neighborhood,
        listing_count: members.len(),
        average_price,
        capped_price: average_price.min(price_cap),
        proximity: proximity_quality(average_nearest_landmark_meters, radius),
        average_nearest_landmark_meters,
        average_review_count: stats::mean(&reviews)?,
        average_occupancy: stats::mean(&occupancy),
    })
}

/// Review and occupancy components are normalized separately. Occupancy is
/// normalized only across neighborhoods that report it; the rest use the
/// review component alone.
fn demand_scores(signals: &[RawSignals], options: &ScoringOptions) -> Vec<f64> {
    let review_scores = normalize(
        &signals
            .iter()
            .map(|s| s.average_review_count)
            .collect::<Vec<_>>(),
        options.normalization,
    );

    let with_occupancy: Vec<(usize, f64)> = signals
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.average_occupancy.map(|o| (i, o)))
        .collect();
    let occupancy_scores = normalize(
        &with_occupancy.iter().map(|(_, o)| *o).collect::<Vec<_>>(),
        options.normalization,
    );

    let mut scores = review_scores.clone();
    for ((i, _), occupancy_score) in with_occupancy.iter().zip(occupancy_scores) {
        scores[*i] = options.review_weight.mul_add(
            review_scores[*i],
            (1.0 - options.review_weight) * occupancy_score,
        );
    }
    scores
}

#[cfg(test)]
mod tests {
    use hotspot_city_models::ScoreWeights;

    use super::*;
    use crate::test_support::located;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn neighborhood(name: &str, count: u32, price: f64) -> Vec<Listing> {
        (0..count)
            .map(|i| located(&format!("{name}-{i}"), 0.0, 0.0, price, name))
            .collect()
    }

    fn at_distances(name: &str, distances: &[f64]) -> Vec<Listing> {
        distances
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let mut listing = located(&format!("{name}-{i}"), 0.0, 0.0, 100.0, name);
                listing.nearest_landmark_meters = Some(d);
                listing
            })
            .collect()
    }

    #[test]
    fn proximity_quality_decreases_with_distance() {
        assert!(approx(proximity_quality(Some(0.0), 2_000.0), 1.0));
        assert!(approx(proximity_quality(Some(2_000.0), 2_000.0), 0.5));
        assert!(approx(proximity_quality(Some(6_000.0), 2_000.0), 0.25));
        assert!(approx(proximity_quality(None, 2_000.0), 1.0));
        assert!(
            proximity_quality(Some(500.0), 2_000.0) > proximity_quality(Some(1_500.0), 2_000.0)
        );
    }

    #[test]
    fn closer_within_radius_still_scores_higher() {
        let mut listings = at_distances("Near", &[500.0, 500.0]);
        listings.extend(at_distances("Mid", &[1_500.0, 1_500.0]));
        listings.extend(at_distances("Edge", &[1_900.0, 1_900.0]));

        let scores = score_neighborhoods(&listings, &ScoringOptions::default());
        let by_name = |name: &str| scores.iter().find(|s| s.neighborhood == name).unwrap();
        assert!(by_name("Near").location_score > by_name("Mid").location_score);
        assert!(by_name("Mid").location_score > by_name("Edge").location_score);
    }

    #[test]
    fn lower_average_distance_never_scores_lower() {
        // "Spread" mixes a listing at the landmark with one 10 km out
        // (average 5 km); "Steady" sits at 4 km throughout.
        let mut listings = at_distances("Spread", &[0.0, 10_000.0]);
        listings.extend(at_distances("Steady", &[4_000.0, 4_000.0]));
        listings.extend(at_distances("Close", &[100.0, 900.0, 2_000.0]));
        listings.extend(at_distances("Remote", &[12_000.0, 20_000.0]));

        for strategy in [
            NormalizationStrategy::MinMax,
            NormalizationStrategy::MaxRatio,
            NormalizationStrategy::Log,
        ] {
            let options = ScoringOptions {
                normalization: strategy,
                ..ScoringOptions::default()
            };
            let scores = score_neighborhoods(&listings, &options);
            for a in &scores {
                for b in &scores {
                    let (da, db) = (
                        a.average_nearest_landmark_meters.unwrap(),
                        b.average_nearest_landmark_meters.unwrap(),
                    );
                    if da < db {
                        assert!(
                            a.location_score > b.location_score,
                            "{} ({da} m) vs {} ({db} m) under {strategy:?}",
                            a.neighborhood,
                            b.neighborhood,
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn min_max_spans_zero_to_hundred() {
        let scores = normalize(&[10.0, 20.0, 30.0], NormalizationStrategy::MinMax);
        assert!(approx(scores[0], 0.0));
        assert!(approx(scores[1], 50.0));
        assert!(approx(scores[2], 100.0));
    }

    #[test]
    fn max_ratio_divides_by_max_and_clamps_negatives() {
        let scores = normalize(&[-5.0, 25.0, 100.0], NormalizationStrategy::MaxRatio);
        assert!(approx(scores[0], 0.0));
        assert!(approx(scores[1], 25.0));
        assert!(approx(scores[2], 100.0));
    }

    #[test]
    fn log_normalization_compresses_outliers() {
        let scores = normalize(&[0.0, 9.0, 99.0], NormalizationStrategy::Log);
        assert!(approx(scores[0], 0.0));
        assert!(approx(scores[1], 50.0));
        assert!(approx(scores[2], 100.0));
    }

    #[test]
    fn constant_values_all_score_hundred() {
        for strategy in [
            NormalizationStrategy::MinMax,
            NormalizationStrategy::MaxRatio,
            NormalizationStrategy::Log,
        ] {
            assert_eq!(normalize(&[42.0], strategy), vec![UNIFORM_SCORE]);
            assert_eq!(normalize(&[7.0, 7.0, 7.0], strategy), vec![UNIFORM_SCORE; 3]);
            assert_eq!(normalize(&[0.0, 0.0], strategy), vec![UNIFORM_SCORE; 2]);
            assert!(normalize(&[], strategy).is_empty());
        }
    }

    #[test]
    fn single_neighborhood_scores_hundred() {
        let listings = neighborhood("Solo", 1, 180.0);
        let scores = score_neighborhoods(&listings, &ScoringOptions::default());
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].rank, 1);
        assert!(approx(scores[0].price_score, 100.0));
        assert!(approx(scores[0].location_score, 100.0));
        assert!(approx(scores[0].demand_score, 100.0));
        assert!(approx(scores[0].investment_score, 100.0));
    }

    #[test]
    fn zero_variance_prices_rank_by_name() {
        let mut listings = neighborhood("Beta", 3, 150.0);
        listings.extend(neighborhood("Alpha", 2, 150.0));
        let scores = score_neighborhoods(&listings, &ScoringOptions::default());
        assert!(scores.iter().all(|s| approx(s.price_score, 100.0)));
        let names: Vec<&str> = scores.iter().map(|s| s.neighborhood.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta"]);
        assert_eq!(scores[1].rank, 2);
    }

    #[test]
    fn higher_price_scores_higher_when_all_else_equal() {
        let mut listings = neighborhood("Cheap", 4, 100.0);
        listings.extend(neighborhood("Middle", 4, 200.0));
        listings.extend(neighborhood("Pricey", 4, 300.0));
        let scores = score_neighborhoods(&listings, &ScoringOptions::default());

        let names: Vec<&str> = scores.iter().map(|s| s.neighborhood.as_str()).collect();
        assert_eq!(names, ["Pricey", "Middle", "Cheap"]);
        assert!(scores[0].investment_score > scores[1].investment_score);
        assert!(scores[1].investment_score > scores[2].investment_score);
    }

    #[test]
    fn price_is_capped_at_quantile() {
        let mut listings = neighborhood("Normal", 19, 100.0);
        listings.extend(neighborhood("Outlier", 1, 10_000.0));
        let options = ScoringOptions {
            price_cap_quantile: 0.5,
            ..ScoringOptions::default()
        };
        let scores = score_neighborhoods(&listings, &options);
        // Both averages cap at the median price, so price no longer
        // separates them.
        assert!(scores.iter().all(|s| approx(s.price_score, 100.0)));
        let outlier = scores.iter().find(|s| s.neighborhood == "Outlier").unwrap();
        assert!(approx(outlier.average_price, 10_000.0));
    }

    #[test]
    fn location_rewards_proximity() {
        let mut near = neighborhood("Near", 2, 100.0);
        for l in &mut near {
            l.nearest_landmark_meters = Some(500.0);
        }
        let mut far = neighborhood("Far", 2, 100.0);
        for l in &mut far {
            l.nearest_landmark_meters = Some(8_000.0);
        }
        near.extend(far);

        let scores = score_neighborhoods(&near, &ScoringOptions::default());
        assert_eq!(scores[0].neighborhood, "Near");
        assert!(approx(scores[0].location_score, 100.0));
        assert!(approx(scores[1].location_score, 0.0));
        assert!(approx(scores[0].average_nearest_landmark_meters.unwrap(), 500.0));
    }

    #[test]
    fn demand_blends_reviews_and_occupancy() {
        let mut busy = neighborhood("Busy", 2, 100.0);
        for l in &mut busy {
            l.record.review_count = 100;
            l.record.availability = Some(0);
        }
        let mut quiet = neighborhood("Quiet", 2, 100.0);
        for l in &mut quiet {
            l.record.review_count = 0;
            l.record.availability = Some(365);
        }
        let mut unknown = neighborhood("Unreported", 2, 100.0);
        for l in &mut unknown {
            l.record.review_count = 50;
        }
        busy.extend(quiet);
        busy.extend(unknown);

        let scores = score_neighborhoods(&busy, &ScoringOptions::default());
        let by_name = |name: &str| scores.iter().find(|s| s.neighborhood == name).unwrap();

        assert!(approx(by_name("Busy").demand_score, 100.0));
        assert!(approx(by_name("Quiet").demand_score, 0.0));
        assert!(approx(by_name("Unreported").demand_score, 50.0));
        assert_eq!(by_name("Unreported").average_occupancy, None);
        assert!(approx(by_name("Busy").average_occupancy.unwrap(), 1.0));
    }

    #[test]
    fn weights_combine_sub_scores() {
        let mut listings = neighborhood("A", 1, 100.0);
        listings.extend(neighborhood("B", 1, 300.0));
        listings[1].record.review_count = 10;
        let options = ScoringOptions {
            weights: ScoreWeights {
                price: 0.5,
                location: 0.0,
                demand: 0.5,
            },
            ..ScoringOptions::default()
        };
        let scores = score_neighborhoods(&listings, &options);
        assert_eq!(scores[0].neighborhood, "B");
        assert!(approx(scores[0].investment_score, 100.0));
        assert!(approx(scores[1].investment_score, 0.0));
    }

    #[test]
    fn empty_input_scores_nothing() {
        assert!(score_neighborhoods(&[], &ScoringOptions::default()).is_empty());
    }
}
