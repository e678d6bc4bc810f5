//! Cluster summaries.

use std::cmp::Ordering;

use hotspot_analysis_models::{Cluster, TierSummary};
use hotspot_geography_models::PlanarPoint;
use hotspot_listing_models::Listing;
use hotspot_spatial::PlanarProjection;

use crate::stats;
use crate::tiering::TierAssignment;

/// Summarizes a tier's clustering, with clusters in reporting order.
#[must_use]
pub fn summarize_tier<P: PlanarProjection + ?Sized>(
    listings: &[Listing],
    assignment: &TierAssignment,
    projection: &P,
) -> TierSummary {
    let clusters = aggregate_clusters(listings, assignment, projection);
    let tier = &assignment.tier;

    TierSummary {
        tier: tier.name.clone(),
        min_price: tier.min_price,
        max_price: tier.max_price,
        upper_inclusive: tier.upper_inclusive,
        eps_meters: tier.eps_meters,
        min_points: tier.min_points,
        listing_count: assignment.members.len(),
        clustered_count: assignment.clustered_count(),
        noise_count: assignment.noise_count(),
        cluster_count: clusters.len(),
        clusters,
    }
}

/// Builds one [`Cluster`] per cluster id in `assignment`, sorted by
/// descending size, then descending average price, then ascending id.
#[must_use]
pub fn aggregate_clusters<P: PlanarProjection + ?Sized>(
    listings: &[Listing],
    assignment: &TierAssignment,
    projection: &P,
) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = assignment
        .cluster_members()
        .into_iter()
        .zip(0u32..)
        .filter_map(|(members, cluster_id)| {
            let members: Vec<&Listing> = members.iter().map(|&i| &listings[i]).collect();
            build_cluster(&assignment.tier.name, cluster_id, &members, projection)
        })
        .collect();

    clusters.sort_by(compare_clusters);

    for cluster in &clusters {
        log::debug!(
            "Tier '{}' cluster {}: {} listings, avg ${:.2}, centroid ({:.5}, {:.5})",
            cluster.tier,
            cluster.cluster_id,
            cluster.listing_count,
            cluster.average_price,
            cluster.centroid_location.latitude,
            cluster.centroid_location.longitude,
        );
    }

    clusters
}

fn compare_clusters(a: &Cluster, b: &Cluster) -> Ordering {
    b.listing_count
        .cmp(&a.listing_count)
        .then_with(|| b.average_price.total_cmp(&a.average_price))
        .then_with(|| a.cluster_id.cmp(&b.cluster_id))
}

fn build_cluster<P: PlanarProjection + ?Sized>(
    tier: &str,
    cluster_id: u32,
    members: &[&Listing],
    projection: &P,
) -> Option<Cluster> {
    let prices: Vec<f64> = members.iter().map(|l| l.price()).collect();
    let xs: Vec<f64> = members.iter().map(|l| l.position.x).collect();
    let ys: Vec<f64> = members.iter().map(|l| l.position.y).collect();

    let centroid = PlanarPoint::new(stats::mean(&xs)?, stats::mean(&ys)?);

    Some(Cluster {
        tier: tier.to_string(),
        cluster_id,
        member_ids: members.iter().map(|l| l.id().to_string()).collect(),
        listing_count: members.len(),
        average_price: stats::mean(&prices)?,
        total_value: prices.iter().sum(),
        min_price: prices.iter().copied().min_by(f64::total_cmp)?,
        max_price: prices.iter().copied().max_by(f64::total_cmp)?,
        centroid,
        centroid_location: projection.unproject(&centroid),
    })
}
