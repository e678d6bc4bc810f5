//! Price tiers and density clustering.
//!
//! Each tier selects the listings whose price it contains and clusters
//! them with DBSCAN over projected coordinates. Neighbor lookups go
//! through a [`NeighborIndex`] built per tier; results come back sorted by
//! position so labels depend only on cleaned order.
//!
//! A border point reachable from more than one cluster keeps the first
//! cluster that reaches it. Expansion is breadth-first and listings are
//! scanned in cleaned order, so that choice is deterministic.

use std::collections::VecDeque;

use hotspot_city_models::TierDefinition;
use hotspot_geography_models::PlanarPoint;
use hotspot_listing_models::Listing;
use hotspot_spatial::NeighborIndex;

/// Clustering outcome for one tier.
#[derive(Debug, Clone, PartialEq)]
pub struct TierAssignment {
    /// The tier definition used.
    pub tier: TierDefinition,
    /// Positions in the listing slice of the tier's members, ascending.
    pub members: Vec<usize>,
    /// Cluster label per member, parallel to `members`; `None` is noise.
    pub labels: Vec<Option<u32>>,
    /// Number of clusters found. Ids run from 0 to `cluster_count - 1`.
    pub cluster_count: u32,
}

impl TierAssignment {
    /// Members assigned to some cluster.
    #[must_use]
    pub fn clustered_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_some()).count()
    }

    /// Members left as noise.
    #[must_use]
    pub fn noise_count(&self) -> usize {
        self.labels.len() - self.clustered_count()
    }

    /// Listing positions of each cluster's members, indexed by cluster id.
    #[must_use]
    pub fn cluster_members(&self) -> Vec<Vec<usize>> {
        let mut clusters = vec![Vec::new(); self.cluster_count as usize];
        for (&listing, label) in self.members.iter().zip(&self.labels) {
            if let Some(id) = label {
                clusters[*id as usize].push(listing);
            }
        }
        clusters
    }

    /// The cluster label of the listing at `position`, if it is a member
    /// of this tier and not noise.
    #[must_use]
    pub fn label_of(&self, position: usize) -> Option<u32> {
        self.members
            .binary_search(&position)
            .ok()
            .and_then(|i| self.labels[i])
    }
}

/// Clusters every tier independently, in configuration order.
#[must_use]
pub fn cluster_tiers(listings: &[Listing], tiers: &[TierDefinition]) -> Vec<TierAssignment> {
    tiers.iter().map(|tier| cluster_tier(listings, tier)).collect()
}

/// Selects the listings priced inside `tier` and clusters them.
#[must_use]
pub fn cluster_tier(listings: &[Listing], tier: &TierDefinition) -> TierAssignment {
    let members: Vec<usize> = listings
        .iter()
        .enumerate()
        .filter(|(_, l)| tier.contains(l.price()))
        .map(|(i, _)| i)
        .collect();

    let points: Vec<PlanarPoint> = members.iter().map(|&i| listings[i].position).collect();
    let (labels, cluster_count) = dbscan(&points, tier.eps_meters, tier.min_points);

    let assignment = TierAssignment {
        tier: tier.clone(),
        members,
        labels,
        cluster_count,
    };

    log::debug!(
        "Tier '{}': {} listings, {} clusters, {} clustered, {} noise",
        tier.name,
        assignment.members.len(),
        assignment.cluster_count,
        assignment.clustered_count(),
        assignment.noise_count(),
    );

    assignment
}

/// DBSCAN over `points`.
///
/// A point is core when at least `min_points` points (itself included)
/// lie within `eps` of it. Returns one label per point (`None` for noise)
/// and the number of clusters.
#[must_use]
pub fn dbscan(points: &[PlanarPoint], eps: f64, min_points: usize) -> (Vec<Option<u32>>, u32) {
    let index = NeighborIndex::build(points);
    let mut labels: Vec<Option<u32>> = vec![None; points.len()];
    let mut visited = vec![false; points.len()];
    let mut next_id = 0u32;

    for start in 0..points.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;

        let neighbors = index.neighbors_of(start, eps);
        if neighbors.len() < min_points {
            continue;
        }

        let cluster_id = next_id;
        next_id += 1;
        labels[start] = Some(cluster_id);

        // Each point is queued at most once per run.
        let mut queue = VecDeque::new();
        enqueue(&neighbors, cluster_id, &mut labels, &mut visited, &mut queue);
        while let Some(point) = queue.pop_front() {
            let expansion = index.neighbors_of(point, eps);
            if expansion.len() >= min_points {
                enqueue(&expansion, cluster_id, &mut labels, &mut visited, &mut queue);
            }
        }
    }

    (labels, next_id)
}

/// Claims unlabelled `neighbors` for `cluster_id` and queues the ones not
/// yet visited for expansion.
fn enqueue(
    neighbors: &[usize],
    cluster_id: u32,
    labels: &mut [Option<u32>],
    visited: &mut [bool],
    queue: &mut VecDeque<usize>,
) {
    for &point in neighbors {
        if labels[point].is_none() {
            labels[point] = Some(cluster_id);
        }
        if !visited[point] {
            visited[point] = true;
            queue.push_back(point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{located, tier};

    fn grid(n: usize, spacing: f64, dx: f64, dy: f64) -> Vec<PlanarPoint> {
        (0..n)
            .map(|i| {
                let row = u32::try_from(i / 5).unwrap();
                let col = u32::try_from(i % 5).unwrap();
                PlanarPoint::new(
                    f64::from(col).mul_add(spacing, dx),
                    f64::from(row).mul_add(spacing, dy),
                )
            })
            .collect()
    }

    #[test]
    fn dense_group_forms_one_cluster() {
        let (labels, count) = dbscan(&grid(20, 20.0, 0.0, 0.0), 300.0, 10);
        assert_eq!(count, 1);
        assert!(labels.iter().all(|l| *l == Some(0)));
    }

    #[test]
    fn sparse_points_are_noise() {
        let points: Vec<PlanarPoint> = (0..5)
            .map(|i| PlanarPoint::new(f64::from(i) * 1_000.0, 0.0))
            .collect();
        let (labels, count) = dbscan(&points, 300.0, 2);
        assert_eq!(count, 0);
        assert!(labels.iter().all(Option::is_none));
    }

    #[test]
    fn separated_groups_form_separate_clusters() {
        let mut points = grid(10, 10.0, 0.0, 0.0);
        points.extend(grid(10, 10.0, 500.0, 0.0));
        let (labels, count) = dbscan(&points, 300.0, 5);
        assert_eq!(count, 2);
        assert!(labels[..10].iter().all(|l| *l == Some(0)));
        assert!(labels[10..].iter().all(|l| *l == Some(1)));
    }

    #[test]
    fn chains_connect_through_core_points() {
        // 200 m apart: each inner point sees both neighbors, the ends only
        // one. With min_points 3 the inner points are core and the chain is
        // a single cluster spanning 1.8 km.
        let points: Vec<PlanarPoint> = (0..10)
            .map(|i| PlanarPoint::new(f64::from(i) * 200.0, 0.0))
            .collect();
        let (labels, count) = dbscan(&points, 250.0, 3);
        assert_eq!(count, 1);
        assert!(labels.iter().all(|l| *l == Some(0)));
    }

    #[test]
    fn border_point_goes_to_first_discovered_cluster() {
        // Two dense groups with one border point exactly between them,
        // reachable from a core point of each but core itself in neither.
        let mut points = vec![
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(0.0, 10.0),
            PlanarPoint::new(0.0, -10.0),
        ];
        points.push(PlanarPoint::new(200.0, 0.0));
        points.extend([
            PlanarPoint::new(400.0, 0.0),
            PlanarPoint::new(400.0, 10.0),
            PlanarPoint::new(400.0, -10.0),
        ]);

        let (labels, count) = dbscan(&points, 200.0, 4);
        assert_eq!(count, 2);
        assert_eq!(labels[3], Some(0));
        assert!(labels[..3].iter().all(|l| *l == Some(0)));
        assert!(labels[4..].iter().all(|l| *l == Some(1)));

        // Scanning the right group first hands the border point to it.
        let mut reversed = points[4..].to_vec();
        reversed.push(points[3]);
        reversed.extend_from_slice(&points[..3]);
        let (labels, _) = dbscan(&reversed, 200.0, 4);
        assert_eq!(labels[3], Some(0));
        assert!(labels[4..].iter().all(|l| *l == Some(1)));
    }

    #[test]
    fn noise_reached_later_becomes_border() {
        // Point 0 is scanned first and is not core, but the cluster found
        // from point 1 reaches it.
        let points = vec![
            PlanarPoint::new(-90.0, 0.0),
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(10.0, 0.0),
            PlanarPoint::new(20.0, 0.0),
        ];
        let (labels, count) = dbscan(&points, 100.0, 4);
        assert_eq!(count, 1);
        assert_eq!(labels, vec![Some(0); 4]);
    }

    #[test]
    fn min_points_of_one_makes_singletons() {
        let points = vec![PlanarPoint::new(0.0, 0.0), PlanarPoint::new(1_000.0, 0.0)];
        let (labels, count) = dbscan(&points, 10.0, 1);
        assert_eq!(count, 2);
        assert_eq!(labels, vec![Some(0), Some(1)]);
    }

    #[test]
    fn empty_input() {
        let (labels, count) = dbscan(&[], 100.0, 3);
        assert!(labels.is_empty());
        assert_eq!(count, 0);
    }

    #[test]
    fn tier_selects_only_contained_prices() {
        let listings = vec![
            located("a", 0.0, 0.0, 199.99, "N"),
            located("b", 0.0, 0.0, 200.0, "N"),
            located("c", 0.0, 0.0, 999.99, "N"),
            located("d", 0.0, 0.0, 1_000.0, "N"),
        ];
        let premium = tier("premium", 200.0, 1_000.0, 300.0, 1);
        let assignment = cluster_tier(&listings, &premium);
        assert_eq!(assignment.members, vec![1, 2]);
        for &i in &assignment.members {
            assert!(premium.contains(listings[i].price()));
        }
        assert_eq!(assignment.label_of(1), Some(0));
        assert_eq!(assignment.label_of(0), None);
    }

    #[test]
    fn boundary_price_lands_in_exactly_one_tier() {
        let listings = vec![located("a", 0.0, 0.0, 1_000.0, "N")];
        let tiers = vec![
            tier("premium", 200.0, 1_000.0, 300.0, 1),
            tier("luxury", 1_000.0, 2_500.0, 500.0, 1),
        ];
        let assignments = cluster_tiers(&listings, &tiers);
        assert!(assignments[0].members.is_empty());
        assert_eq!(assignments[1].members, vec![0]);
    }

    #[test]
    fn empty_tier_has_no_clusters() {
        let listings = vec![located("a", 0.0, 0.0, 50.0, "N")];
        let assignment = cluster_tier(&listings, &tier("premium", 200.0, 1_000.0, 300.0, 1));
        assert_eq!(assignment.cluster_count, 0);
        assert!(assignment.cluster_members().is_empty());
    }

    #[test]
    fn no_listing_belongs_to_two_clusters() {
        let mut listings = Vec::new();
        for i in 0..60 {
            let f = f64::from(i);
            listings.push(located(
                &i.to_string(),
                (f * 137.0) % 900.0,
                (f * 71.0) % 600.0,
                250.0,
                "N",
            ));
        }
        let assignment = cluster_tier(&listings, &tier("premium", 200.0, 1_000.0, 150.0, 3));
        let clusters = assignment.cluster_members();
        let total: usize = clusters.iter().map(Vec::len).sum();
        assert_eq!(total, assignment.clustered_count());

        let mut seen = std::collections::BTreeSet::new();
        for member in clusters.iter().flatten() {
            assert!(seen.insert(*member));
        }
    }

    fn scattered(n: u32) -> Vec<PlanarPoint> {
        (0..n)
            .map(|i| {
                let f = f64::from(i);
                PlanarPoint::new((f * 137.0) % 900.0, (f * 71.0) % 600.0)
            })
            .collect()
    }

    fn within_eps(points: &[PlanarPoint], i: usize, eps: f64) -> Vec<usize> {
        (0..points.len())
            .filter(|&j| points[i].distance_squared(&points[j]) <= eps * eps)
            .collect()
    }

    #[test]
    fn cluster_members_are_linked_by_eps_hops() {
        let eps = 150.0;
        let points = scattered(60);
        let (labels, count) = dbscan(&points, eps, 3);
        assert!(count > 0);

        for id in 0..count {
            let members: Vec<usize> = (0..points.len())
                .filter(|&i| labels[i] == Some(id))
                .collect();
            let mut reached = vec![false; points.len()];
            let mut queue = VecDeque::from([members[0]]);
            reached[members[0]] = true;
            while let Some(i) = queue.pop_front() {
                for j in within_eps(&points, i, eps) {
                    if labels[j] == Some(id) && !reached[j] {
                        reached[j] = true;
                        queue.push_back(j);
                    }
                }
            }
            assert!(
                members.iter().all(|&m| reached[m]),
                "cluster {id} is not connected"
            );
        }
    }

    #[test]
    fn neighboring_core_points_share_a_label() {
        let eps = 150.0;
        let min_points = 3;
        let points = scattered(60);
        let (labels, _) = dbscan(&points, eps, min_points);

        let core: Vec<usize> = (0..points.len())
            .filter(|&i| within_eps(&points, i, eps).len() >= min_points)
            .collect();
        assert!(!core.is_empty());
        for &a in &core {
            assert!(labels[a].is_some());
            for &b in &core {
                if points[a].distance_squared(&points[b]) <= eps * eps {
                    assert_eq!(labels[a], labels[b], "core points {a} and {b}");
                }
            }
        }
    }

    #[test]
    fn clustering_is_deterministic() {
        let points: Vec<PlanarPoint> = (0..300)
            .map(|i| {
                let f = f64::from(i);
                PlanarPoint::new((f * 53.0) % 2_000.0, (f * 29.0) % 1_500.0)
            })
            .collect();
        let first = dbscan(&points, 120.0, 4);
        for _ in 0..5 {
            assert_eq!(dbscan(&points, 120.0, 4), first);
        }
    }
}
