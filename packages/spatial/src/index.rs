//! Radius-neighbor queries over projected points.
//!
//! Wraps an `rstar` R-tree whose entries carry the point's position in the
//! caller's slice. Query results are returned sorted by that position so
//! callers never observe tree traversal order.

use hotspot_geography_models::PlanarPoint;
use rstar::RTree;
use rstar::primitives::GeomWithData;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Immutable spatial index over a slice of planar points.
pub struct NeighborIndex {
    tree: RTree<IndexedPoint>,
    points: Vec<PlanarPoint>,
}

impl NeighborIndex {
    /// Bulk-loads an index over `points`. Entry `i` refers to `points[i]`.
    #[must_use]
    pub fn build(points: &[PlanarPoint]) -> Self {
        let entries: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new(p.to_array(), i))
            .collect();

        let tree = RTree::bulk_load(entries);
        log::trace!("Built neighbor index over {} points", tree.size());

        Self {
            tree,
            points: points.to_vec(),
        }
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the index holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The point stored at position `i`.
    #[must_use]
    pub fn point(&self, i: usize) -> Option<&PlanarPoint> {
        self.points.get(i)
    }

    /// Positions of all points within `radius` meters of `center`
    /// (inclusive), in ascending order.
    #[must_use]
    pub fn within(&self, center: &PlanarPoint, radius: f64) -> Vec<usize> {
        let radius_squared = radius * radius;
        let mut hits: Vec<usize> = self
            .tree
            .locate_within_distance(center.to_array(), radius_squared)
            .map(|entry| entry.data)
            .filter(|&i| self.points[i].distance_squared(center) <= radius_squared)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Positions of all points within `radius` of the point at position
    /// `i`, including `i` itself, in ascending order. Empty when `i` is out
    /// of range.
    #[must_use]
    pub fn neighbors_of(&self, i: usize, radius: f64) -> Vec<usize> {
        self.points
            .get(i)
            .map(|center| self.within(center, radius))
            .unwrap_or_default()
    }
}
