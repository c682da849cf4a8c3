use std::num::NonZeroUsize;

use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// A point returned by a locator query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the point in the snapshot the locator was built from.
    pub index: usize,
    /// Squared euclidean distance to the query point.
    pub distance_sq: f64,
}

/// Spatial index over a snapshot of `K`-dimensional points.
///
/// The locator never observes later changes of the points it was built
/// from; owners discard it and build a new one when their points change.
/// Queries against an empty snapshot return empty results.
pub struct NeighborLocator<const K: usize = 3> {
    points: Vec<[f64; K]>,
    tree: Option<ImmutableKdTree<f64, u32, K, 32>>,
}

impl<const K: usize> std::fmt::Debug for NeighborLocator<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeighborLocator")
            .field("dim", &K)
            .field("num_points", &self.points.len())
            .finish()
    }
}

impl<const K: usize> NeighborLocator<K> {
    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the snapshot is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The indexed points.
    pub fn points(&self) -> &[[f64; K]] {
        &self.points
    }

    /// Get an indexed point by index.
    pub fn point(&self, index: usize) -> Option<&[f64; K]> {
        self.points.get(index)
    }

    /// Coordinates of a list of neighbors.
    pub fn gather(&self, neighbors: &[Neighbor]) -> Vec<[f64; K]> {
        neighbors.iter().map(|n| self.points[n.index]).collect()
    }
}

fn into_neighbors(found: Vec<kiddo::NearestNeighbour<f64, u32>>) -> Vec<Neighbor> {
    found
        .into_iter()
        .map(|nn| Neighbor {
            index: nn.item as usize,
            distance_sq: nn.distance,
        })
        .collect()
}

macro_rules! impl_neighbor_locator {
    ($dim:literal) => {
        impl NeighborLocator<$dim> {
            /// Build the kd-tree over a copy of `points`.
            pub fn new(points: &[[f64; $dim]]) -> Self {
                let tree = match points.is_empty() {
                    true => None,
                    false => Some(ImmutableKdTree::new_from_slice(points)),
                };
                Self {
                    points: points.to_vec(),
                    tree,
                }
            }

            /// Find the `k` points closest to `query`, by ascending distance.
            ///
            /// All points are returned when the snapshot holds fewer than `k`.
            pub fn k_nearest(&self, query: &[f64; $dim], k: usize) -> Vec<Neighbor> {
                let k = NonZeroUsize::new(k.min(self.points.len()));
                let (Some(tree), Some(k)) = (&self.tree, k) else {
                    return Vec::new();
                };
                let mut neighbors = into_neighbors(tree.nearest_n::<SquaredEuclidean>(query, k));
                neighbors.sort_by(|a, b| a.distance_sq.total_cmp(&b.distance_sq));
                neighbors
            }

            /// Find every point within `radius` of `query`, in no particular order.
            pub fn within_radius(&self, query: &[f64; $dim], radius: f64) -> Vec<Neighbor> {
                match &self.tree {
                    Some(tree) if radius >= 0.0 => into_neighbors(
                        tree.within_unsorted::<SquaredEuclidean>(query, radius * radius),
                    ),
                    _ => Vec::new(),
                }
            }

            /// Find the single point closest to `query`.
            pub fn closest(&self, query: &[f64; $dim]) -> Option<Neighbor> {
                self.tree.as_ref().map(|tree| {
                    let nn = tree.nearest_one::<SquaredEuclidean>(query);
                    Neighbor {
                        index: nn.item as usize,
                        distance_sq: nn.distance,
                    }
                })
            }
        }
    };
}

impl_neighbor_locator!(3);
impl_neighbor_locator!(4);
