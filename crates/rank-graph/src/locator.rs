//! Nearest-rank lookup over rank positions.
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the closest ranks, used to
//! suggest an origin rank to a client that only knows where they stand.
//! Ranks without a valid position are not indexed.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use rank_core::{GeoPoint, Rank, RankId};

/// R-tree entry: a `[lat, lon]` point with the rank it belongs to.
#[derive(Clone)]
struct RankEntry {
    point: [f32; 2],
    id:    RankId,
}

impl RTreeObject for RankEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for RankEntry {
    /// Squared Euclidean distance in lat/lon space; fine for ordering ranks
    /// within one metro area.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

/// Spatial index of rank positions.
pub struct RankLocator {
    tree: RTree<RankEntry>,
}

impl RankLocator {
    /// Bulk-load the positioned ranks in `ranks`.
    pub fn from_ranks<'a, I>(ranks: I) -> Self
    where
        I: IntoIterator<Item = &'a Rank>,
    {
        let entries: Vec<RankEntry> = ranks
            .into_iter()
            .filter_map(|r| {
                r.position
                    .filter(|p| p.is_valid())
                    .map(|p| RankEntry { point: [p.lat, p.lon], id: r.id })
            })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// The closest indexed rank, or `None` if nothing is indexed.
    pub fn nearest(&self, pos: GeoPoint) -> Option<RankId> {
        self.tree.nearest_neighbor(&[pos.lat, pos.lon]).map(|e| e.id)
    }

    /// Up to `k` ranks sorted by ascending distance from `pos`.
    pub fn k_nearest(&self, pos: GeoPoint, k: usize) -> Vec<RankId> {
        self.tree
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}
