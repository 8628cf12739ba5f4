//! Geographic coordinate of a rank.
//!
//! Path finding is hop-count BFS and never reads positions; they only feed
//! the nearest-rank locator in `rank-graph`.

use serde::{Deserialize, Serialize};

/// A WGS-84 coordinate stored as single-precision floats (~1 m precision at
/// the equator, plenty for locating a taxi rank).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }

    /// `true` when both components are finite and within WGS-84 bounds.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
