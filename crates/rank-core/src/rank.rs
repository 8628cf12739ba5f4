//! Ranks, directed route edges, and associations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{AssociationId, GeoPoint, RankId, RouteId};

// ── Rank ──────────────────────────────────────────────────────────────────────

/// A physical taxi rank: one node of the route graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    pub id:           RankId,
    pub name:         String,
    pub address:      String,
    #[serde(default)]
    pub position:     Option<GeoPoint>,
    #[serde(default)]
    pub associations: BTreeSet<AssociationId>,
    #[serde(default)]
    pub version:      u64,
}

/// Input for creating a rank; the store assigns the id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRank {
    pub name:     String,
    pub address:  String,
    #[serde(default)]
    pub position: Option<GeoPoint>,
}

impl Rank {
    pub fn from_new(id: RankId, new: NewRank) -> Self {
        Self {
            id,
            name:         new.name,
            address:      new.address,
            position:     new.position,
            associations: BTreeSet::new(),
            version:      0,
        }
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// A directed, priced edge `from_rank → to_rank`.
///
/// The reverse direction is a separate document.  `price`, `driver_split`
/// and `association_split` may be absent on older documents; consumers treat
/// an absent value as `0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id:                RouteId,
    pub from_rank:         RankId,
    pub to_rank:           RankId,
    /// Strictly positive.
    pub distance:          f64,
    /// Passenger fare.
    pub fare_price:        f64,
    /// Package movement price.
    #[serde(default)]
    pub price:             Option<f64>,
    /// Percentage of leg revenue attributed to the driver.
    #[serde(default)]
    pub driver_split:      Option<f64>,
    /// Percentage of leg revenue attributed to the association.
    #[serde(default)]
    pub association_split: Option<f64>,
    #[serde(default)]
    pub version:           u64,
}

impl Route {
    pub fn from_spec(id: RouteId, from_rank: RankId, to_rank: RankId, spec: &RouteSpec) -> Self {
        Self {
            id,
            from_rank,
            to_rank,
            distance:          spec.distance,
            fare_price:        spec.fare_price,
            price:             spec.price,
            driver_split:      spec.driver_split,
            association_split: spec.association_split,
            version:           0,
        }
    }

    #[inline]
    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    #[inline]
    pub fn driver_split_or_zero(&self) -> f64 {
        self.driver_split.unwrap_or(0.0)
    }

    #[inline]
    pub fn association_split_or_zero(&self) -> f64 {
        self.association_split.unwrap_or(0.0)
    }
}

/// Edge metadata supplied when linking a destination to a rank.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub distance:          f64,
    pub fare_price:        f64,
    #[serde(default)]
    pub price:             Option<f64>,
    #[serde(default)]
    pub driver_split:      Option<f64>,
    #[serde(default)]
    pub association_split: Option<f64>,
}

impl RouteSpec {
    /// Describe the first malformed field, if any.
    pub fn problem(&self) -> Option<String> {
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return Some(format!("distance must be > 0, got {}", self.distance));
        }
        if !(self.fare_price.is_finite() && self.fare_price >= 0.0) {
            return Some(format!("fare_price must be >= 0, got {}", self.fare_price));
        }
        if let Some(p) = self.price {
            if !(p.is_finite() && p >= 0.0) {
                return Some(format!("price must be >= 0, got {p}"));
            }
        }
        for (name, split) in [
            ("driver_split", self.driver_split),
            ("association_split", self.association_split),
        ] {
            if let Some(s) = split {
                if !(0.0..=100.0).contains(&s) {
                    return Some(format!("{name} must be within 0..=100, got {s}"));
                }
            }
        }
        None
    }
}

// ── Association ───────────────────────────────────────────────────────────────

/// A taxi association.  Only its name is relevant to the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub id:      AssociationId,
    pub name:    String,
    #[serde(default)]
    pub version: u64,
}
