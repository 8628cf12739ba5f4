//! Read-side projections of a trip.

use serde::Serialize;

use rank_core::{Association, Driver, Rank, Route, Trip};

/// How much of a trip's reference graph [`get_trip`](crate::Dispatcher::get_trip) resolves.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Population {
    /// The trip document only.
    #[default]
    Shallow,
    /// Ranks, routes, drivers and associations behind every reference.
    Deep,
}

/// A trip as returned to readers.  `details` is `Some` for
/// [`Population::Deep`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripView {
    pub trip:    Trip,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<TripDetails>,
}

/// Resolved references.  A reference whose document is gone is `None`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripDetails {
    pub origin:      Option<Rank>,
    pub destination: Option<Rank>,
    /// One entry per leg, in leg order.
    pub legs:        Vec<LegDetails>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegDetails {
    pub leg:         u32,
    pub route:       Option<Route>,
    pub from_rank:   Option<Rank>,
    pub to_rank:     Option<Rank>,
    pub driver:      Option<Driver>,
    /// The driver's association.
    pub association: Option<Association>,
}
