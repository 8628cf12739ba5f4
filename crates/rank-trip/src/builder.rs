//! Turning a rank path (or an explicit route chain) into trip legs.
//!
//! Leg `i + 1` covers the hop `path[i] → path[i + 1]`.  When several route
//! edges connect the same pair, [`select_edge`] applies the configured
//! [`ParallelRoutePolicy`].  Aggregates are sums over the chosen edges taken
//! in leg order, so a later [`recompute_aggregates`] over unchanged routes
//! reproduces them exactly.

use std::collections::HashMap;

use rank_core::{Leg, ParallelRoutePolicy, RankId, Route, RouteId, Trip, TripId};
use rank_graph::{RankGraph, RankPath, RouteEdge};

use crate::{TripError, TripResult};

// ── TripPlan ──────────────────────────────────────────────────────────────────

/// Legs plus derived totals, ready to be stored as a [`Trip`].
#[derive(Clone, Debug, PartialEq)]
pub struct TripPlan {
    pub legs:          Vec<Leg>,
    pub full_distance: f64,
    pub price:         f64,
}

impl TripPlan {
    fn empty() -> Self {
        Self { legs: Vec::new(), full_distance: 0.0, price: 0.0 }
    }

    fn push(&mut self, route: RouteId, distance: f64, price: f64, driver_split: f64, association_split: f64) {
        self.full_distance += distance;
        self.price += price;
        self.legs.push(Leg {
            leg:               self.legs.len() as u32 + 1,
            association_split,
            driver_split,
            details:           Some(route),
            driver:            None,
        });
    }

    pub fn into_trip(self, id: TripId, origin: RankId, destination: RankId) -> Trip {
        Trip::new(id, origin, destination, self.legs, self.full_distance, self.price)
    }
}

/// Recomputed trip totals.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aggregates {
    pub full_distance: f64,
    pub price:         f64,
}

// ── Edge selection ────────────────────────────────────────────────────────────

/// The edge used for the hop `from → to`, or `None` if there is none.
///
/// Candidates arrive in ascending `RouteId` order and `min_by` keeps the
/// first of equal minima, so every policy falls back to the lowest id.
pub fn select_edge(
    graph:  &RankGraph,
    from:   RankId,
    to:     RankId,
    policy: ParallelRoutePolicy,
) -> Option<&RouteEdge> {
    let mut candidates = graph.edges_between(from, to);
    match policy {
        ParallelRoutePolicy::FirstById        => candidates.next(),
        ParallelRoutePolicy::LowestPrice      => candidates.min_by(|a, b| a.price.total_cmp(&b.price)),
        ParallelRoutePolicy::ShortestDistance => candidates.min_by(|a, b| a.distance.total_cmp(&b.distance)),
    }
}

// ── Building ──────────────────────────────────────────────────────────────────

/// Materialize legs for every hop of `path`.
///
/// A hop without an edge means the path did not come from `graph`; it is
/// reported as [`TripError::MissingRoute`] rather than producing a gap.
pub fn build_legs(
    path:   &RankPath,
    graph:  &RankGraph,
    policy: ParallelRoutePolicy,
) -> TripResult<TripPlan> {
    let mut plan = TripPlan::empty();
    plan.legs.reserve(path.hops());

    for (from, to) in path.hop_pairs() {
        let edge = select_edge(graph, from, to, policy).ok_or(TripError::MissingRoute { from, to })?;
        plan.push(edge.route, edge.distance, edge.price, edge.driver_split, edge.association_split);
    }

    tracing::debug!(hops = plan.legs.len(), policy = policy.as_str(), "legs built");
    Ok(plan)
}

/// Materialize legs from a caller-chosen route chain.
///
/// `routes` must depart from `origin`, each must depart where the previous
/// one arrived, and the last must arrive at `destination`.  An empty chain is
/// only valid when `origin == destination`.
pub fn plan_from_routes(origin: RankId, destination: RankId, routes: &[Route]) -> TripResult<TripPlan> {
    let mut plan = TripPlan::empty();
    let mut at = origin;

    for route in routes {
        if route.from_rank != at {
            return Err(TripError::BrokenChain {
                leg:      plan.legs.len() as u32 + 1,
                expected: at,
                found:    route.from_rank,
            });
        }
        plan.push(
            route.id,
            route.distance,
            route.price_or_zero(),
            route.driver_split_or_zero(),
            route.association_split_or_zero(),
        );
        at = route.to_rank;
    }

    if at != destination {
        return Err(TripError::WrongEndpoint { expected: destination, found: at });
    }
    Ok(plan)
}

/// Re-derive `full_distance` and `price` from the routes `trip` currently
/// references.  Legs without route details contribute nothing.
pub fn recompute_aggregates(trip: &Trip, routes: &HashMap<RouteId, Route>) -> TripResult<Aggregates> {
    let mut totals = Aggregates { full_distance: 0.0, price: 0.0 };
    for id in trip.legs().iter().filter_map(|l| l.details) {
        let route = routes.get(&id).ok_or(TripError::UnknownRoute(id))?;
        totals.full_distance += route.distance;
        totals.price += route.price_or_zero();
    }
    Ok(totals)
}
