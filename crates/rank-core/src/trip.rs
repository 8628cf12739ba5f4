//! Trips and their embedded legs.
//!
//! # Immutability
//!
//! A trip's origin, destination and leg sequence are fixed at construction.
//! The fields are private and the only mutators are
//! [`Trip::set_leg_driver`] (driver link/unlink) and
//! [`Trip::set_aggregates`] (explicit aggregate recomputation).  Leg numbers,
//! route references and splits cannot be changed through this API.

use serde::{Deserialize, Serialize};

use crate::{DriverId, RankId, RouteId, TripId};

// ── Leg ───────────────────────────────────────────────────────────────────────

/// One hop of a trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    /// 1-based position in the trip.
    pub leg:               u32,
    pub association_split: f64,
    pub driver_split:      f64,
    /// The route edge this leg traverses.
    pub details:           Option<RouteId>,
    #[serde(default)]
    pub driver:            Option<DriverId>,
}

// ── Trip ──────────────────────────────────────────────────────────────────────

/// A materialized journey from `origin` to `destination`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    id:            TripId,
    origin:        RankId,
    destination:   RankId,
    full_distance: f64,
    price:         f64,
    route:         Vec<Leg>,
    #[serde(default)]
    version:       u64,
}

impl Trip {
    /// Assemble a trip from already-validated legs.
    ///
    /// `legs` must be numbered `1..=N` in order; this is checked in debug
    /// builds only because the trip builder is the sole producer.
    pub fn new(
        id:            TripId,
        origin:        RankId,
        destination:   RankId,
        legs:          Vec<Leg>,
        full_distance: f64,
        price:         f64,
    ) -> Self {
        debug_assert!(legs.iter().enumerate().all(|(i, l)| l.leg as usize == i + 1));
        Self { id, origin, destination, full_distance, price, route: legs, version: 0 }
    }

    pub fn id(&self) -> TripId {
        self.id
    }

    pub fn origin(&self) -> RankId {
        self.origin
    }

    pub fn destination(&self) -> RankId {
        self.destination
    }

    pub fn full_distance(&self) -> f64 {
        self.full_distance
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// The ordered leg sequence.
    pub fn legs(&self) -> &[Leg] {
        &self.route
    }

    pub fn leg_count(&self) -> usize {
        self.route.len()
    }

    /// Leg by 1-based number.
    pub fn leg(&self, number: u32) -> Option<&Leg> {
        (number as usize).checked_sub(1).and_then(|i| self.route.get(i))
    }

    /// `true` for the zero-leg trip produced when origin equals destination.
    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    /// `true` if `index` is a valid 0-based index into the leg sequence.
    pub fn has_leg_index(&self, index: usize) -> bool {
        index < self.route.len()
    }

    /// Set or clear the driver of leg `number`.  Returns `false` (and changes
    /// nothing) when `number` is out of range.
    pub fn set_leg_driver(&mut self, number: u32, driver: Option<DriverId>) -> bool {
        match (number as usize).checked_sub(1).and_then(|i| self.route.get_mut(i)) {
            Some(leg) => {
                leg.driver = driver;
                true
            }
            None => false,
        }
    }

    /// Overwrite the derived aggregates.  Legs are untouched.
    pub fn set_aggregates(&mut self, full_distance: f64, price: f64) {
        self.full_distance = full_distance;
        self.price = price;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
