//! Driver-to-leg assignment rules.
//!
//! A driver may take a leg only if they are linked to the rank the leg's
//! route departs from.  These functions check the rules in the order the
//! dispatcher reports them; store lookups (trip, route, driver existence)
//! happen in between, in the dispatcher.

use rank_core::{Driver, Leg, Route, RouteId, Trip};

use crate::{TripError, TripResult};

/// The leg numbered `leg_number` (1-based).
pub fn leg_by_number(trip: &Trip, leg_number: u32) -> TripResult<&Leg> {
    trip.leg(leg_number).ok_or(TripError::InvalidLegNumber { leg: leg_number, len: trip.leg_count() })
}

/// The route a leg traverses.
pub fn leg_route(leg: &Leg) -> TripResult<RouteId> {
    leg.details.ok_or(TripError::LegHasNoRouteDetails { leg: leg.leg })
}

/// `driver` must be linked to `route`'s departure rank.
pub fn check_eligibility(driver: &Driver, route: &Route) -> TripResult<()> {
    if driver.is_linked_to(route.from_rank) {
        Ok(())
    } else {
        Err(TripError::DriverNotEligible { driver: driver.id, rank: route.from_rank })
    }
}

/// Put `driver` on leg `leg_number`.  Only that leg's driver changes.
pub fn assign_driver(trip: &mut Trip, leg_number: u32, driver: &Driver, route: &Route) -> TripResult<()> {
    leg_by_number(trip, leg_number)?;
    check_eligibility(driver, route)?;
    trip.set_leg_driver(leg_number, Some(driver.id));
    Ok(())
}

/// Clear the driver of leg `leg_number`.  No eligibility check.
pub fn clear_driver(trip: &mut Trip, leg_number: u32) -> TripResult<()> {
    if trip.set_leg_driver(leg_number, None) {
        Ok(())
    } else {
        Err(TripError::InvalidLegNumber { leg: leg_number, len: trip.leg_count() })
    }
}
