//! Parcel leg binding and lifecycle rules.

use rank_core::{LegBinding, Parcel, ParcelStatus, Trip, TripId};

use crate::{TripError, TripResult};

// ── Leg binding ───────────────────────────────────────────────────────────────

/// Reject a negative `leg_index` before any trip is consulted.
pub fn check_leg_sign(leg_index: i64) -> TripResult<usize> {
    usize::try_from(leg_index).map_err(|_| TripError::NegativeLegIndex(leg_index))
}

/// Validate a 0-based `leg_index` against `trip`.
pub fn check_leg_index(trip: &Trip, leg_index: i64) -> TripResult<usize> {
    Some(check_leg_sign(leg_index)?)
        .filter(|&i| trip.has_leg_index(i))
        .ok_or(TripError::InvalidLegIndex { index: leg_index, len: trip.leg_count() })
}

/// The trip a move targets: the requested one, else the parcel's current one.
pub fn target_trip(parcel: &Parcel, requested: Option<TripId>) -> TripResult<TripId> {
    requested.or(parcel.trip()).ok_or(TripError::MissingTripContext)
}

/// Bind `parcel` to leg `leg_index` of `trip`.  Only the binding changes;
/// no driver or adjacency rules apply.
pub fn bind_parcel_leg(parcel: &mut Parcel, trip: &Trip, leg_index: i64) -> TripResult<()> {
    let leg_index = check_leg_index(trip, leg_index)?;
    parcel.binding = Some(LegBinding { trip: trip.id(), leg_index });
    Ok(())
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// Check a client-requested status change.
///
/// Returns `Ok(false)` when `to` equals the current status (nothing to do).
/// `Received` is never accepted here: it is reached through [`verify_otp`].
pub fn check_status_transition(from: ParcelStatus, to: ParcelStatus) -> TripResult<bool> {
    if from == to {
        return Ok(false);
    }
    if to == ParcelStatus::Received || !from.precedes(to) {
        return Err(TripError::InvalidStatusTransition { from, to });
    }
    Ok(true)
}

/// Check the receiver's PIN.  The parcel must have been delivered.
pub fn verify_otp(parcel: &Parcel, otp: &str) -> TripResult<()> {
    if parcel.status != ParcelStatus::Delivered {
        return Err(TripError::InvalidStatusTransition { from: parcel.status, to: ParcelStatus::Received });
    }
    if !constant_time_eq(parcel.otp.as_bytes(), otp.as_bytes()) {
        return Err(TripError::InvalidOtp);
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
