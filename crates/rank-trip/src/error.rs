use rank_core::{DriverId, ParcelStatus, RankId, RouteId};
use thiserror::Error;

/// Rule violations detected by the pure trip, leg and parcel logic.
///
/// None of these involve the store: the dispatcher resolves documents first
/// and reports missing ones with its own not-found variants.
#[derive(Debug, Error, PartialEq)]
pub enum TripError {
    #[error("no route edge from {from} to {to} on the computed path")]
    MissingRoute { from: RankId, to: RankId },

    #[error("{0} does not exist")]
    UnknownRoute(RouteId),

    #[error("route chain is broken at leg {leg}: expected departure from {expected}, got {found}")]
    BrokenChain { leg: u32, expected: RankId, found: RankId },

    #[error("route chain ends at {found}, expected {expected}")]
    WrongEndpoint { expected: RankId, found: RankId },

    #[error("leg number {leg} is out of range for a trip with {len} legs")]
    InvalidLegNumber { leg: u32, len: usize },

    #[error("leg {leg} has no route details")]
    LegHasNoRouteDetails { leg: u32 },

    #[error("{driver} is not linked to departure rank {rank}")]
    DriverNotEligible { driver: DriverId, rank: RankId },

    #[error("leg index {0} is negative")]
    NegativeLegIndex(i64),

    #[error("leg index {index} is out of range for a trip with {len} legs")]
    InvalidLegIndex { index: i64, len: usize },

    #[error("no trip given and the parcel is not bound to one")]
    MissingTripContext,

    #[error("parcel status cannot move from {from} to {to}")]
    InvalidStatusTransition { from: ParcelStatus, to: ParcelStatus },

    #[error("one-time PIN does not match")]
    InvalidOtp,
}

pub type TripResult<T> = Result<T, TripError>;
