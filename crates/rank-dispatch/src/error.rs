//! Request-boundary error type.
//!
//! Fine-grained variants stay matchable (`TripNotFound`,
//! `Trip(TripError::DriverNotEligible { .. })`, …) while
//! [`DispatchError::kind`] gives callers the coarse taxonomy they map to
//! their own responses.

use std::fmt;

use rank_core::{AssociationId, CoreError, DriverId, ParcelId, RankId, RouteId, TripId};
use rank_graph::GraphError;
use rank_store::{Collection, StoreError};
use rank_trip::TripError;
use thiserror::Error;

// ── ErrorKind ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ErrorKind {
    NotFound,
    Unreachable,
    InvalidLegIndex,
    InvalidLegNumber,
    IneligibleDriver,
    MissingTripContext,
    Validation,
    Conflict,
    Store,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound           => "not-found",
            ErrorKind::Unreachable        => "unreachable",
            ErrorKind::InvalidLegIndex    => "invalid-leg-index",
            ErrorKind::InvalidLegNumber   => "invalid-leg-number",
            ErrorKind::IneligibleDriver   => "ineligible-driver",
            ErrorKind::MissingTripContext => "missing-trip-context",
            ErrorKind::Validation         => "validation",
            ErrorKind::Conflict           => "conflict",
            ErrorKind::Store              => "store",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DispatchError ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("{0} not found")]
    TripNotFound(TripId),

    #[error("{0} not found")]
    RankNotFound(RankId),

    #[error("{0} not found")]
    RouteNotFound(RouteId),

    #[error("{0} not found")]
    DriverNotFound(DriverId),

    #[error("{0} not found")]
    ParcelNotFound(ParcelId),

    #[error("{0} not found")]
    AssociationNotFound(AssociationId),

    #[error("no parcel with tracking number {0:?}")]
    TrackingNumberNotFound(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Trip(#[from] TripError),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{collection} document {id} was changed by another request")]
    Conflict { collection: Collection, id: u64 },

    /// The store refused every generated tracking number as taken.
    #[error("no unused tracking number after {0} attempts")]
    TrackingNumberExhausted(u32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Config(_) | DispatchError::Validation(_) => ErrorKind::Validation,

            DispatchError::TripNotFound(_)
            | DispatchError::RankNotFound(_)
            | DispatchError::RouteNotFound(_)
            | DispatchError::DriverNotFound(_)
            | DispatchError::ParcelNotFound(_)
            | DispatchError::AssociationNotFound(_)
            | DispatchError::TrackingNumberNotFound(_) => ErrorKind::NotFound,

            DispatchError::Graph(GraphError::Unreachable { .. }) => ErrorKind::Unreachable,

            DispatchError::Trip(e) => match e {
                TripError::MissingRoute { .. }           => ErrorKind::Unreachable,
                TripError::UnknownRoute(_)               => ErrorKind::NotFound,
                TripError::InvalidLegNumber { .. }       => ErrorKind::InvalidLegNumber,
                TripError::DriverNotEligible { .. }      => ErrorKind::IneligibleDriver,
                TripError::InvalidLegIndex { .. }
                | TripError::NegativeLegIndex(_)         => ErrorKind::InvalidLegIndex,
                TripError::MissingTripContext            => ErrorKind::MissingTripContext,
                TripError::BrokenChain { .. }
                | TripError::WrongEndpoint { .. }
                | TripError::LegHasNoRouteDetails { .. }
                | TripError::InvalidStatusTransition { .. }
                | TripError::InvalidOtp                  => ErrorKind::Validation,
            },

            DispatchError::Conflict { .. } => ErrorKind::Conflict,

            DispatchError::TrackingNumberExhausted(_) | DispatchError::Store(_) => ErrorKind::Store,
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
