//! Strongly typed, zero-cost identifier wrappers.
//!
//! Every entity collection gets its own ID type so a `DriverId` can never be
//! passed where a `RankId` is expected.  IDs are allocated by the entity store
//! in ascending order per collection, which makes ascending-ID order equal to
//! insertion order.  The rank graph relies on that to order edges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a typed ID wrapper around a `u64` store key.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(Serialize, Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub u64);

        impl $name {
            /// The raw store key.
            #[inline(always)]
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for u64 {
            #[inline(always)]
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl From<u64> for $name {
            #[inline(always)]
            fn from(raw: u64) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// A taxi rank: a node of the route graph.
    pub struct RankId;
}

typed_id! {
    /// A directed, priced route edge between two ranks.
    pub struct RouteId;
}

typed_id! {
    /// A materialized multi-leg trip.
    pub struct TripId;
}

typed_id! {
    /// A registered driver.
    pub struct DriverId;
}

typed_id! {
    /// A parcel riding along trip legs.
    pub struct ParcelId;
}

typed_id! {
    /// A taxi association operating at one or more ranks.
    pub struct AssociationId;
}

typed_id! {
    /// A package type (envelope, box, …) from the package-type catalogue.
    pub struct PackageTypeId;
}

typed_id! {
    /// Banking details record held outside the core.
    pub struct BankingId;
}
