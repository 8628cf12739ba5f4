//! The `Document` trait tying each entity type to its collection.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use rank_core::{
    Association, AssociationId, Driver, DriverId, Parcel, ParcelId, Rank, RankId, Route, RouteId,
    Trip, TripId,
};

// ── Collection ────────────────────────────────────────────────────────────────

/// Name of an entity collection.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Collection {
    Ranks,
    Routes,
    Trips,
    Drivers,
    Parcels,
    Associations,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Ranks        => "ranks",
            Collection::Routes       => "routes",
            Collection::Trips        => "trips",
            Collection::Drivers      => "drivers",
            Collection::Parcels      => "parcels",
            Collection::Associations => "associations",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Document ──────────────────────────────────────────────────────────────────

/// An entity persisted in an [`EntityStore`](crate::EntityStore).
///
/// `version` is owned by the store: it is `0` on insert and incremented by
/// every successful [`update`](crate::EntityStore::update).
pub trait Document: Serialize + DeserializeOwned + Clone + Send + 'static {
    type Id: Copy + Into<u64> + From<u64> + fmt::Display + Send;

    const COLLECTION: Collection;

    fn id(&self) -> Self::Id;
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);

    /// A value no other document of the collection may hold.  Stores refuse
    /// an insert or update that would share it with
    /// [`StoreError::DuplicateKey`](crate::StoreError::DuplicateKey).
    fn unique_key(&self) -> Option<&str> {
        None
    }
}

/// Implement `Document` for an entity whose `id`/`version` are public fields,
/// optionally naming a `String` field as its unique key.
macro_rules! field_document {
    ($ty:ty, $id:ty, $collection:expr $(, unique = $key:ident)?) => {
        impl Document for $ty {
            type Id = $id;
            const COLLECTION: Collection = $collection;

            #[inline]
            fn id(&self) -> $id {
                self.id
            }

            #[inline]
            fn version(&self) -> u64 {
                self.version
            }

            #[inline]
            fn set_version(&mut self, version: u64) {
                self.version = version;
            }

            $(
                #[inline]
                fn unique_key(&self) -> Option<&str> {
                    Some(self.$key.as_str())
                }
            )?
        }
    };
}

field_document!(Rank, RankId, Collection::Ranks);
field_document!(Route, RouteId, Collection::Routes);
field_document!(Driver, DriverId, Collection::Drivers);
field_document!(Parcel, ParcelId, Collection::Parcels, unique = tracking_number);
field_document!(Association, AssociationId, Collection::Associations);

impl Document for Trip {
    type Id = TripId;
    const COLLECTION: Collection = Collection::Trips;

    #[inline]
    fn id(&self) -> TripId {
        Trip::id(self)
    }

    #[inline]
    fn version(&self) -> u64 {
        Trip::version(self)
    }

    #[inline]
    fn set_version(&mut self, version: u64) {
        Trip::set_version(self, version);
    }
}
