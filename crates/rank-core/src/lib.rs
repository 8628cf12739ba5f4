//! `rank-core` — foundational types for the taxi-rank logistics core.
//!
//! This crate is a dependency of every other `rank-*` crate.  It has no
//! `rank-*` dependencies and only `rand`, `serde` and `thiserror` externally.
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `RankId`, `RouteId`, `TripId`, `DriverId`, `ParcelId`, …  |
//! | [`geo`]     | `GeoPoint`, WGS-84 bounds check                           |
//! | [`rank`]    | `Rank`, `Route`, `RouteSpec`, `Association`               |
//! | [`trip`]    | `Trip`, `Leg`                                             |
//! | [`parcel`]  | `Parcel`, `ParcelStatus`, `LegBinding`, `NewParcel`       |
//! | [`driver`]  | `Driver`, `NewDriver`                                     |
//! | [`config`]  | `DispatchConfig`, `ParallelRoutePolicy`                   |
//! | [`codes`]   | `CodeGenerator` (tracking numbers, OTPs)                  |
//! | [`error`]   | `CoreError`, `CoreResult`                                 |

pub mod codes;
pub mod config;
pub mod driver;
pub mod error;
pub mod geo;
pub mod ids;
pub mod parcel;
pub mod rank;
pub mod trip;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use codes::CodeGenerator;
pub use config::{DispatchConfig, ParallelRoutePolicy};
pub use driver::{Driver, NewDriver};
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{AssociationId, BankingId, DriverId, PackageTypeId, ParcelId, RankId, RouteId, TripId};
pub use parcel::{Contact, LegBinding, NewParcel, PackageRef, Parcel, ParcelStatus};
pub use rank::{Association, NewRank, Rank, Route, RouteSpec};
pub use trip::{Leg, Trip};
