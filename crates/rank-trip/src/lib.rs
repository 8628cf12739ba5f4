//! `rank-trip` — trip, leg and parcel rules with no storage behind them.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`builder`] | `build_legs`, `plan_from_routes`, `recompute_aggregates`        |
//! | [`assign`]  | leg lookup, driver eligibility, `assign_driver`/`clear_driver`  |
//! | [`parcel`]  | leg-index checks, `bind_parcel_leg`, status and OTP rules       |
//! | [`error`]   | `TripError`, `TripResult<T>`                                    |
//!
//! Everything here operates on already-loaded documents.  `rank-dispatch`
//! fetches them, calls into this crate, and writes the results back.

pub mod assign;
pub mod builder;
pub mod error;
pub mod parcel;


pub use assign::{assign_driver, check_eligibility, clear_driver, leg_by_number, leg_route};
pub use builder::{Aggregates, TripPlan, build_legs, plan_from_routes, recompute_aggregates, select_edge};
pub use error::{TripError, TripResult};
pub use parcel::{
    bind_parcel_leg, check_leg_index, check_leg_sign, check_status_transition, target_trip, verify_otp,
};
