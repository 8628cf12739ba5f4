//! `rank-dispatch` — request-level operations for the taxi-rank logistics core.
//!
//! # Request flow
//!
//! ```text
//! request ─► Dispatcher::op
//!   ① load : fetch the documents the operation touches (not found → NotFound)
//!   ② check: apply rank-trip rules (leg bounds, eligibility, status order)
//!   ③ write: insert, or compare-and-set update (lost race → Conflict)
//! ```
//!
//! Trip creation additionally projects all routes into a [`RankGraph`] and
//! runs the configured [`PathFinder`] before building legs.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                              |
//! |-----------|-----------------------------------------------------|
//! | `sqlite`  | Enables `rank_store::SqliteStore`.                  |
//! | `fx-hash` | FxHash for the graph's rank index map.              |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rank_dispatch::{DispatcherBuilder, Population};
//! use rank_graph::BfsPathFinder;
//! use rank_store::MemoryStore;
//!
//! let dispatcher = DispatcherBuilder::new(MemoryStore::new(), BfsPathFinder).build()?;
//! let trip = dispatcher.create_trip(origin, destination)?;
//! let view = dispatcher.get_trip(trip.id(), Population::Deep)?;
//! ```
//!
//! [`RankGraph`]: rank_graph::RankGraph
//! [`PathFinder`]: rank_graph::PathFinder

pub mod builder;
pub mod dispatcher;
pub mod error;
pub mod view;


pub use builder::DispatcherBuilder;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult, ErrorKind};
pub use view::{LegDetails, Population, TripDetails, TripView};
