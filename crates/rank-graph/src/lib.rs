//! `rank-graph` — route graph projection, path finding, and rank lookup.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RankGraph` (CSR over route edges), `RankGraphBuilder`      |
//! | [`path`]    | `PathFinder` trait, `RankPath`, `BfsPathFinder`             |
//! | [`locator`] | `RankLocator` (R-tree nearest-rank lookup)                  |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `fx-hash` | FxHash for the rank → node index map.                     |

pub mod error;
pub mod locator;
pub mod network;
pub mod path;


pub use error::{GraphError, GraphResult};
pub use locator::RankLocator;
pub use network::{RankGraph, RankGraphBuilder, RouteEdge};
pub use path::{BfsPathFinder, PathFinder, RankPath};
