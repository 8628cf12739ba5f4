//! `rank-store` — entity persistence for the taxi-rank logistics core.
//!
//! Two backends implement [`EntityStore`]:
//!
//! | Feature   | Backend        | Storage                                 |
//! |-----------|----------------|-----------------------------------------|
//! | *(none)*  | `MemoryStore`  | process memory, one `Mutex`             |
//! | `sqlite`  | `SqliteStore`  | one SQLite file (`documents` table)     |
//!
//! Every document carries a version and [`EntityStore::update`] is a
//! compare-and-set on it.  [`loader`] seeds ranks and routes from CSV.
//!
//! # Usage
//!
//! ```rust
//! use rank_core::{NewRank, Rank, RankId};
//! use rank_store::{EntityStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let id: RankId = store.next_id::<Rank>().unwrap();
//! store.insert(&Rank::from_new(id, NewRank { name: "Noord".into(), ..Default::default() })).unwrap();
//! assert_eq!(store.get::<Rank>(id).unwrap().unwrap().name, "Noord");
//! ```

pub mod document;
pub mod error;
pub mod loader;
pub mod memory;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use document::{Collection, Document};
pub use error::{StoreError, StoreResult};
pub use loader::{load_ranks_csv, load_ranks_reader, load_routes_csv, load_routes_reader};
pub use memory::MemoryStore;
pub use store::EntityStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
