//! CSV seed loader for ranks and routes.
//!
//! # CSV formats
//!
//! Ranks (`lat`/`lon` may be empty):
//!
//! ```csv
//! id,name,address,lat,lon
//! 1,Bree Street,Bree St & Strand St,-33.9190,18.4180
//! 2,Bellville,Bellville Station,,
//! ```
//!
//! Routes (`price` and both splits may be empty; absent means `0` at trip
//! building time):
//!
//! ```csv
//! id,from,to,distance,fare_price,price,driver_split,association_split
//! 1,1,2,22.5,18,35,70,30
//! 2,2,1,22.5,18,,,
//! ```
//!
//! Ids are kept as given, so route ids (and therefore path-finding
//! tie-breaks) are stable across reloads.  Route rows must reference ranks
//! already present in the store.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use rank_core::{GeoPoint, Rank, RankId, Route, RouteId, RouteSpec};

use crate::{EntityStore, StoreError, StoreResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RankRecord {
    id:      u64,
    name:    String,
    address: String,
    lat:     Option<f32>,
    lon:     Option<f32>,
}

#[derive(Deserialize)]
struct RouteRecord {
    id:                u64,
    from:              u64,
    to:                u64,
    distance:          f64,
    fare_price:        f64,
    price:             Option<f64>,
    driver_split:      Option<f64>,
    association_split: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load ranks from a CSV file into `store`.  Returns the number inserted.
pub fn load_ranks_csv<S: EntityStore>(path: &Path, store: &S) -> StoreResult<usize> {
    let file = std::fs::File::open(path)?;
    load_ranks_reader(file, store)
}

/// Like [`load_ranks_csv`] but accepts any `Read` source.
pub fn load_ranks_reader<R: Read, S: EntityStore>(reader: R, store: &S) -> StoreResult<usize> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut count = 0;

    for result in csv_reader.deserialize::<RankRecord>() {
        let row = result.map_err(|e| StoreError::Parse(e.to_string()))?;
        let position = match (row.lat, row.lon) {
            (Some(lat), Some(lon)) => Some(parse_position(row.id, lat, lon)?),
            (None, None)           => None,
            _ => {
                return Err(StoreError::Parse(format!(
                    "rank {}: lat and lon must both be set or both be empty",
                    row.id
                )))
            }
        };
        if row.name.trim().is_empty() {
            return Err(StoreError::Parse(format!("rank {}: name is empty", row.id)));
        }
        store.insert(&Rank {
            id:           RankId(row.id),
            name:         row.name,
            address:      row.address,
            position,
            associations: BTreeSet::new(),
            version:      0,
        })?;
        count += 1;
    }

    tracing::info!(count, "ranks loaded");
    Ok(count)
}

/// Load routes from a CSV file into `store`.  Returns the number inserted.
pub fn load_routes_csv<S: EntityStore>(path: &Path, store: &S) -> StoreResult<usize> {
    let file = std::fs::File::open(path)?;
    load_routes_reader(file, store)
}

/// Like [`load_routes_csv`] but accepts any `Read` source.
pub fn load_routes_reader<R: Read, S: EntityStore>(reader: R, store: &S) -> StoreResult<usize> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut count = 0;

    for result in csv_reader.deserialize::<RouteRecord>() {
        let row = result.map_err(|e| StoreError::Parse(e.to_string()))?;
        let (from, to) = (RankId(row.from), RankId(row.to));
        if from == to {
            return Err(StoreError::Parse(format!("route {}: from and to are the same rank", row.id)));
        }
        for rank in [from, to] {
            if store.get::<Rank>(rank)?.is_none() {
                return Err(StoreError::Parse(format!("route {}: unknown rank {rank}", row.id)));
            }
        }

        let spec = RouteSpec {
            distance:          row.distance,
            fare_price:        row.fare_price,
            price:             row.price,
            driver_split:      row.driver_split,
            association_split: row.association_split,
        };
        if let Some(problem) = spec.problem() {
            return Err(StoreError::Parse(format!("route {}: {problem}", row.id)));
        }

        store.insert(&Route::from_spec(RouteId(row.id), from, to, &spec))?;
        count += 1;
    }

    tracing::info!(count, "routes loaded");
    Ok(count)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_position(rank: u64, lat: f32, lon: f32) -> StoreResult<GeoPoint> {
    let p = GeoPoint::new(lat, lon);
    if p.is_valid() {
        Ok(p)
    } else {
        Err(StoreError::Parse(format!("rank {rank}: invalid position {p}")))
    }
}
