//! Unit tests for rank-store.

use std::collections::BTreeSet;

use rank_core::{
    Contact, NewRank, PackageRef, PackageTypeId, Parcel, ParcelId, ParcelStatus, Rank, RankId, Route,
    RouteId, RouteSpec,
};

use crate::{EntityStore, StoreError};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn rank(id: u64, name: &str) -> Rank {
    Rank::from_new(RankId(id), NewRank { name: name.into(), ..Default::default() })
}

fn route(id: u64, from: u64, to: u64) -> Route {
    let spec = RouteSpec { distance: 10.0, fare_price: 15.0, ..Default::default() };
    Route::from_spec(RouteId(id), RankId(from), RankId(to), &spec)
}

fn parcel(id: u64, tracking_number: &str) -> Parcel {
    Parcel {
        id:              ParcelId(id),
        tracking_number: tracking_number.into(),
        otp:             "123456".into(),
        sender:          Contact { name: "Lerato".into(), ..Default::default() },
        receiver:        Contact { name: "Sipho".into(), ..Default::default() },
        package:         PackageRef { id: format!("PKG-{id}"), package_type: PackageTypeId(1) },
        binding:         None,
        status:          ParcelStatus::AwaitingPickup,
        version:         0,
    }
}

/// Tracking numbers are unique per collection on every backend.
fn exercise_unique_keys<S: EntityStore>(store: &S) {
    store.insert(&parcel(1, "TRK-A")).unwrap();
    assert!(matches!(
        store.insert(&parcel(2, "TRK-A")),
        Err(StoreError::DuplicateKey { ref key, .. }) if key == "TRK-A"
    ));
    assert!(store.get::<Parcel>(ParcelId(2)).unwrap().is_none(), "refused insert writes nothing");
    store.insert(&parcel(2, "TRK-B")).unwrap();

    // Updating onto a taken key is refused; keeping your own key is not.
    let mut second = store.get::<Parcel>(ParcelId(2)).unwrap().unwrap();
    second.tracking_number = "TRK-A".into();
    assert!(matches!(store.update(&mut second), Err(StoreError::DuplicateKey { .. })));
    assert_eq!(second.version, 0);
    second.tracking_number = "TRK-B".into();
    second.otp = "654321".into();
    assert!(store.update(&mut second).unwrap());

    // A changed key releases the old one; so does delete.
    second.tracking_number = "TRK-C".into();
    assert!(store.update(&mut second).unwrap());
    store.insert(&parcel(3, "TRK-B")).unwrap();
    assert!(store.delete::<Parcel>(ParcelId(1)).unwrap());
    store.insert(&parcel(4, "TRK-A")).unwrap();

    // Keys are per collection: other documents carry none.
    store.insert(&rank(50, "TRK-A")).unwrap();
}

/// Behaviour every backend must share.  Called once per backend.
fn exercise_contract<S: EntityStore>(store: &S) {
    // Sequences start at 1 and ascend.
    let a: RankId = store.next_id::<Rank>().unwrap();
    let b: RankId = store.next_id::<Rank>().unwrap();
    assert_eq!((a, b), (RankId(1), RankId(2)));

    store.insert(&rank(a.get(), "Noord")).unwrap();
    store.insert(&rank(b.get(), "Bellville")).unwrap();

    // Duplicate id is refused.
    assert!(matches!(
        store.insert(&rank(a.get(), "again")),
        Err(StoreError::Duplicate { id: 1, .. })
    ));

    // Compare-and-set.
    let mut first = store.get::<Rank>(a).unwrap().unwrap();
    let mut second = first.clone();
    assert_eq!(first.version, 0);
    first.name = "Noord Street".into();
    assert!(store.update(&mut first).unwrap());
    assert_eq!(first.version, 1);
    second.name = "lost write".into();
    assert!(!store.update(&mut second).unwrap());
    assert_eq!(second.version, 0, "refused update leaves the version alone");
    assert_eq!(store.get::<Rank>(a).unwrap().unwrap().name, "Noord Street");

    // Collections are independent.
    store.insert(&route(1, 1, 2)).unwrap();
    assert_eq!(store.list::<Route>().unwrap().len(), 1);
    assert_eq!(store.list::<Rank>().unwrap().len(), 2);

    // Delete.
    assert!(store.delete::<Rank>(b).unwrap());
    assert!(!store.delete::<Rank>(b).unwrap());
    assert!(store.get::<Rank>(b).unwrap().is_none());

    let mut gone = rank(b.get(), "ghost");
    assert!(!store.update(&mut gone).unwrap(), "update of a deleted document is refused");
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod memory {
    use std::sync::Arc;

    use super::*;
    use crate::MemoryStore;

    #[test]
    fn contract() {
        exercise_contract(&MemoryStore::new());
    }

    #[test]
    fn unique_keys() {
        exercise_unique_keys(&MemoryStore::new());
    }

    #[test]
    fn missing_document_is_none() {
        let store = MemoryStore::new();
        assert!(store.get::<Rank>(RankId(5)).unwrap().is_none());
        assert!(store.list::<Rank>().unwrap().is_empty());
    }

    #[test]
    fn list_is_ascending_by_id() {
        let store = MemoryStore::new();
        for id in [7, 2, 9, 4] {
            store.insert(&rank(id, "r")).unwrap();
        }
        let ids: Vec<u64> = store.list::<Rank>().unwrap().iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![2, 4, 7, 9]);
    }

    #[test]
    fn explicit_insert_advances_sequence() {
        let store = MemoryStore::new();
        store.insert(&rank(10, "seeded")).unwrap();
        assert_eq!(store.next_id::<Rank>().unwrap(), RankId(11));
        // Lower ids do not move the sequence back.
        store.insert(&rank(3, "low")).unwrap();
        assert_eq!(store.next_id::<Rank>().unwrap(), RankId(12));
    }

    #[test]
    fn insert_resets_version() {
        let store = MemoryStore::new();
        let mut r = rank(1, "r");
        r.version = 42;
        store.insert(&r).unwrap();
        assert_eq!(store.get::<Rank>(RankId(1)).unwrap().unwrap().version, 0);
    }

    #[test]
    fn find_filters() {
        let store = MemoryStore::new();
        store.insert(&route(1, 1, 2)).unwrap();
        store.insert(&route(2, 2, 3)).unwrap();
        store.insert(&route(3, 1, 3)).unwrap();
        let from_one = store.find::<Route, _>(|r| r.from_rank == RankId(1)).unwrap();
        let ids: Vec<RouteId> = from_one.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RouteId(1), RouteId(3)]);
    }

    #[test]
    fn count_per_collection() {
        let store = MemoryStore::new();
        store.insert(&rank(1, "a")).unwrap();
        store.insert(&route(1, 1, 1)).unwrap();
        store.insert(&route(2, 1, 1)).unwrap();
        assert_eq!(store.count::<Rank>().unwrap(), 1);
        assert_eq!(store.count::<Route>().unwrap(), 2);
    }

    #[test]
    fn arc_shares_state_across_threads() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..25).map(|_| s.next_id::<Rank>().unwrap()).collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<RankId> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 100, "ids are never handed out twice");
        assert_eq!(store.next_id::<Rank>().unwrap(), RankId(101));
    }

    #[test]
    fn concurrent_updates_exactly_one_wins() {
        let store = Arc::new(MemoryStore::new());
        store.insert(&rank(1, "start")).unwrap();
        let snapshot = store.get::<Rank>(RankId(1)).unwrap().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = Arc::clone(&store);
                let mut doc = snapshot.clone();
                std::thread::spawn(move || {
                    doc.name = format!("writer {i}");
                    s.update(&mut doc).unwrap()
                })
            })
            .collect();
        let wins = handles.into_iter().map(|h| h.join().unwrap()).filter(|w| *w).count();
        assert_eq!(wins, 1);
        assert_eq!(store.get::<Rank>(RankId(1)).unwrap().unwrap().version, 1);
    }

    #[test]
    fn associations_survive_roundtrip() {
        let store = MemoryStore::new();
        let mut r = rank(1, "r");
        r.associations = BTreeSet::from([rank_core::AssociationId(3)]);
        store.insert(&r).unwrap();
        let back = store.get::<Rank>(RankId(1)).unwrap().unwrap();
        assert!(back.associations.contains(&rank_core::AssociationId(3)));
    }
}

// ── SqliteStore ───────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite {
    use super::*;
    use crate::SqliteStore;

    #[test]
    fn contract() {
        exercise_contract(&SqliteStore::in_memory().unwrap());
    }

    #[test]
    fn unique_keys() {
        exercise_unique_keys(&SqliteStore::in_memory().unwrap());
    }

    #[test]
    fn unique_key_holds_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcels.db");
        let first = SqliteStore::open(&path).unwrap();
        let second = SqliteStore::open(&path).unwrap();

        first.insert(&parcel(1, "TRK-A")).unwrap();
        assert!(matches!(second.insert(&parcel(2, "TRK-A")), Err(StoreError::DuplicateKey { .. })));
        assert!(matches!(second.insert(&parcel(1, "TRK-Z")), Err(StoreError::Duplicate { id: 1, .. })));
        second.insert(&parcel(2, "TRK-B")).unwrap();
        assert_eq!(first.list::<Parcel>().unwrap().len(), 2);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ranks.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            let id: RankId = store.next_id::<Rank>().unwrap();
            store.insert(&rank(id.get(), "Noord")).unwrap();
            let mut r = store.get::<Rank>(id).unwrap().unwrap();
            r.address = "Noord St".into();
            assert!(store.update(&mut r).unwrap());
        }

        let store = SqliteStore::open(&path).unwrap();
        let r = store.get::<Rank>(RankId(1)).unwrap().unwrap();
        assert_eq!(r.address, "Noord St");
        assert_eq!(r.version, 1);
        assert_eq!(store.next_id::<Rank>().unwrap(), RankId(2), "sequence is persisted");
    }

    #[test]
    fn explicit_insert_advances_sequence() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert(&rank(10, "seeded")).unwrap();
        store.insert(&rank(3, "low")).unwrap();
        assert_eq!(store.next_id::<Rank>().unwrap(), RankId(11));
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Write;

    use super::*;
    use crate::{MemoryStore, StoreError, load_ranks_csv, load_ranks_reader, load_routes_reader};

    const RANKS: &str = "\
id,name,address,lat,lon
1,Bree Street,Bree St & Strand St,-33.9190,18.4180
2,Bellville,Bellville Station,,
3,Mitchells Plain,Town Centre,-34.0470,18.6180
";

    const ROUTES: &str = "\
id,from,to,distance,fare_price,price,driver_split,association_split
1,1,2,22.5,18,35,70,30
2,2,1,22.5,18,,,
3,2,3,19,16,30,60,40
";

    #[test]
    fn loads_ranks_and_routes() {
        let store = MemoryStore::new();
        assert_eq!(load_ranks_reader(RANKS.as_bytes(), &store).unwrap(), 3);
        assert_eq!(load_routes_reader(ROUTES.as_bytes(), &store).unwrap(), 3);

        let bellville = store.get::<Rank>(RankId(2)).unwrap().unwrap();
        assert!(bellville.position.is_none());
        let bree = store.get::<Rank>(RankId(1)).unwrap().unwrap();
        assert!(bree.position.is_some());

        let back = store.get::<Route>(RouteId(2)).unwrap().unwrap();
        assert_eq!(back.price, None);
        assert_eq!(back.price_or_zero(), 0.0);
        let out = store.get::<Route>(RouteId(1)).unwrap().unwrap();
        assert_eq!(out.driver_split, Some(70.0));
    }

    #[test]
    fn ids_are_kept() {
        let store = MemoryStore::new();
        load_ranks_reader(RANKS.as_bytes(), &store).unwrap();
        assert_eq!(store.next_id::<Rank>().unwrap(), RankId(4));
    }

    #[test]
    fn route_to_unknown_rank_rejected() {
        let store = MemoryStore::new();
        load_ranks_reader(RANKS.as_bytes(), &store).unwrap();
        let csv = "id,from,to,distance,fare_price,price,driver_split,association_split\n9,1,99,5,5,,,\n";
        assert!(matches!(load_routes_reader(csv.as_bytes(), &store), Err(StoreError::Parse(_))));
    }

    #[test]
    fn invalid_route_values_rejected() {
        let store = MemoryStore::new();
        load_ranks_reader(RANKS.as_bytes(), &store).unwrap();
        let zero_distance = "id,from,to,distance,fare_price,price,driver_split,association_split\n9,1,2,0,5,,,\n";
        assert!(matches!(load_routes_reader(zero_distance.as_bytes(), &store), Err(StoreError::Parse(_))));
        let bad_split = "id,from,to,distance,fare_price,price,driver_split,association_split\n9,1,2,4,5,,120,\n";
        assert!(matches!(load_routes_reader(bad_split.as_bytes(), &store), Err(StoreError::Parse(_))));
    }

    #[test]
    fn half_position_rejected() {
        let store = MemoryStore::new();
        let csv = "id,name,address,lat,lon\n1,A,Somewhere,-33.9,\n";
        assert!(matches!(load_ranks_reader(csv.as_bytes(), &store), Err(StoreError::Parse(_))));
    }

    #[test]
    fn malformed_row_is_parse_error() {
        let store = MemoryStore::new();
        let csv = "id,name,address,lat,lon\nnot-a-number,A,B,,\n";
        assert!(matches!(load_ranks_reader(csv.as_bytes(), &store), Err(StoreError::Parse(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RANKS.as_bytes()).unwrap();
        let store = MemoryStore::new();
        assert_eq!(load_ranks_csv(file.path(), &store).unwrap(), 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let store = MemoryStore::new();
        let err = load_ranks_csv(std::path::Path::new("/nonexistent/ranks.csv"), &store).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
