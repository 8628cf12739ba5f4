//! In-memory implementation of [`EntityStore`].
//!
//! Documents are kept as JSON values so the in-memory backend has exactly the
//! same serialization behaviour as the SQLite one.  A single `Mutex` guards
//! all collections and their unique-key indexes; every operation holds it for
//! its whole duration.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::{Collection, Document, EntityStore, StoreError, StoreResult};

/// One stored document and its version.
struct Stored {
    version: u64,
    key:     Option<String>,
    body:    Value,
}

#[derive(Default)]
struct Inner {
    docs:      HashMap<Collection, BTreeMap<u64, Stored>>,
    /// Unique key → owning document id, per collection.
    keys:      HashMap<Collection, HashMap<String, u64>>,
    /// Next id to hand out per collection.
    sequences: HashMap<Collection, u64>,
}

/// `Err(DuplicateKey)` when `key` belongs to a document other than `id`.
fn check_key<D: Document>(index: Option<&HashMap<String, u64>>, key: Option<&str>, id: u64) -> StoreResult<()> {
    match key {
        Some(k) if index.and_then(|i| i.get(k)).is_some_and(|&owner| owner != id) => {
            Err(StoreError::DuplicateKey { collection: D::COLLECTION, key: k.to_owned() })
        }
        _ => Ok(()),
    }
}

/// Process-local entity store.  Cheap to create; use one per test.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Number of documents in `D`'s collection.
    pub fn count<D: Document>(&self) -> StoreResult<usize> {
        Ok(self.lock()?.docs.get(&D::COLLECTION).map_or(0, BTreeMap::len))
    }
}

impl EntityStore for MemoryStore {
    fn next_id<D: Document>(&self) -> StoreResult<D::Id> {
        let mut inner = self.lock()?;
        let seq = inner.sequences.entry(D::COLLECTION).or_insert(1);
        let id = *seq;
        *seq += 1;
        Ok(D::Id::from(id))
    }

    fn get<D: Document>(&self, id: D::Id) -> StoreResult<Option<D>> {
        let key: u64 = id.into();
        let inner = self.lock()?;
        inner
            .docs
            .get(&D::COLLECTION)
            .and_then(|c| c.get(&key))
            .map(|s| serde_json::from_value(s.body.clone()).map_err(StoreError::from))
            .transpose()
    }

    fn list<D: Document>(&self) -> StoreResult<Vec<D>> {
        let inner = self.lock()?;
        let Some(coll) = inner.docs.get(&D::COLLECTION) else {
            return Ok(Vec::new());
        };
        coll.values()
            .map(|s| serde_json::from_value(s.body.clone()).map_err(StoreError::from))
            .collect()
    }

    fn insert<D: Document>(&self, doc: &D) -> StoreResult<()> {
        let key: u64 = doc.id().into();
        let mut fresh = doc.clone();
        fresh.set_version(0);
        let body = serde_json::to_value(&fresh)?;

        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let coll = inner.docs.entry(D::COLLECTION).or_default();
        if coll.contains_key(&key) {
            return Err(StoreError::Duplicate { collection: D::COLLECTION, id: key });
        }
        let unique = doc.unique_key();
        check_key::<D>(inner.keys.get(&D::COLLECTION), unique, key)?;
        if let Some(k) = unique {
            inner.keys.entry(D::COLLECTION).or_default().insert(k.to_owned(), key);
        }
        coll.insert(key, Stored { version: 0, key: unique.map(str::to_owned), body });

        let seq = inner.sequences.entry(D::COLLECTION).or_insert(1);
        *seq = (*seq).max(key + 1);
        Ok(())
    }

    fn update<D: Document>(&self, doc: &mut D) -> StoreResult<bool> {
        let key: u64 = doc.id().into();
        let expected = doc.version();

        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let Some(stored) = inner.docs.get_mut(&D::COLLECTION).and_then(|c| c.get_mut(&key)) else {
            tracing::debug!(collection = D::COLLECTION.as_str(), id = key, "update of missing document refused");
            return Ok(false);
        };
        if stored.version != expected {
            tracing::debug!(
                collection = D::COLLECTION.as_str(),
                id = key,
                expected,
                stored = stored.version,
                "stale update refused"
            );
            return Ok(false);
        }
        let unique = doc.unique_key().map(str::to_owned);
        check_key::<D>(inner.keys.get(&D::COLLECTION), unique.as_deref(), key)?;

        doc.set_version(expected + 1);
        let body = match serde_json::to_value(&*doc) {
            Ok(body) => body,
            Err(e) => {
                doc.set_version(expected);
                return Err(e.into());
            }
        };

        if unique != stored.key {
            let index = inner.keys.entry(D::COLLECTION).or_default();
            if let Some(old) = stored.key.take() {
                index.remove(&old);
            }
            if let Some(k) = &unique {
                index.insert(k.clone(), key);
            }
            stored.key = unique;
        }
        stored.version = expected + 1;
        stored.body = body;
        Ok(true)
    }

    fn delete<D: Document>(&self, id: D::Id) -> StoreResult<bool> {
        let key: u64 = id.into();
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let Some(removed) = inner.docs.get_mut(&D::COLLECTION).and_then(|c| c.remove(&key)) else {
            return Ok(false);
        };
        if let (Some(k), Some(index)) = (removed.key, inner.keys.get_mut(&D::COLLECTION)) {
            index.remove(&k);
        }
        Ok(true)
    }
}
