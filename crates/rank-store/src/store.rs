//! The `EntityStore` trait implemented by all storage backends.

use std::sync::Arc;

use crate::{Document, StoreResult};

/// Storage contract for entity documents.
///
/// # Concurrency
///
/// [`update`](Self::update) is a compare-and-set on the document version:
/// it applies only if the stored version still equals `doc.version()`, so a
/// read-modify-write that raced with another writer is refused rather than
/// silently overwriting it.  Nothing here retries.
///
/// Implementations must be `Send + Sync` so one store can serve concurrent
/// requests (share it behind an `Arc`).
pub trait EntityStore: Send + Sync {
    /// Allocate the next id of `D`'s collection.  Ids ascend from 1.
    fn next_id<D: Document>(&self) -> StoreResult<D::Id>;

    /// Fetch one document.  `Ok(None)` when it does not exist.
    fn get<D: Document>(&self, id: D::Id) -> StoreResult<Option<D>>;

    /// Every document of the collection in ascending id order.
    fn list<D: Document>(&self) -> StoreResult<Vec<D>>;

    /// Documents matching `filter`, ascending id order.
    fn find<D, F>(&self, filter: F) -> StoreResult<Vec<D>>
    where
        D: Document,
        F: Fn(&D) -> bool,
    {
        Ok(self.list::<D>()?.into_iter().filter(|d| filter(d)).collect())
    }

    /// Create `doc` at version 0.  Fails with
    /// [`StoreError::Duplicate`](crate::StoreError::Duplicate) if the id is
    /// taken and [`StoreError::DuplicateKey`](crate::StoreError::DuplicateKey)
    /// if its [`unique_key`](Document::unique_key) is.  Inserting an id beyond
    /// the sequence advances the sequence.
    fn insert<D: Document>(&self, doc: &D) -> StoreResult<()>;

    /// Compare-and-set replace.
    ///
    /// Returns `Ok(true)` and bumps `doc`'s version when the stored version
    /// matched; `Ok(false)` (and leaves `doc` untouched) when the stored
    /// document is newer or gone.  A unique key taken by another document is
    /// [`StoreError::DuplicateKey`](crate::StoreError::DuplicateKey).
    fn update<D: Document>(&self, doc: &mut D) -> StoreResult<bool>;

    /// Remove one document.  `Ok(false)` if it did not exist.
    fn delete<D: Document>(&self, id: D::Id) -> StoreResult<bool>;
}

impl<S: EntityStore> EntityStore for Arc<S> {
    fn next_id<D: Document>(&self) -> StoreResult<D::Id> {
        (**self).next_id::<D>()
    }

    fn get<D: Document>(&self, id: D::Id) -> StoreResult<Option<D>> {
        (**self).get::<D>(id)
    }

    fn list<D: Document>(&self) -> StoreResult<Vec<D>> {
        (**self).list::<D>()
    }

    fn insert<D: Document>(&self, doc: &D) -> StoreResult<()> {
        (**self).insert(doc)
    }

    fn update<D: Document>(&self, doc: &mut D) -> StoreResult<bool> {
        (**self).update(doc)
    }

    fn delete<D: Document>(&self, id: D::Id) -> StoreResult<bool> {
        (**self).delete::<D>(id)
    }
}
