//! SQLite-backed implementation of [`EntityStore`] (feature `sqlite`).
//!
//! Each document is one row of the `documents` table holding its JSON body,
//! version and optional unique key.  Uses a single `Mutex<Connection>` for
//! thread safety; the `UNIQUE` index on `(collection, unique_key)` also holds
//! across processes sharing the file.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, ffi};

use crate::{Document, EntityStore, StoreError, StoreResult};

/// Idempotent DDL.
const CREATE_TABLES: &str = r"
PRAGMA journal_mode = WAL;
PRAGMA synchronous  = NORMAL;

CREATE TABLE IF NOT EXISTS documents (
    collection TEXT    NOT NULL,
    id         INTEGER NOT NULL,
    version    INTEGER NOT NULL,
    body       TEXT    NOT NULL,
    unique_key TEXT,
    PRIMARY KEY (collection, id)
);

CREATE UNIQUE INDEX IF NOT EXISTS documents_unique_key
    ON documents (collection, unique_key) WHERE unique_key IS NOT NULL;

CREATE TABLE IF NOT EXISTS sequences (
    collection TEXT    PRIMARY KEY,
    next_id    INTEGER NOT NULL
);
";

/// Persistent entity store in a single SQLite file.
///
/// Create with [`SqliteStore::open`] for a file-backed database or
/// [`SqliteStore::in_memory`] for tests.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(CREATE_TABLES)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// A private in-memory database.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLES)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock_conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

/// Map a constraint failure on `documents` to the matching store error.
fn constraint_error<D: Document>(e: rusqlite::Error, id: u64, key: Option<&str>) -> StoreError {
    let extended = match &e {
        rusqlite::Error::SqliteFailure(f, _) => Some(f.extended_code),
        _ => None,
    };
    match (extended, key) {
        (Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY), _) => {
            StoreError::Duplicate { collection: D::COLLECTION, id }
        }
        (Some(ffi::SQLITE_CONSTRAINT_UNIQUE), Some(k)) => {
            StoreError::DuplicateKey { collection: D::COLLECTION, key: k.to_owned() }
        }
        _ => e.into(),
    }
}

impl EntityStore for SqliteStore {
    fn next_id<D: Document>(&self) -> StoreResult<D::Id> {
        let conn = self.lock_conn()?;
        let tx = conn.unchecked_transaction()?;
        let next: i64 = tx
            .query_row(
                "SELECT next_id FROM sequences WHERE collection = ?1",
                [D::COLLECTION.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(1);
        tx.execute(
            "INSERT INTO sequences (collection, next_id) VALUES (?1, ?2) \
             ON CONFLICT(collection) DO UPDATE SET next_id = excluded.next_id",
            rusqlite::params![D::COLLECTION.as_str(), next + 1],
        )?;
        tx.commit()?;
        Ok(D::Id::from(next as u64))
    }

    fn get<D: Document>(&self, id: D::Id) -> StoreResult<Option<D>> {
        let key: u64 = id.into();
        let conn = self.lock_conn()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                rusqlite::params![D::COLLECTION.as_str(), key as i64],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|b| serde_json::from_str(&b).map_err(StoreError::from))
            .transpose()
    }

    fn list<D: Document>(&self) -> StoreResult<Vec<D>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT body FROM documents WHERE collection = ?1 ORDER BY id",
        )?;
        let bodies = stmt
            .query_map([D::COLLECTION.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        bodies
            .iter()
            .map(|b| serde_json::from_str(b).map_err(StoreError::from))
            .collect()
    }

    fn insert<D: Document>(&self, doc: &D) -> StoreResult<()> {
        let key: u64 = doc.id().into();
        let mut fresh = doc.clone();
        fresh.set_version(0);
        let body = serde_json::to_string(&fresh)?;

        let unique = doc.unique_key();

        let conn = self.lock_conn()?;
        let tx = conn.unchecked_transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM documents WHERE collection = ?1 AND id = ?2)",
            rusqlite::params![D::COLLECTION.as_str(), key as i64],
            |row| row.get(0),
        )?;
        if exists {
            return Err(StoreError::Duplicate { collection: D::COLLECTION, id: key });
        }
        tx.execute(
            "INSERT INTO documents (collection, id, version, body, unique_key) \
             VALUES (?1, ?2, 0, ?3, ?4)",
            rusqlite::params![D::COLLECTION.as_str(), key as i64, body, unique],
        )
        .map_err(|e| constraint_error::<D>(e, key, unique))?;
        tx.execute(
            "INSERT INTO sequences (collection, next_id) VALUES (?1, ?2) \
             ON CONFLICT(collection) DO UPDATE SET next_id = MAX(next_id, excluded.next_id)",
            rusqlite::params![D::COLLECTION.as_str(), key as i64 + 1],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn update<D: Document>(&self, doc: &mut D) -> StoreResult<bool> {
        let key: u64 = doc.id().into();
        let expected = doc.version();

        doc.set_version(expected + 1);
        let body = match serde_json::to_string(&*doc) {
            Ok(b) => b,
            Err(e) => {
                doc.set_version(expected);
                return Err(e.into());
            }
        };

        let unique = doc.unique_key().map(str::to_owned);

        let conn = self.lock_conn()?;
        let updated = conn.execute(
            "UPDATE documents SET body = ?1, version = ?2, unique_key = ?3 \
             WHERE collection = ?4 AND id = ?5 AND version = ?6",
            rusqlite::params![
                body,
                (expected + 1) as i64,
                unique,
                D::COLLECTION.as_str(),
                key as i64,
                expected as i64,
            ],
        );
        match updated {
            Ok(0) => {
                tracing::debug!(collection = D::COLLECTION.as_str(), id = key, expected, "stale update refused");
                doc.set_version(expected);
                Ok(false)
            }
            Ok(_) => Ok(true),
            Err(e) => {
                doc.set_version(expected);
                Err(constraint_error::<D>(e, key, unique.as_deref()))
            }
        }
    }

    fn delete<D: Document>(&self, id: D::Id) -> StoreResult<bool> {
        let key: u64 = id.into();
        let conn = self.lock_conn()?;
        let removed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            rusqlite::params![D::COLLECTION.as_str(), key as i64],
        )?;
        Ok(removed > 0)
    }
}
