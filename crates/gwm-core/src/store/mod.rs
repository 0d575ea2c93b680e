//! Persistent provisioning state
//!
//! Backed by [redb](https://docs.rs/redb): one file, ACID transactions,
//! a single writer at a time and MVCC readers. redb also locks the file, so
//! a second process opening the same database fails instead of interleaving
//! writes.
//!
//! All access goes through [`StateStore::view`] (read-only snapshot) or
//! [`StateStore::update`] (read-write, committed only when the closure
//! returns `Ok`). Every lookup returns an `Option`: a missing entry is never
//! confused with an empty one.

mod namespace;
mod txn;

pub use namespace::{Namespace, NamespaceKind};
pub use txn::{StateReader, StateWriter};

use std::path::Path;
use std::sync::Arc;

use redb::{Database, TableDefinition};

use crate::error::StoreError;

type StringTable<'a> = TableDefinition<'a, &'static str, &'static str>;

/// Handle to the state database
///
/// Cheap to clone; clones share the same open database.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) the database at `path`
    ///
    /// The shared namespaces are created if they don't exist yet; opening
    /// an existing database leaves its contents untouched.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        tracing::debug!("Opening state database at {:?}", path);
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open a throwaway in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self, StoreError> {
        let txn = db.begin_write()?;
        for kind in NamespaceKind::SHARED {
            txn.open_table(StringTable::new(kind.as_str()))?;
        }
        txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Run `f` against a consistent read-only snapshot
    pub fn view<T, E>(&self, f: impl FnOnce(&StateReader) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let txn = self.db.begin_read().map_err(StoreError::from)?;
        let reader = StateReader::new(txn);
        f(&reader)
    }

    /// Run `f` inside a read-write transaction
    ///
    /// The transaction commits only if `f` returns `Ok`; on `Err` every
    /// mutation `f` made is discarded.
    pub fn update<T, E>(&self, f: impl FnOnce(&StateWriter<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let txn = self.db.begin_write().map_err(StoreError::from)?;
        let result = f(&StateWriter::new(&txn));
        match result {
            Ok(value) => {
                txn.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_err) = txn.abort() {
                    tracing::warn!("Failed to abort state transaction: {}", abort_err);
                }
                Err(e)
            }
        }
    }
}

impl StateStore {
    /// Raw key/value pairs of one namespace, ordered by key
    pub fn entries(&self, ns: &Namespace) -> Result<Vec<(String, String)>, StoreError> {
        self.view(|r| r.entries(ns))
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore").finish_non_exhaustive()
    }
}
