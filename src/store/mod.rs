//! Persisted session storage
//!
//! Provides:
//! - `SessionStore` - the CRUD contract the registry talks to
//! - `SqliteSessionStore` - `sessions` table in a SQLite database
//! - `MemorySessionStore` - in-process store for tests and throwaway runs

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use crate::error::StoreError;
use crate::session::{SessionId, SessionRecord, SessionSummary};

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable CRUD for session records.
///
/// The owner calls [`SessionStore::close`] exactly once when it is done;
/// afterwards every operation fails with [`StoreError::Closed`].
/// Implementations must also finalize on drop so that buffered writes are
/// never lost when the owner unwinds without closing.
pub trait SessionStore {
    /// Create the backing table if it does not exist. Idempotent.
    fn ensure_schema(&mut self) -> StoreResult<()>;

    /// List `(id, name)` of every saved session in insertion order.
    ///
    /// Fails with [`StoreError::SchemaMissing`] if the table is absent.
    fn list_summaries(&self) -> StoreResult<Vec<SessionSummary>>;

    /// Fetch a full record; `None` if the id is unknown.
    fn fetch(&self, id: SessionId) -> StoreResult<Option<SessionRecord>>;

    /// Persist a new record and return its freshly assigned id.
    ///
    /// The record's own `id` is ignored. Creates the table when needed.
    fn insert(&mut self, record: &SessionRecord) -> StoreResult<SessionId>;

    /// Overwrite the record stored under `id`.
    ///
    /// Fails with [`StoreError::NotFound`] if `id` does not exist.
    fn update(&mut self, id: SessionId, record: &SessionRecord) -> StoreResult<()>;

    /// Remove the record stored under `id`, returning whether one existed.
    fn delete(&mut self, id: SessionId) -> StoreResult<bool>;

    /// Commit anything pending and release the store.
    fn close(&mut self) -> StoreResult<()>;
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn ensure_schema(&mut self) -> StoreResult<()> {
        (**self).ensure_schema()
    }

    fn list_summaries(&self) -> StoreResult<Vec<SessionSummary>> {
        (**self).list_summaries()
    }

    fn fetch(&self, id: SessionId) -> StoreResult<Option<SessionRecord>> {
        (**self).fetch(id)
    }

    fn insert(&mut self, record: &SessionRecord) -> StoreResult<SessionId> {
        (**self).insert(record)
    }

    fn update(&mut self, id: SessionId, record: &SessionRecord) -> StoreResult<()> {
        (**self).update(id, record)
    }

    fn delete(&mut self, id: SessionId) -> StoreResult<bool> {
        (**self).delete(id)
    }

    fn close(&mut self) -> StoreResult<()> {
        (**self).close()
    }
}
