//! In-process session store
//!
//! Nothing is written to disk. Mirrors the SQLite store's contract,
//! including the missing-schema state of a fresh database.

use std::collections::BTreeMap;

use super::{SessionStore, StoreResult};
use crate::error::StoreError;
use crate::session::{SessionId, SessionRecord, SessionSummary};

/// Session store held entirely in memory
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: BTreeMap<SessionId, SessionRecord>,
    last_id: i64,
    has_schema: bool,
    closed: bool,
    writes: usize,
}

impl MemorySessionStore {
    /// Create a store whose table does not exist yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with an empty table
    pub fn with_schema() -> Self {
        Self {
            has_schema: true,
            ..Self::default()
        }
    }

    /// Number of successful insert/update/delete operations
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check_open(&self) -> StoreResult<()> {
        if self.closed {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    fn require_schema(&self) -> StoreResult<()> {
        self.check_open()?;
        if self.has_schema {
            Ok(())
        } else {
            Err(StoreError::SchemaMissing)
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn ensure_schema(&mut self) -> StoreResult<()> {
        self.check_open()?;
        self.has_schema = true;
        Ok(())
    }

    fn list_summaries(&self) -> StoreResult<Vec<SessionSummary>> {
        self.require_schema()?;
        Ok(self
            .records
            .iter()
            .map(|(id, record)| SessionSummary {
                id: *id,
                name: record.name.clone(),
            })
            .collect())
    }

    fn fetch(&self, id: SessionId) -> StoreResult<Option<SessionRecord>> {
        self.require_schema()?;
        Ok(self.records.get(&id).cloned())
    }

    fn insert(&mut self, record: &SessionRecord) -> StoreResult<SessionId> {
        self.ensure_schema()?;

        self.last_id += 1;
        let id = SessionId::new(self.last_id);
        let mut stored = record.clone();
        stored.id = Some(id);
        self.records.insert(id, stored);
        self.writes += 1;
        Ok(id)
    }

    fn update(&mut self, id: SessionId, record: &SessionRecord) -> StoreResult<()> {
        self.require_schema()?;

        let slot = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *slot = SessionRecord {
            id: Some(id),
            ..record.clone()
        };
        self.writes += 1;
        Ok(())
    }

    fn delete(&mut self, id: SessionId) -> StoreResult<bool> {
        self.check_open()?;

        let removed = self.records.remove(&id).is_some();
        if removed {
            self.writes += 1;
        }
        Ok(removed)
    }

    fn close(&mut self) -> StoreResult<()> {
        self.check_open()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionDefaults;

    fn record(name: &str) -> SessionRecord {
        SessionRecord::new(name, &SessionDefaults::default())
    }

    #[test]
    fn test_fresh_store_has_no_schema() {
        let store = MemorySessionStore::new();
        assert!(matches!(
            store.list_summaries(),
            Err(StoreError::SchemaMissing)
        ));
    }

    #[test]
    fn test_ids_never_reused() {
        let mut store = MemorySessionStore::with_schema();
        let a = store.insert(&record("a")).unwrap();
        store.delete(a).unwrap();
        let b = store.insert(&record("b")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_update_keeps_identity() {
        let mut store = MemorySessionStore::with_schema();
        let id = store.insert(&record("a")).unwrap();

        let mut changed = record("renamed");
        changed.id = Some(SessionId::new(999));
        store.update(id, &changed).unwrap();

        let fetched = store.fetch(id).unwrap().unwrap();
        assert_eq!(fetched.id, Some(id));
        assert_eq!(fetched.name, "renamed");
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut store = MemorySessionStore::with_schema();
        assert!(matches!(
            store.update(SessionId::new(1), &record("x")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_closed_store_rejects_operations() {
        let mut store = MemorySessionStore::with_schema();
        store.close().unwrap();
        assert!(store.is_closed());
        assert!(matches!(store.insert(&record("x")), Err(StoreError::Closed)));
        assert!(matches!(store.close(), Err(StoreError::Closed)));
    }
}
