//! Session registry - coordinates the session list, edit buffer and store
//!
//! Handles selection, field edits with dirty tracking, insert-or-update
//! saves and deletion with index realignment. Every operation runs to
//! completion against the owned store before returning.

use tracing::{debug, error, info, instrument, warn};

use crate::error::{RegistryError, StoreError};
use crate::session::{
    is_dirty, strip_modified_marker, FieldEdit, ManagerOutcome, RegistryEntry, RegistryState,
    SessionDefaults, SessionId, SessionRecord,
};
use crate::store::SessionStore;

/// Result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Signals the registry sends to whatever displays it
///
/// Every method defaults to a no-op so a display only implements what it
/// renders.
pub trait RegistryObserver {
    /// No sessions exist; show the empty-state guidance
    fn on_schema_empty(&mut self) {}

    /// At least one session exists; show the settings pane
    fn on_schema_populated(&mut self) {}

    /// The ordered session list changed (added, removed, renamed or re-marked)
    fn on_entry_list_changed(&mut self, _entries: &[RegistryEntry]) {}

    /// The selected session became dirty or clean
    fn on_dirty_state_changed(&mut self, _dirty: bool) {}

    /// A session was selected and its settings loaded into the edit buffer
    fn on_selection_loaded(&mut self, _index: usize, _record: &SessionRecord) {}
}

/// Observer that ignores every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RegistryObserver for NullObserver {}

/// Session registry owns the session list, the edit buffer and the store
pub struct SessionRegistry<S: SessionStore> {
    /// Persisted session storage, exclusively owned
    store: S,
    /// Display capability
    observer: Box<dyn RegistryObserver>,
    /// Seed values for sessions that were never saved
    defaults: SessionDefaults,
    /// Session list in display order
    entries: Vec<RegistryEntry>,
    /// Index of the selected entry
    selected: Option<usize>,
    /// Last loaded or saved snapshot of the selected session
    baseline: Option<SessionRecord>,
    /// Live field values being edited
    live: SessionRecord,
    /// Whether `live` differs from `baseline`
    dirty: bool,
}

impl<S: SessionStore> SessionRegistry<S> {
    /// Create a registry over `store`; call [`Self::initialize`] before use
    pub fn new(store: S, defaults: SessionDefaults) -> Self {
        let live = SessionRecord::new(crate::session::UNNAMED_SESSION, &defaults);
        Self {
            store,
            observer: Box::new(NullObserver),
            defaults,
            entries: Vec::new(),
            selected: None,
            baseline: None,
            live,
            dirty: false,
        }
    }

    /// Set the display observer
    pub fn with_observer(mut self, observer: impl RegistryObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Session list in display order
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Number of sessions in the list
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no sessions
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the selected entry
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Live field values of the selected session
    pub fn live(&self) -> &SessionRecord {
        &self.live
    }

    /// Snapshot the live values are compared against
    pub fn baseline(&self) -> Option<&SessionRecord> {
        self.baseline.as_ref()
    }

    /// Whether the selected session has unsaved connection edits
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current selection state
    pub fn state(&self) -> RegistryState {
        match self.selected {
            None => RegistryState::Empty,
            Some(index) => RegistryState::Viewing {
                index,
                dirty: self.dirty,
            },
        }
    }

    /// Access the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the session list from the store and select the first session.
    ///
    /// A missing table is created and the list starts empty.
    #[instrument(skip(self))]
    pub fn initialize(&mut self) -> RegistryResult<()> {
        self.store.ensure_schema()?;

        let summaries = match self.store.list_summaries() {
            Ok(summaries) => summaries,
            Err(StoreError::SchemaMissing) => {
                warn!("Session table missing after schema check, creating it");
                self.store.ensure_schema()?;
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!("Loaded {} saved session(s)", summaries.len());

        self.entries = summaries.into_iter().map(RegistryEntry::from).collect();
        self.selected = None;
        self.baseline = None;
        self.live = SessionRecord::new(crate::session::UNNAMED_SESSION, &self.defaults);
        self.dirty = false;

        self.notify_entries();
        self.notify_visibility();

        if !self.entries.is_empty() {
            self.select_entry(0)?;
        }

        Ok(())
    }

    /// Append a new unsaved session and select it
    #[instrument(skip(self))]
    pub fn create_unsaved_entry(&mut self) -> RegistryResult<usize> {
        self.entries.push(RegistryEntry::unsaved());
        let index = self.entries.len() - 1;
        debug!("Created unsaved session at index {}", index);

        self.notify_entries();
        if self.entries.len() == 1 {
            self.notify_visibility();
        }

        self.select_entry(index)?;
        Ok(index)
    }

    /// Select the session at `index` and load it into the edit buffer.
    ///
    /// Unsaved edits of the previously selected session are discarded.
    #[instrument(skip(self))]
    pub fn select_entry(&mut self, index: usize) -> RegistryResult<&SessionRecord> {
        let entry = self
            .entries
            .get(index)
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })?;

        let stored = match entry.id {
            Some(id) => self.store.fetch(id)?.ok_or_else(|| {
                warn!("Session {} is listed but missing from the store", id);
                StoreError::NotFound(id)
            })?,
            None => SessionRecord::new(entry.name.clone(), &self.defaults),
        };
        // A rename not yet saved stays visible until it is saved or deleted.
        // The baseline keeps the stored name so the next save writes it.
        let mut record = stored.clone();
        record.name = entry.name.clone();

        let mut list_changed = false;
        if let Some(previous) = self.selected {
            if previous != index {
                if let Some(entry) = self.entries.get_mut(previous) {
                    list_changed |= std::mem::replace(&mut entry.modified, false);
                }
            }
        }

        self.selected = Some(index);
        self.baseline = Some(stored);
        self.live = record;
        list_changed |= self.set_dirty(false);

        if list_changed {
            self.notify_entries();
        }
        self.observer.on_selection_loaded(index, &self.live);

        Ok(&self.live)
    }

    /// Apply one field edit to the live values and return the new dirty state.
    ///
    /// Without a selected session there is no baseline and the result is
    /// always clean.
    pub fn apply_edit(&mut self, edit: FieldEdit) -> bool {
        self.live.apply(&edit);

        let mut list_changed = false;
        if let (FieldEdit::Name(_), Some(index)) = (&edit, self.selected) {
            if let Some(entry) = self.entries.get_mut(index) {
                if entry.name != self.live.name {
                    entry.name = self.live.name.clone();
                    list_changed = true;
                }
            }
        }

        let dirty = is_dirty(self.baseline.as_ref(), &self.live);
        list_changed |= self.set_dirty(dirty);

        if list_changed {
            self.notify_entries();
        }

        dirty
    }

    /// Persist `fields` as the session at `index`.
    ///
    /// Inserts when the entry was never saved and stores the new id in the
    /// entry; updates in place otherwise. Saving unchanged fields of a saved
    /// session writes nothing.
    #[instrument(skip(self, fields))]
    pub fn save(&mut self, index: usize, fields: &SessionRecord) -> RegistryResult<SessionId> {
        let entry_id = self
            .entries
            .get(index)
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })?
            .id;

        let mut record = fields.clone();
        record.name = strip_modified_marker(&fields.name).to_string();

        let id = match entry_id {
            None => {
                let id = self.store.insert(&record)?;
                info!("Saved new session {} as {}", record.name, id);
                id
            }
            Some(id) => {
                let unchanged = self.selected == Some(index)
                    && self
                        .baseline
                        .as_ref()
                        .is_some_and(|baseline| baseline.same_settings(&record));

                if unchanged {
                    debug!("Session {} unchanged, nothing to save", id);
                } else {
                    self.store.update(id, &record).map_err(|e| {
                        if matches!(e, StoreError::NotFound(_)) {
                            error!("Session {} vanished from the store before update", id);
                        }
                        e
                    })?;
                    info!("Updated session {}", id);
                }
                id
            }
        };

        record.id = Some(id);
        if let Some(entry) = self.entries.get_mut(index) {
            entry.id = Some(id);
            entry.name = record.name.clone();
            entry.modified = false;
        }

        if self.selected == Some(index) {
            self.baseline = Some(record.clone());
            self.live = record;
            self.set_dirty(false);
        }
        self.notify_entries();

        Ok(id)
    }

    /// Save the selected session with its live values
    pub fn save_current(&mut self) -> RegistryResult<SessionId> {
        let index = self.selected.ok_or(RegistryError::NoSelection)?;
        let fields = self.live.clone();
        self.save(index, &fields)
    }

    /// Remove the session at `index` from the list and the store.
    ///
    /// Later entries shift down by one. If the selected session was removed,
    /// the entry now at its position (or the new last entry) is loaded.
    #[instrument(skip(self))]
    pub fn delete_entry(&mut self, index: usize) -> RegistryResult<()> {
        let entry = self
            .entries
            .get(index)
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })?;

        if let Some(id) = entry.id {
            if self.store.delete(id)? {
                info!("Deleted session {}", id);
            } else {
                warn!("Session {} was already absent from the store", id);
            }
        }

        self.entries.remove(index);

        if self.entries.is_empty() {
            self.selected = None;
            self.baseline = None;
            self.live = SessionRecord::new(crate::session::UNNAMED_SESSION, &self.defaults);
            self.set_dirty(false);
            self.notify_entries();
            self.notify_visibility();
            return Ok(());
        }

        self.notify_entries();

        match self.selected {
            Some(selected) if selected == index => {
                self.selected = None;
                let next = index.min(self.entries.len() - 1);
                if let Err(e) = self.select_entry(next) {
                    warn!("Failed to load session at index {} after delete: {}", next, e);
                    self.baseline = None;
                    self.live =
                        SessionRecord::new(crate::session::UNNAMED_SESSION, &self.defaults);
                    self.set_dirty(false);
                    return Err(e);
                }
            }
            Some(selected) if selected > index => {
                self.selected = Some(selected - 1);
            }
            _ => {}
        }

        Ok(())
    }

    /// Delete the selected session
    pub fn delete_current(&mut self) -> RegistryResult<()> {
        let index = self.selected.ok_or(RegistryError::NoSelection)?;
        self.delete_entry(index)
    }

    /// Finish with the selected session's live values.
    ///
    /// The store is finalized; nothing unsaved is persisted.
    pub fn open(mut self) -> RegistryResult<ManagerOutcome> {
        if self.selected.is_none() {
            return Err(RegistryError::NoSelection);
        }

        let record = std::mem::replace(
            &mut self.live,
            SessionRecord::new(crate::session::UNNAMED_SESSION, &self.defaults),
        );
        self.store.close()?;
        info!("Session manager finished, opening {}", record.name);
        Ok(ManagerOutcome::Open(record))
    }

    /// Abandon the session manager, discarding unsaved edits
    pub fn cancel(mut self) -> RegistryResult<ManagerOutcome> {
        if self.dirty {
            debug!("Discarding unsaved edits");
        }
        self.store.close()?;
        info!("Session manager cancelled");
        Ok(ManagerOutcome::Cancelled)
    }

    /// Update the dirty flag and the selected entry's marker.
    ///
    /// Returns whether the entry list changed.
    fn set_dirty(&mut self, dirty: bool) -> bool {
        let mut list_changed = false;
        if let Some(entry) = self.selected.and_then(|i| self.entries.get_mut(i)) {
            if entry.modified != dirty {
                entry.modified = dirty;
                list_changed = true;
            }
        }

        if self.dirty != dirty {
            self.dirty = dirty;
            self.observer.on_dirty_state_changed(dirty);
        }

        list_changed
    }

    fn notify_entries(&mut self) {
        self.observer.on_entry_list_changed(&self.entries);
    }

    fn notify_visibility(&mut self) {
        if self.entries.is_empty() {
            self.observer.on_schema_empty();
        } else {
            self.observer.on_schema_populated();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::store::MemorySessionStore;

    #[derive(Debug, Clone, PartialEq)]
    enum Signal {
        Empty,
        Populated,
        Entries(Vec<String>),
        Dirty(bool),
        Loaded(usize, String),
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Signal>>>);

    impl Recorder {
        fn take(&self) -> Vec<Signal> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    impl RegistryObserver for Recorder {
        fn on_schema_empty(&mut self) {
            self.0.borrow_mut().push(Signal::Empty);
        }

        fn on_schema_populated(&mut self) {
            self.0.borrow_mut().push(Signal::Populated);
        }

        fn on_entry_list_changed(&mut self, entries: &[RegistryEntry]) {
            let names = entries.iter().map(RegistryEntry::display_name).collect();
            self.0.borrow_mut().push(Signal::Entries(names));
        }

        fn on_dirty_state_changed(&mut self, dirty: bool) {
            self.0.borrow_mut().push(Signal::Dirty(dirty));
        }

        fn on_selection_loaded(&mut self, index: usize, record: &SessionRecord) {
            self.0
                .borrow_mut()
                .push(Signal::Loaded(index, record.hostname.clone()));
        }
    }

    fn saved(name: &str, hostname: &str) -> SessionRecord {
        let mut record = SessionRecord::new(name, &SessionDefaults::default());
        record.hostname = hostname.to_string();
        record
    }

    fn registry_with(records: &[SessionRecord]) -> SessionRegistry<MemorySessionStore> {
        let mut store = MemorySessionStore::with_schema();
        for record in records {
            store.insert(record).unwrap();
        }
        let mut registry = SessionRegistry::new(store, SessionDefaults::default());
        registry.initialize().unwrap();
        registry
    }

    #[test]
    fn test_initialize_creates_missing_schema() {
        let recorder = Recorder::default();
        let mut registry = SessionRegistry::new(MemorySessionStore::new(), SessionDefaults::default())
            .with_observer(recorder.clone());

        registry.initialize().unwrap();

        assert!(registry.is_empty());
        assert_eq!(registry.state(), RegistryState::Empty);
        assert!(registry.store().list_summaries().unwrap().is_empty());
        assert_eq!(recorder.take(), vec![Signal::Entries(vec![]), Signal::Empty]);
    }

    #[test]
    fn test_initialize_selects_first_entry() {
        let recorder = Recorder::default();
        let mut store = MemorySessionStore::with_schema();
        store.insert(&saved("Local", "127.0.0.1")).unwrap();
        store.insert(&saved("Prod", "10.0.0.9")).unwrap();

        let mut registry = SessionRegistry::new(store, SessionDefaults::default())
            .with_observer(recorder.clone());
        registry.initialize().unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.state(),
            RegistryState::Viewing {
                index: 0,
                dirty: false
            }
        );
        assert_eq!(
            recorder.take(),
            vec![
                Signal::Entries(vec!["Local".to_string(), "Prod".to_string()]),
                Signal::Populated,
                Signal::Loaded(0, "127.0.0.1".to_string()),
            ]
        );
    }

    #[test]
    fn test_create_unsaved_entry_seeds_defaults() {
        let recorder = Recorder::default();
        let mut registry = SessionRegistry::new(MemorySessionStore::new(), SessionDefaults::default())
            .with_observer(recorder.clone());
        registry.initialize().unwrap();
        recorder.take();

        let index = registry.create_unsaved_entry().unwrap();

        assert_eq!(index, 0);
        assert_eq!(registry.entries()[0], RegistryEntry::unsaved());
        assert_eq!(registry.live().hostname, "127.0.0.1");
        assert_eq!(registry.live().username, "root");
        assert_eq!(registry.live().password, "");
        assert_eq!(registry.live().port, 3306);
        assert!(!registry.is_dirty());
        assert_eq!(registry.store().write_count(), 0);
        assert_eq!(
            recorder.take(),
            vec![
                Signal::Entries(vec!["Unnamed".to_string()]),
                Signal::Populated,
                Signal::Loaded(0, "127.0.0.1".to_string()),
            ]
        );
    }

    #[test]
    fn test_select_out_of_range() {
        let mut registry = registry_with(&[saved("Local", "127.0.0.1")]);
        let err = registry.select_entry(1).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::IndexOutOfRange { index: 1, len: 1 }
        ));
        // Selection untouched
        assert_eq!(registry.selected(), Some(0));
    }

    #[test]
    fn test_select_stale_entry_is_not_found() {
        let mut store = MemorySessionStore::with_schema();
        let id = store.insert(&saved("Local", "127.0.0.1")).unwrap();
        store.insert(&saved("Other", "10.0.0.2")).unwrap();
        let mut registry = SessionRegistry::new(store, SessionDefaults::default());
        registry.initialize().unwrap();
        registry.select_entry(1).unwrap();

        // Removed behind the registry's back
        registry.store.delete(id).unwrap();

        let err = registry.select_entry(0).unwrap_err();
        assert!(matches!(err, RegistryError::Store(StoreError::NotFound(_))));
        assert_eq!(registry.selected(), Some(1));
    }

    #[test]
    fn test_edit_and_revert_toggles_dirty() {
        let recorder = Recorder::default();
        let mut registry =
            registry_with(&[saved("Local", "127.0.0.1")]).with_observer(recorder.clone());

        assert!(registry.apply_edit(FieldEdit::Hostname("10.0.0.5".to_string())));
        assert_eq!(registry.entries()[0].display_name(), "Local *");

        assert!(!registry.apply_edit(FieldEdit::Hostname("127.0.0.1".to_string())));
        assert_eq!(registry.entries()[0].display_name(), "Local");

        assert_eq!(
            recorder.take(),
            vec![
                Signal::Dirty(true),
                Signal::Entries(vec!["Local *".to_string()]),
                Signal::Dirty(false),
                Signal::Entries(vec!["Local".to_string()]),
            ]
        );
    }

    #[test]
    fn test_edit_without_selection_is_clean() {
        let mut registry = registry_with(&[]);
        assert!(!registry.apply_edit(FieldEdit::Port(1234)));
        assert!(!registry.is_dirty());
        assert_eq!(registry.state(), RegistryState::Empty);
    }

    #[test]
    fn test_rename_does_not_dirty() {
        let mut registry = registry_with(&[saved("Local", "127.0.0.1")]);
        assert!(!registry.apply_edit(FieldEdit::Name("Laptop".to_string())));
        assert_eq!(registry.entries()[0].name, "Laptop");
        assert_eq!(registry.live().name, "Laptop");

        registry.save_current().unwrap();
        let id = registry.entries()[0].id.unwrap();
        assert_eq!(registry.store().fetch(id).unwrap().unwrap().name, "Laptop");
    }

    #[test]
    fn test_rename_survives_reselect_until_saved() {
        let mut registry =
            registry_with(&[saved("Local", "127.0.0.1"), saved("Other", "10.0.0.2")]);
        let id = registry.entries()[0].id.unwrap();
        registry.apply_edit(FieldEdit::Name("Laptop".to_string()));

        registry.select_entry(1).unwrap();
        registry.select_entry(0).unwrap();
        assert_eq!(registry.live().name, "Laptop");
        assert_eq!(registry.baseline().unwrap().name, "Local");
        assert!(!registry.is_dirty());

        registry.save_current().unwrap();

        assert_eq!(registry.entries()[0].name, "Laptop");
        assert_eq!(registry.store().fetch(id).unwrap().unwrap().name, "Laptop");
        assert_eq!(registry.baseline().unwrap().name, "Laptop");
    }

    #[test]
    fn test_save_unsaved_entry_inserts() {
        let mut registry = registry_with(&[]);
        registry.create_unsaved_entry().unwrap();
        registry.apply_edit(FieldEdit::Hostname("10.0.0.5".to_string()));
        assert!(registry.is_dirty());

        let fields = registry.live().clone();
        let id = registry.save(0, &fields).unwrap();

        assert_eq!(registry.entries()[0].id, Some(id));
        assert_eq!(registry.entries()[0].display_name(), "Unnamed");
        assert!(!registry.is_dirty());

        let stored = registry.store().fetch(id).unwrap().unwrap();
        assert_eq!(stored.hostname, "10.0.0.5");
        assert_eq!(stored.name, "Unnamed");
        assert_eq!(registry.baseline(), Some(&stored));
    }

    #[test]
    fn test_save_strips_marker_from_name() {
        let mut registry = registry_with(&[]);
        registry.create_unsaved_entry().unwrap();

        let mut fields = registry.live().clone();
        fields.name = "Staging *".to_string();
        let id = registry.save(0, &fields).unwrap();

        assert_eq!(registry.entries()[0].name, "Staging");
        assert_eq!(registry.store().fetch(id).unwrap().unwrap().name, "Staging");
    }

    #[test]
    fn test_save_saved_entry_updates_in_place() {
        let mut registry = registry_with(&[saved("Local", "127.0.0.1")]);
        let id = registry.entries()[0].id.unwrap();

        registry.apply_edit(FieldEdit::Port(3307));
        let saved_id = registry.save_current().unwrap();

        assert_eq!(saved_id, id);
        assert_eq!(registry.store().fetch(id).unwrap().unwrap().port, 3307);
        assert_eq!(registry.store().list_summaries().unwrap().len(), 1);
    }

    #[test]
    fn test_save_clean_is_noop() {
        let mut registry = registry_with(&[saved("Local", "127.0.0.1")]);
        let writes = registry.store().write_count();

        registry.save_current().unwrap();
        registry.save_current().unwrap();

        assert_eq!(registry.store().write_count(), writes);
        assert!(!registry.is_dirty());
    }

    #[test]
    fn test_save_out_of_range() {
        let mut registry = registry_with(&[]);
        let fields = registry.live().clone();
        assert!(matches!(
            registry.save(0, &fields),
            Err(RegistryError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_save_current_without_selection() {
        let mut registry = registry_with(&[]);
        assert!(matches!(
            registry.save_current(),
            Err(RegistryError::NoSelection)
        ));
    }

    #[test]
    fn test_switching_selection_discards_marker() {
        let mut registry = registry_with(&[saved("A", "10.0.0.1"), saved("B", "10.0.0.2")]);
        registry.apply_edit(FieldEdit::Username("admin".to_string()));
        assert!(registry.entries()[0].modified);

        registry.select_entry(1).unwrap();
        assert!(!registry.entries()[0].modified);
        assert!(!registry.is_dirty());

        registry.select_entry(0).unwrap();
        assert_eq!(registry.live().username, "root");
    }

    #[test]
    fn test_delete_first_shifts_entries() {
        let mut registry = registry_with(&[saved("A", "10.0.0.1"), saved("B", "10.0.0.2")]);
        let deleted = registry.entries()[0].id.unwrap();
        let survivor = registry.entries()[1].id.unwrap();

        registry.delete_entry(0).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].id, Some(survivor));
        assert_eq!(registry.selected(), Some(0));
        assert_eq!(registry.live().hostname, "10.0.0.2");
        assert!(registry.store().fetch(deleted).unwrap().is_none());
    }

    #[test]
    fn test_delete_before_selection_keeps_selected_record() {
        let mut registry = registry_with(&[
            saved("A", "10.0.0.1"),
            saved("B", "10.0.0.2"),
            saved("C", "10.0.0.3"),
        ]);
        registry.select_entry(2).unwrap();
        registry.apply_edit(FieldEdit::Password("pw".to_string()));

        registry.delete_entry(0).unwrap();

        assert_eq!(
            registry.state(),
            RegistryState::Viewing {
                index: 1,
                dirty: true
            }
        );
        assert_eq!(registry.entries()[1].name, "C");
    }

    #[test]
    fn test_delete_last_selected_moves_up() {
        let mut registry = registry_with(&[saved("A", "10.0.0.1"), saved("B", "10.0.0.2")]);
        registry.select_entry(1).unwrap();

        registry.delete_entry(1).unwrap();

        assert_eq!(registry.selected(), Some(0));
        assert_eq!(registry.live().hostname, "10.0.0.1");
    }

    #[test]
    fn test_delete_only_entry_empties_registry() {
        let recorder = Recorder::default();
        let mut registry =
            registry_with(&[saved("A", "10.0.0.1")]).with_observer(recorder.clone());

        registry.delete_current().unwrap();

        assert_eq!(registry.state(), RegistryState::Empty);
        assert!(registry.store().list_summaries().unwrap().is_empty());
        assert_eq!(recorder.take(), vec![Signal::Entries(vec![]), Signal::Empty]);
    }

    #[test]
    fn test_delete_with_missing_neighbour_clears_selection() {
        let mut registry = registry_with(&[saved("A", "10.0.0.1"), saved("B", "10.0.0.2")]);
        let deleted = registry.entries()[0].id.unwrap();
        let missing = registry.entries()[1].id.unwrap();
        registry.store.delete(missing).unwrap();

        let err = registry.delete_entry(0).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::Store(StoreError::NotFound(id)) if id == missing
        ));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.state(), RegistryState::Empty);
        assert!(registry.baseline().is_none());
        assert!(!registry.is_dirty());
        assert_eq!(registry.live().hostname, SessionDefaults::default().hostname);
        assert!(registry.store().fetch(deleted).unwrap().is_none());

        // Edits stay clean until a session is selected again
        assert!(!registry.apply_edit(FieldEdit::Port(1)));
    }

    #[test]
    fn test_delete_unsaved_entry_skips_store() {
        let mut registry = registry_with(&[saved("A", "10.0.0.1")]);
        let writes = registry.store().write_count();
        registry.create_unsaved_entry().unwrap();

        registry.delete_entry(1).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.store().write_count(), writes);
    }

    #[test]
    fn test_open_returns_live_record() {
        let mut registry = registry_with(&[saved("A", "10.0.0.1")]);
        registry.apply_edit(FieldEdit::Port(3310));

        match registry.open().unwrap() {
            ManagerOutcome::Open(record) => {
                assert_eq!(record.name, "A");
                assert_eq!(record.port, 3310);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_open_requires_selection() {
        let registry = registry_with(&[]);
        assert!(matches!(registry.open(), Err(RegistryError::NoSelection)));
    }

    #[test]
    fn test_cancel_discards_unsaved_edits() {
        let mut registry = registry_with(&[saved("A", "10.0.0.1")]);
        let id = registry.entries()[0].id.unwrap();
        registry.apply_edit(FieldEdit::Hostname("db.internal".to_string()));
        let writes = registry.store().write_count();

        let store_view = registry.store().fetch(id).unwrap().unwrap();
        assert_eq!(registry.cancel().unwrap(), ManagerOutcome::Cancelled);
        assert_eq!(store_view.hostname, "10.0.0.1");
        assert_eq!(writes, 1);
    }

    fn edit_strategy() -> impl Strategy<Value = FieldEdit> {
        let text = prop_oneof![Just(String::new()), "[a-z0-9.]{1,8}"];
        prop_oneof![
            text.clone().prop_map(FieldEdit::Hostname),
            text.clone().prop_map(FieldEdit::Username),
            text.clone().prop_map(FieldEdit::Password),
            text.prop_map(FieldEdit::Name),
            any::<u16>().prop_map(FieldEdit::Port),
        ]
    }

    proptest! {
        #[test]
        fn prop_dirty_matches_comparison(edits in prop::collection::vec(edit_strategy(), 0..20)) {
            let mut registry = registry_with(&[saved("A", "10.0.0.1")]);
            for edit in edits {
                let dirty = registry.apply_edit(edit);
                prop_assert_eq!(dirty, is_dirty(registry.baseline(), registry.live()));
                prop_assert_eq!(dirty, registry.entries()[0].modified);
            }
        }

        #[test]
        fn prop_reverting_restores_clean(edits in prop::collection::vec(edit_strategy(), 1..20)) {
            let mut registry = registry_with(&[saved("A", "10.0.0.1")]);
            let baseline = registry.baseline().cloned().unwrap();
            for edit in edits {
                registry.apply_edit(edit);
            }

            registry.apply_edit(FieldEdit::Port(baseline.port));
            registry.apply_edit(FieldEdit::Password(baseline.password.clone()));
            registry.apply_edit(FieldEdit::Hostname(baseline.hostname.clone()));
            let dirty = registry.apply_edit(FieldEdit::Username(baseline.username.clone()));

            prop_assert!(!dirty);
            prop_assert!(!registry.is_dirty());
        }
    }
}
