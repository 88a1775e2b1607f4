//! Per-collection record store with a single merge entry point.
//!
//! Every mutation of a collection, whether it came from the realtime feed or
//! from a local user action, flows through [`CollectionStore::merge`]. One
//! code path keeps the invariants (id uniqueness, newest-first ordering,
//! selection consistency) in one place.

use uuid::Uuid;

use crate::collection::{ChangeEvent, ChangeKind};
use crate::domain::DomainRecord;

/// What a merge did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A new record was prepended.
    Inserted,
    /// An existing record was replaced in place.
    Updated,
    /// A record was removed.
    Removed,
    /// The event did not change the store (duplicate insert, unknown update
    /// or delete target, or a malformed event without a record body).
    Ignored,
}

/// An ordered, id-unique container for one domain collection.
///
/// Insertion order is meaningful: event-sourced inserts go to the front so
/// the newest record is first. An optional selected-record cross-reference
/// tracks one record by id.
#[derive(Debug, Clone)]
pub struct CollectionStore<T> {
    records: Vec<T>,
    selected_id: Option<Uuid>,
}

impl<T> Default for CollectionStore<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            selected_id: None,
        }
    }
}

impl<T: DomainRecord> CollectionStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the current contents and installs `records` as the new
    /// sequence. Used once per session, at the initial bulk load. The
    /// selection survives only if the selected id is still present.
    pub fn bulk_replace(&mut self, records: Vec<T>) {
        self.records = records;
        if let Some(id) = self.selected_id
            && !self.contains(id)
        {
            self.selected_id = None;
        }
    }

    /// Applies one change event.
    ///
    /// - Insert: an already-present id is an idempotent no-op (duplicate
    ///   delivery); otherwise the record is prepended.
    /// - Update: an unknown id is ignored (the record may have arrived out
    ///   of visibility or before the bulk load completed); a known id is
    ///   replaced in place, position preserved.
    /// - Delete: removes the record if present; clears the selection if it
    ///   pointed at the removed id.
    ///
    /// Re-applying an already-applied event never changes observable state.
    pub fn merge(&mut self, event: ChangeEvent<T>) -> MergeOutcome {
        match event.kind {
            ChangeKind::Insert => {
                let Some(record) = event.record else {
                    return MergeOutcome::Ignored;
                };
                if self.contains(event.record_id) {
                    return MergeOutcome::Ignored;
                }
                self.records.insert(0, record);
                MergeOutcome::Inserted
            }
            ChangeKind::Update => {
                let Some(record) = event.record else {
                    return MergeOutcome::Ignored;
                };
                match self.position(event.record_id) {
                    Some(index) => {
                        self.records[index] = record;
                        MergeOutcome::Updated
                    }
                    None => MergeOutcome::Ignored,
                }
            }
            ChangeKind::Delete => match self.position(event.record_id) {
                Some(index) => {
                    self.records.remove(index);
                    if self.selected_id == Some(event.record_id) {
                        self.selected_id = None;
                    }
                    MergeOutcome::Removed
                }
                None => MergeOutcome::Ignored,
            },
        }
    }

    /// Empties the store and the selection. Logout path.
    pub fn clear(&mut self) {
        self.records.clear();
        self.selected_id = None;
    }

    /// Selects a record by id. Returns false (and leaves the selection
    /// unchanged) when the id is not present.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.contains(id) {
            self.selected_id = Some(id);
            true
        } else {
            false
        }
    }

    /// Clears the selected-record cross-reference.
    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    /// The currently selected record, if any.
    pub fn selected(&self) -> Option<&T> {
        self.selected_id.and_then(|id| self.get(id))
    }

    /// The selected record id, if any.
    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected_id
    }

    /// Looks up a record by id.
    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Returns true when a record with `id` is present.
    pub fn contains(&self, id: Uuid) -> bool {
        self.position(id).is_some()
    }

    /// The records in order, newest event-sourced insert first.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }
}
