//! Collection identifiers and change events.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uuid::Uuid;

use crate::domain::DomainRecord;

/// The six synchronized domain collections.
///
/// Iterable via `strum::IntoEnumIterator` so callers can fan out over every
/// collection without keeping a parallel list in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Appointments,
    Clients,
    Services,
    Performance,
    Waitlist,
    Calendar,
}

/// The kind of mutation a change event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One mutation arriving on a collection's change feed.
///
/// Events are transient: they are consumed by a single merge and not
/// retained. Delete events carry no record body, only the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent<T> {
    pub kind: ChangeKind,
    pub record_id: Uuid,
    pub record: Option<T>,
}

impl<T: DomainRecord> ChangeEvent<T> {
    /// An insert event for a freshly created record.
    pub fn insert(record: T) -> Self {
        Self {
            kind: ChangeKind::Insert,
            record_id: record.id(),
            record: Some(record),
        }
    }

    /// An update event carrying the full new state of the record.
    pub fn update(record: T) -> Self {
        Self {
            kind: ChangeKind::Update,
            record_id: record.id(),
            record: Some(record),
        }
    }

    /// A delete event identified only by record id.
    pub fn delete(record_id: Uuid) -> Self {
        Self {
            kind: ChangeKind::Delete,
            record_id,
            record: None,
        }
    }
}
