//! Persisted session cache trait.
//!
//! Defines the interface for the fixed local storage slot holding the
//! last-known session.

use super::persisted::PersistedSessionRecord;

/// An abstract store for the persisted session slot.
///
/// The slot is local and synchronous. Storage failures (disabled, full,
/// unparseable content) are swallowed by implementations and reported as
/// "absent": the cache is a latency optimization, never a source of truth.
pub trait SessionCache: Send + Sync {
    /// Reads the persisted record, or `None` when the slot is absent or its
    /// content cannot be parsed.
    fn read(&self) -> Option<PersistedSessionRecord>;

    /// Writes the persisted record. Failures are logged and ignored.
    fn write(&self, record: &PersistedSessionRecord);

    /// Clears the slot. Failures are logged and ignored.
    fn clear(&self);
}
