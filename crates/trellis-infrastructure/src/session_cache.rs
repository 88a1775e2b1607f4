//! TOML-backed persisted session cache.
//!
//! Implements the [`SessionCache`] trait over the fixed session slot file.
//! Every failure mode (storage disabled, unreadable file, unparseable
//! content) degrades to "absent": the cache is a latency optimization and
//! must never block or corrupt a bootstrap.

use std::path::PathBuf;

use trellis_core::session::{PersistedSessionRecord, SessionCache};

use crate::paths::{PathError, TrellisPaths};
use crate::storage::SlotFile;

/// Persisted session cache stored in one TOML slot.
pub struct TomlSessionCache {
    slot: SlotFile<PersistedSessionRecord>,
}

impl TomlSessionCache {
    /// Creates the cache at the default platform location.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform configuration directory cannot be
    /// resolved.
    pub fn new() -> Result<Self, PathError> {
        let path = TrellisPaths::new(None).session_slot_path()?;
        Ok(Self::with_path(path))
    }

    /// Creates the cache at an explicit path (tests, custom layouts).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            slot: SlotFile::new(path),
        }
    }
}

impl SessionCache for TomlSessionCache {
    fn read(&self) -> Option<PersistedSessionRecord> {
        match self.slot.load() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("[SessionCache] Discarding unreadable session slot: {}", e);
                // A slot that cannot be parsed is never trusted again.
                let _ = self.slot.remove();
                None
            }
        }
    }

    fn write(&self, record: &PersistedSessionRecord) {
        if let Err(e) = self.slot.save(record) {
            tracing::warn!("[SessionCache] Failed to write session slot: {}", e);
        }
    }

    fn clear(&self) {
        if let Err(e) = self.slot.remove() {
            tracing::warn!("[SessionCache] Failed to clear session slot: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use uuid::Uuid;

    use trellis_core::session::Session;

    fn cache_in(dir: &TempDir) -> TomlSessionCache {
        TomlSessionCache::with_path(dir.path().join("session.toml"))
    }

    fn active_session() -> Session {
        Session {
            is_authenticated: true,
            user_id: Some(Uuid::new_v4()),
            profile_id: Some(Uuid::new_v4()),
            ..Session::default()
        }
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let record = PersistedSessionRecord::new(active_session(), true);

        cache.write(&record);
        assert_eq!(cache.read(), Some(record));
    }

    #[test]
    fn test_read_absent_slot() {
        let dir = TempDir::new().unwrap();
        assert!(cache_in(&dir).read().is_none());
    }

    #[test]
    fn test_malformed_slot_is_discarded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.toml");
        fs::write(&path, "is_authenticated = \"definitely\"").unwrap();

        let cache = TomlSessionCache::with_path(path.clone());
        assert!(cache.read().is_none());
        // The unreadable slot was removed so it cannot be re-read later.
        assert!(!path.exists());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        cache.write(&PersistedSessionRecord::new(active_session(), false));
        cache.clear();
        cache.clear();
        assert!(cache.read().is_none());
    }
}
