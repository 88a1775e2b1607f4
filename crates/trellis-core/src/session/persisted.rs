//! Persisted session record.
//!
//! The durable cache of the last-known session, kept in a single fixed
//! storage slot. It is written only after a successful bootstrap, read once
//! at process start, and discarded whenever its shape cannot be trusted.

use serde::{Deserialize, Serialize};

use super::model::Session;

/// Durable cache of the last-known session plus a load-completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSessionRecord {
    /// The session as it was last confirmed.
    pub session: Session,
    /// Whether the bulk load completed during the session that wrote this
    /// record. Informational; a fresh process always re-loads.
    #[serde(default)]
    pub bulk_load_completed: bool,
    /// Timestamp when the record was written (RFC 3339).
    pub saved_at: String,
}

impl PersistedSessionRecord {
    /// Creates a record stamped with the current time.
    pub fn new(session: Session, bulk_load_completed: bool) -> Self {
        Self {
            session,
            bulk_load_completed,
            saved_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Returns true when the cached session may be adopted without waiting
    /// for a live check: it must claim authentication and carry both
    /// identity fields. Anything else is discarded, never trusted.
    pub fn is_adoptable(&self) -> bool {
        self.session.is_authenticated && self.session.identity_complete()
    }
}
