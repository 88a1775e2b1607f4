//! Data loading gate.
//!
//! Guards the one-time bulk load against duplicate triggers. A naive
//! "load if not loaded" check is insufficient under rapid re-evaluation:
//! two near-simultaneous session-change notifications would both observe
//! "not loaded" and issue duplicate bulk loads. The gate therefore keeps
//! three named flags and flips the attempt markers synchronously, inside
//! the same critical section that performs the check.

use std::sync::{Mutex, MutexGuard, PoisonError};

use trellis_core::session::Session;

#[derive(Debug, Default, Clone, Copy)]
struct GateFlags {
    already_loaded: bool,
    load_in_flight: bool,
    attempted_this_session: bool,
}

/// Exactly-once guard for the per-session bulk load.
///
/// Lifecycle: `begin` → (`complete_success` | `complete_failure`), with
/// `reset` on every transition to an unauthenticated session so the next
/// login re-triggers exactly one fresh load.
#[derive(Debug, Default)]
pub struct LoadGate {
    flags: Mutex<GateFlags>,
}

impl LoadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the bulk load for `session`.
    ///
    /// Returns true exactly when the caller should proceed: the session is
    /// authenticated with a complete identity and no flag is set. On a true
    /// return, `attempted_this_session` and `load_in_flight` are already set
    /// before this method returns, so a concurrent second caller sees them.
    pub fn begin(&self, session: &Session) -> bool {
        if !session.is_active() {
            return false;
        }

        let mut flags = self.lock();
        if flags.already_loaded || flags.load_in_flight || flags.attempted_this_session {
            return false;
        }
        flags.attempted_this_session = true;
        flags.load_in_flight = true;
        true
    }

    /// Marks the claimed load as successfully finished.
    pub fn complete_success(&self) {
        let mut flags = self.lock();
        flags.load_in_flight = false;
        flags.already_loaded = true;
    }

    /// Marks the claimed load as failed. Clears the attempt markers so a
    /// later retry can claim the gate again.
    pub fn complete_failure(&self) {
        let mut flags = self.lock();
        flags.load_in_flight = false;
        flags.attempted_this_session = false;
    }

    /// Clears all flags. Logout path.
    pub fn reset(&self) {
        *self.lock() = GateFlags::default();
    }

    pub fn already_loaded(&self) -> bool {
        self.lock().already_loaded
    }

    pub fn load_in_flight(&self) -> bool {
        self.lock().load_in_flight
    }

    pub fn attempted_this_session(&self) -> bool {
        self.lock().attempted_this_session
    }

    fn lock(&self) -> MutexGuard<'_, GateFlags> {
        // The guarded state is a plain flag set; a poisoned lock cannot
        // leave it logically inconsistent.
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
