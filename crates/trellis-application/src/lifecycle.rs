//! Subscription lifecycle manager.
//!
//! Owns the full set of open channel handles and tears them down in
//! lockstep with session transitions. Each handle is an independently owned
//! resource: releases are attempted for every handle on every exit path,
//! and per-handle failures are collected (logged), never propagated.
//!
//! A generation counter keyed to each open/close cycle lets pump loops drop
//! events that arrive after their cycle was superseded, so a released
//! channel can never mutate a store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use trellis_core::backend::{DataBackend, SubscriptionHandle};
use trellis_core::collection::Collection;

/// Owner of the open subscription handles.
#[derive(Debug, Default)]
pub struct SubscriptionLifecycle {
    /// Open/close cycle counter. Advanced on every close so events tied to
    /// older cycles are identifiable as stale.
    generation: AtomicU64,
    /// Handles of the currently open channels.
    handles: Mutex<Vec<SubscriptionHandle>>,
    /// Collections whose channel failed to open this cycle.
    degraded: Mutex<Vec<Collection>>,
}

impl SubscriptionLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current open/close cycle.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Returns true when `generation` is still the active cycle.
    pub fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Returns true when at least one channel is open.
    pub fn any_open(&self) -> bool {
        !self.lock_handles().is_empty()
    }

    /// Takes ownership of a freshly opened channel's handle.
    pub fn register(&self, handle: SubscriptionHandle) {
        self.lock_handles().push(handle);
    }

    /// Records a collection whose channel could not be opened this cycle.
    pub fn mark_degraded(&self, collection: Collection) {
        let mut degraded = self.lock_degraded();
        if !degraded.contains(&collection) {
            degraded.push(collection);
        }
    }

    /// Clears the degradation record at the start of an open cycle.
    pub fn clear_degraded(&self) {
        self.lock_degraded().clear();
    }

    /// Collections currently without a live feed.
    pub fn degraded_collections(&self) -> Vec<Collection> {
        self.lock_degraded().clone()
    }

    /// Releases every owned handle.
    ///
    /// The generation advances before any release, so events still in
    /// flight on the old cycle are dropped by the pumps. The backend is
    /// asked to stop delivery for each handle; a failing backend release is
    /// logged and the local handle is released regardless, so every handle
    /// is dealt with even when one release misbehaves.
    ///
    /// Returns the number of handles that were released.
    pub async fn close_all(&self, backend: &dyn DataBackend) -> usize {
        let handles = self.begin_shutdown();
        let count = handles.len();

        for handle in handles {
            if let Err(e) = backend.release(&handle).await {
                tracing::warn!(
                    "[Lifecycle] Backend release failed for {} channel: {}",
                    handle.collection(),
                    e
                );
            }
            handle.release();
        }

        count
    }

    /// Advances the generation and drains the owned handles. Split from
    /// [`close_all`](Self::close_all) so the stale-event cutoff happens
    /// before the first release call.
    fn begin_shutdown(&self) -> Vec<SubscriptionHandle> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.lock_degraded().clear();
        std::mem::take(&mut *self.lock_handles())
    }

    fn lock_handles(&self) -> MutexGuard<'_, Vec<SubscriptionHandle>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_degraded(&self) -> MutexGuard<'_, Vec<Collection>> {
        self.degraded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
