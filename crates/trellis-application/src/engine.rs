//! Realtime synchronization engine.
//!
//! `SyncEngine` owns the six collection stores, the data loading gate, and
//! the subscription lifecycle, and wires them together across session
//! transitions: an active session triggers the one-time bulk load and opens
//! the realtime channels; a session ending tears everything down and resets
//! the gate so the next login starts fresh.
//!
//! Realtime events and local user actions flow through the same
//! `CollectionStore::merge` path, so both kinds of mutation observe the
//! same invariants.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{RwLock, mpsc, watch};
use uuid::Uuid;

use trellis_core::backend::{DataBackend, FeedSubscription};
use trellis_core::collection::{ChangeEvent, ChangeKind, Collection};
use trellis_core::domain::{
    Appointment, CalendarEntry, Client, DomainRecord, PerformanceEntry, ServiceOffering,
    WaitlistEntry,
};
use trellis_core::error::{Result, TrellisError};
use trellis_core::session::Session;
use trellis_core::store::{CollectionStore, MergeOutcome};
use trellis_core::tenant::{self, RecordAction};

use crate::event::EngineEvent;
use crate::gate::LoadGate;
use crate::lifecycle::SubscriptionLifecycle;

/// The six collection stores, one per synchronized domain collection.
///
/// Stores are shared with pump tasks and read by the presentation layer;
/// all writes go through the engine's merge paths.
#[derive(Clone, Default)]
pub struct Stores {
    pub appointments: Arc<RwLock<CollectionStore<Appointment>>>,
    pub clients: Arc<RwLock<CollectionStore<Client>>>,
    pub services: Arc<RwLock<CollectionStore<ServiceOffering>>>,
    pub performance: Arc<RwLock<CollectionStore<PerformanceEntry>>>,
    pub waitlist: Arc<RwLock<CollectionStore<WaitlistEntry>>>,
    pub calendar: Arc<RwLock<CollectionStore<CalendarEntry>>>,
}

impl Stores {
    fn new() -> Self {
        Self::default()
    }

    /// Empties every store. Logout path.
    async fn clear_all(&self) {
        self.appointments.write().await.clear();
        self.clients.write().await.clear();
        self.services.write().await.clear();
        self.performance.write().await.clear();
        self.waitlist.write().await.clear();
        self.calendar.write().await.clear();
    }
}

/// Orchestrates bulk loads and realtime synchronization for one process.
pub struct SyncEngine {
    /// Remote data store boundary
    backend: Arc<dyn DataBackend>,
    /// The six collection stores
    stores: Stores,
    /// Exactly-once bulk load guard
    gate: LoadGate,
    /// Open channel ownership and the stale-event generation counter
    lifecycle: SubscriptionLifecycle,
    /// Outbound events for the presentation layer
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    /// Profile of the session the current local state belongs to
    active_profile: Mutex<Option<Uuid>>,
}

impl SyncEngine {
    /// Creates the engine and the receiver for its outbound events.
    pub fn new(backend: Arc<dyn DataBackend>) -> (Arc<Self>, mpsc::UnboundedReceiver<EngineEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                backend,
                stores: Stores::new(),
                gate: LoadGate::new(),
                lifecycle: SubscriptionLifecycle::new(),
                events_tx,
                active_profile: Mutex::new(None),
            }),
            events_rx,
        )
    }

    /// The collection stores, for snapshot reads.
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// The bulk load gate.
    pub fn gate(&self) -> &LoadGate {
        &self.gate
    }

    /// Collections currently running without a live feed.
    pub fn degraded_collections(&self) -> Vec<Collection> {
        self.lifecycle.degraded_collections()
    }

    /// Spawns a task that drives the engine from the canonical session
    /// channel: every published session value is handed to
    /// [`handle_session_change`](Self::handle_session_change).
    pub fn spawn_session_watcher(
        self: &Arc<Self>,
        mut session_rx: watch::Receiver<Session>,
    ) -> tokio::task::JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let session = session_rx.borrow_and_update().clone();
                engine.handle_session_change(&session).await;
                if session_rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Applies one session transition.
    ///
    /// Active session: bulk load (gate-guarded) plus channel opens. Anything
    /// else: close every channel, reset the gate, clear every store. A
    /// direct switch to a different profile is treated as logout-then-login
    /// so no data leaks across identities.
    pub async fn handle_session_change(self: &Arc<Self>, session: &Session) {
        if session.is_active() {
            if self.note_active_profile(session.profile_id) {
                tracing::info!("[Engine] Active profile changed, resetting local state");
                self.teardown().await;
            }
            self.request_bulk_load(session).await;
            self.open_all(session).await;
        } else {
            self.clear_active_profile();
            tracing::info!("[Engine] Session ended, tearing down local state");
            self.teardown().await;
        }
    }

    /// Performs the one-time bulk load for `session`, if the gate grants it.
    ///
    /// All six collections are fetched concurrently and installed together;
    /// any fetch failure resets the gate for retry and is reported as a
    /// `BulkLoadFailed` event.
    pub async fn request_bulk_load(&self, session: &Session) {
        if !self.gate.begin(session) {
            tracing::debug!(
                "[Gate] Bulk load skipped (loaded: {}, in flight: {}, attempted: {})",
                self.gate.already_loaded(),
                self.gate.load_in_flight(),
                self.gate.attempted_this_session()
            );
            return;
        }

        tracing::info!("[Engine] Starting bulk load");
        match self.fetch_and_install(session).await {
            Ok(()) => {
                self.gate.complete_success();
                tracing::info!("[Engine] Bulk load completed");
                let _ = self.events_tx.send(EngineEvent::BulkLoadCompleted);
            }
            Err(error) => {
                self.gate.complete_failure();
                tracing::warn!("[Engine] Bulk load failed, gate reset for retry: {}", error);
                let _ = self.events_tx.send(EngineEvent::BulkLoadFailed { error });
            }
        }
    }

    /// Opens one realtime channel per collection.
    ///
    /// Each open runs in its own failure boundary: a collection whose
    /// channel cannot be opened is recorded as degraded and reported, and
    /// the remaining channels open regardless. Skipped when channels are
    /// already open for this session.
    pub async fn open_all(self: &Arc<Self>, session: &Session) {
        if self.lifecycle.any_open() {
            tracing::debug!("[Lifecycle] Channels already open, skipping");
            return;
        }

        self.lifecycle.clear_degraded();
        let generation = self.lifecycle.current_generation();
        tracing::info!("[Lifecycle] Opening realtime channels (generation {})", generation);

        let (appointments, clients, services, performance, waitlist, calendar) = tokio::join!(
            self.backend.subscribe_appointments(session),
            self.backend.subscribe_clients(session),
            self.backend.subscribe_services(session),
            self.backend.subscribe_performance(session),
            self.backend.subscribe_waitlist(session),
            self.backend.subscribe_calendar(session),
        );

        self.attach(session, generation, Collection::Appointments, appointments, &self.stores.appointments);
        self.attach(session, generation, Collection::Clients, clients, &self.stores.clients);
        self.attach(session, generation, Collection::Services, services, &self.stores.services);
        self.attach(session, generation, Collection::Performance, performance, &self.stores.performance);
        self.attach(session, generation, Collection::Waitlist, waitlist, &self.stores.waitlist);
        self.attach(session, generation, Collection::Calendar, calendar, &self.stores.calendar);
    }

    /// Releases every open channel.
    pub async fn close_all(&self) {
        let released = self.lifecycle.close_all(self.backend.as_ref()).await;
        if released > 0 {
            tracing::info!("[Lifecycle] Released {} channel(s)", released);
            let _ = self.events_tx.send(EngineEvent::SubscriptionsClosed);
        }
    }

    // ========================================================================
    // Local mutations, routed through the same merge path as the feed
    // ========================================================================

    pub async fn apply_appointment_action(
        &self,
        session: &Session,
        event: ChangeEvent<Appointment>,
    ) -> Result<MergeOutcome> {
        Self::apply_action(&self.stores.appointments, session, event, "appointment").await
    }

    pub async fn apply_client_action(
        &self,
        session: &Session,
        event: ChangeEvent<Client>,
    ) -> Result<MergeOutcome> {
        Self::apply_action(&self.stores.clients, session, event, "client").await
    }

    pub async fn apply_service_action(
        &self,
        session: &Session,
        event: ChangeEvent<ServiceOffering>,
    ) -> Result<MergeOutcome> {
        Self::apply_action(&self.stores.services, session, event, "service").await
    }

    pub async fn apply_performance_action(
        &self,
        session: &Session,
        event: ChangeEvent<PerformanceEntry>,
    ) -> Result<MergeOutcome> {
        Self::apply_action(&self.stores.performance, session, event, "performance entry").await
    }

    pub async fn apply_waitlist_action(
        &self,
        session: &Session,
        event: ChangeEvent<WaitlistEntry>,
    ) -> Result<MergeOutcome> {
        Self::apply_action(&self.stores.waitlist, session, event, "waitlist entry").await
    }

    pub async fn apply_calendar_action(
        &self,
        session: &Session,
        event: ChangeEvent<CalendarEntry>,
    ) -> Result<MergeOutcome> {
        Self::apply_action(&self.stores.calendar, session, event, "calendar entry").await
    }

    /// Permission-gates a local mutation, then merges it through the same
    /// code path realtime events take. A rejected action leaves the store
    /// untouched.
    async fn apply_action<T: DomainRecord>(
        store: &Arc<RwLock<CollectionStore<T>>>,
        session: &Session,
        event: ChangeEvent<T>,
        entity_type: &'static str,
    ) -> Result<MergeOutcome> {
        let mut store = store.write().await;
        match event.kind {
            ChangeKind::Insert => {
                let Some(record) = event.record.as_ref() else {
                    return Err(TrellisError::internal("insert action without a record"));
                };
                // A session cannot seed records it would not be allowed
                // to see.
                if !tenant::visible(session, record) {
                    return Err(TrellisError::permission_denied(
                        "insert",
                        entity_type,
                        event.record_id.to_string(),
                    ));
                }
            }
            ChangeKind::Update | ChangeKind::Delete => {
                let action = match event.kind {
                    ChangeKind::Update => RecordAction::Update,
                    _ => RecordAction::Delete,
                };
                let permitted = match store.get(event.record_id) {
                    Some(existing) => tenant::may_mutate(session, existing, action),
                    None => {
                        return Err(TrellisError::not_found(
                            entity_type,
                            event.record_id.to_string(),
                        ));
                    }
                };
                if !permitted {
                    return Err(TrellisError::permission_denied(
                        action.as_str(),
                        entity_type,
                        event.record_id.to_string(),
                    ));
                }
            }
        }
        Ok(store.merge(event))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn teardown(&self) {
        self.close_all().await;
        self.gate.reset();
        self.stores.clear_all().await;
    }

    /// Fetches all six collections concurrently and installs them together.
    /// Nothing is installed when any fetch fails.
    async fn fetch_and_install(&self, session: &Session) -> Result<()> {
        let (appointments, clients, services, performance, waitlist, calendar) = tokio::join!(
            self.backend.fetch_appointments(session),
            self.backend.fetch_clients(session),
            self.backend.fetch_services(session),
            self.backend.fetch_performance(session),
            self.backend.fetch_waitlist(session),
            self.backend.fetch_calendar(session),
        );

        let appointments = appointments?;
        let clients = clients?;
        let services = services?;
        let performance = performance?;
        let waitlist = waitlist?;
        let calendar = calendar?;

        Self::install(&self.stores.appointments, session, appointments).await;
        Self::install(&self.stores.clients, session, clients).await;
        Self::install(&self.stores.services, session, services).await;
        Self::install(&self.stores.performance, session, performance).await;
        Self::install(&self.stores.waitlist, session, waitlist).await;
        Self::install(&self.stores.calendar, session, calendar).await;

        Ok(())
    }

    /// Installs a bulk-load result. Server-side scoping is advisory, so the
    /// records are re-validated against the tenant filter first.
    async fn install<T: DomainRecord>(
        store: &Arc<RwLock<CollectionStore<T>>>,
        session: &Session,
        records: Vec<T>,
    ) {
        let visible: Vec<T> = records
            .into_iter()
            .filter(|record| tenant::visible(session, record))
            .collect();
        store.write().await.bulk_replace(visible);
    }

    /// Takes the result of one channel open: registers the handle and
    /// starts the pump on success, records the degradation on failure.
    fn attach<T: DomainRecord>(
        self: &Arc<Self>,
        session: &Session,
        generation: u64,
        collection: Collection,
        subscription: Result<FeedSubscription<T>>,
        store: &Arc<RwLock<CollectionStore<T>>>,
    ) {
        match subscription {
            Ok(subscription) => {
                self.lifecycle.register(subscription.handle.clone());
                self.spawn_pump(collection, generation, session.clone(), subscription, Arc::clone(store));
            }
            Err(error) => {
                self.lifecycle.mark_degraded(collection);
                tracing::warn!("[Lifecycle] Failed to open {} channel: {}", collection, error);
                let _ = self
                    .events_tx
                    .send(EngineEvent::ChannelDegraded { collection, error });
            }
        }
    }

    /// Reads one channel's events in arrival order and merges the visible
    /// ones. Stops on release or when the sender side goes away; events
    /// tied to a superseded open/close cycle are dropped.
    fn spawn_pump<T: DomainRecord>(
        self: &Arc<Self>,
        collection: Collection,
        generation: u64,
        session: Session,
        mut subscription: FeedSubscription<T>,
        store: Arc<RwLock<CollectionStore<T>>>,
    ) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let cancel = subscription.handle.cancel_token();
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    maybe_event = subscription.events.recv() => {
                        let Some(event) = maybe_event else { break };
                        if !engine.lifecycle.is_current(generation) {
                            break;
                        }
                        if let Some(record) = event.record.as_ref()
                            && !tenant::visible(&session, record)
                        {
                            tracing::trace!(
                                "[Engine] Dropped {} event outside session visibility",
                                collection
                            );
                            continue;
                        }
                        store.write().await.merge(event);
                    }
                }
            }
            tracing::debug!("[Engine] {} pump stopped", collection);
        });
    }

    /// Records the active profile. Returns true when a different profile
    /// was previously active (identity switch without a logout in between).
    fn note_active_profile(&self, profile_id: Option<Uuid>) -> bool {
        let mut active = self
            .active_profile
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let switched = matches!(
            (*active, profile_id),
            (Some(previous), Some(next)) if previous != next
        );
        *active = profile_id;
        switched
    }

    fn clear_active_profile(&self) {
        *self
            .active_profile
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}
