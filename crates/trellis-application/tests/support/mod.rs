//! Shared test doubles for the engine integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use trellis_core::backend::{AuthBackend, DataBackend, FeedSubscription, SubscriptionHandle};
use trellis_core::collection::{ChangeEvent, Collection};
use trellis_core::domain::{
    Appointment, AppointmentStatus, CalendarEntry, Client, PerformanceEntry, ServiceOffering,
    WaitlistEntry,
};
use trellis_core::error::{Result, TrellisError};
use trellis_core::session::{AccountMode, PersistedSessionRecord, Role, Session, SessionCache};

// ============================================================================
// Sessions and records
// ============================================================================

pub fn single_session() -> Session {
    Session {
        is_authenticated: true,
        user_id: Some(Uuid::new_v4()),
        profile_id: Some(Uuid::new_v4()),
        mode: AccountMode::Single,
        tenant_id: None,
        role: Role::Member,
    }
}

pub fn team_session(tenant_id: Uuid) -> Session {
    Session {
        is_authenticated: true,
        user_id: Some(Uuid::new_v4()),
        profile_id: Some(Uuid::new_v4()),
        mode: AccountMode::Team,
        tenant_id: Some(tenant_id),
        role: Role::Member,
    }
}

pub fn appointment_for(session: &Session) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        tenant_id: session.tenant_id,
        profile_id: session.profile_id,
        client_id: Uuid::new_v4(),
        service_id: None,
        starts_at: now,
        ends_at: now + chrono::Duration::hours(1),
        status: AppointmentStatus::Scheduled,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn appointment_owned_by(tenant_id: Option<Uuid>, profile_id: Option<Uuid>) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        tenant_id,
        profile_id,
        client_id: Uuid::new_v4(),
        service_id: None,
        starts_at: now,
        ends_at: now + chrono::Duration::hours(1),
        status: AppointmentStatus::Scheduled,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn client_for(session: &Session) -> Client {
    client_owned_by(session.tenant_id, session.profile_id)
}

pub fn client_owned_by(tenant_id: Option<Uuid>, profile_id: Option<Uuid>) -> Client {
    let now = Utc::now();
    Client {
        id: Uuid::new_v4(),
        tenant_id,
        profile_id,
        full_name: "Jamie Rivers".to_string(),
        email: None,
        phone: None,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// In-memory session cache
// ============================================================================

#[derive(Default)]
pub struct MemoryCache {
    record: Mutex<Option<PersistedSessionRecord>>,
}

impl MemoryCache {
    pub fn new(record: Option<PersistedSessionRecord>) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }

    pub fn stored(&self) -> Option<PersistedSessionRecord> {
        self.record.lock().unwrap().clone()
    }
}

impl SessionCache for MemoryCache {
    fn read(&self) -> Option<PersistedSessionRecord> {
        self.record.lock().unwrap().clone()
    }

    fn write(&self, record: &PersistedSessionRecord) {
        *self.record.lock().unwrap() = Some(record.clone());
    }

    fn clear(&self) {
        *self.record.lock().unwrap() = None;
    }
}

// ============================================================================
// Scripted auth backend
// ============================================================================

#[derive(Default)]
pub struct ScriptedAuth {
    results: Mutex<Vec<Result<Session>>>,
}

impl ScriptedAuth {
    /// Queues results returned in order; once drained, resolves
    /// unauthenticated.
    pub fn with_results(results: Vec<Result<Session>>) -> Self {
        Self {
            results: Mutex::new(results),
        }
    }
}

#[async_trait]
impl AuthBackend for ScriptedAuth {
    async fn current_session(&self) -> Result<Session> {
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Ok(Session::unauthenticated())
        } else {
            results.remove(0)
        }
    }
}

// ============================================================================
// Scripted data backend
// ============================================================================

struct FeedSlot<T> {
    tx: Mutex<Option<mpsc::UnboundedSender<ChangeEvent<T>>>>,
}

impl<T> Default for FeedSlot<T> {
    fn default() -> Self {
        Self {
            tx: Mutex::new(None),
        }
    }
}

impl<T> FeedSlot<T> {
    fn open(&self, collection: Collection) -> FeedSubscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.tx.lock().unwrap() = Some(tx);
        FeedSubscription {
            events: rx,
            handle: SubscriptionHandle::new(collection),
        }
    }

    fn push(&self, event: ChangeEvent<T>) {
        if let Some(tx) = self.tx.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }
}

/// An in-memory data backend with scripted failures.
#[derive(Default)]
pub struct ScriptedBackend {
    pub appointments: Mutex<Vec<Appointment>>,
    pub clients: Mutex<Vec<Client>>,
    pub services: Mutex<Vec<ServiceOffering>>,
    pub performance: Mutex<Vec<PerformanceEntry>>,
    pub waitlist: Mutex<Vec<WaitlistEntry>>,
    pub calendar: Mutex<Vec<CalendarEntry>>,

    fetch_counts: Mutex<HashMap<Collection, usize>>,
    fail_fetch: Mutex<HashSet<Collection>>,
    fail_subscribe: Mutex<HashSet<Collection>>,
    fail_release: Mutex<HashSet<Collection>>,
    release_attempts: Mutex<Vec<Collection>>,

    appointment_feed: FeedSlot<Appointment>,
    client_feed: FeedSlot<Client>,
    service_feed: FeedSlot<ServiceOffering>,
    performance_feed: FeedSlot<PerformanceEntry>,
    waitlist_feed: FeedSlot<WaitlistEntry>,
    calendar_feed: FeedSlot<CalendarEntry>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_appointment(&self, appointment: Appointment) {
        self.appointments.lock().unwrap().push(appointment);
    }

    pub fn seed_client(&self, client: Client) {
        self.clients.lock().unwrap().push(client);
    }

    pub fn fail_fetch(&self, collection: Collection) {
        self.fail_fetch.lock().unwrap().insert(collection);
    }

    pub fn restore_fetch(&self, collection: Collection) {
        self.fail_fetch.lock().unwrap().remove(&collection);
    }

    pub fn fail_subscribe(&self, collection: Collection) {
        self.fail_subscribe.lock().unwrap().insert(collection);
    }

    pub fn fail_release(&self, collection: Collection) {
        self.fail_release.lock().unwrap().insert(collection);
    }

    pub fn fetch_count(&self, collection: Collection) -> usize {
        self.fetch_counts
            .lock()
            .unwrap()
            .get(&collection)
            .copied()
            .unwrap_or(0)
    }

    pub fn release_attempts(&self) -> Vec<Collection> {
        self.release_attempts.lock().unwrap().clone()
    }

    pub fn push_appointment_event(&self, event: ChangeEvent<Appointment>) {
        self.appointment_feed.push(event);
    }

    pub fn push_client_event(&self, event: ChangeEvent<Client>) {
        self.client_feed.push(event);
    }

    fn record_fetch(&self, collection: Collection) -> Result<()> {
        *self
            .fetch_counts
            .lock()
            .unwrap()
            .entry(collection)
            .or_insert(0) += 1;
        if self.fail_fetch.lock().unwrap().contains(&collection) {
            Err(TrellisError::backend("scripted fetch failure"))
        } else {
            Ok(())
        }
    }

    fn check_subscribe(&self, collection: Collection) -> Result<()> {
        if self.fail_subscribe.lock().unwrap().contains(&collection) {
            Err(TrellisError::backend("scripted subscribe failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DataBackend for ScriptedBackend {
    async fn fetch_appointments(&self, _session: &Session) -> Result<Vec<Appointment>> {
        self.record_fetch(Collection::Appointments)?;
        Ok(self.appointments.lock().unwrap().clone())
    }

    async fn fetch_clients(&self, _session: &Session) -> Result<Vec<Client>> {
        self.record_fetch(Collection::Clients)?;
        Ok(self.clients.lock().unwrap().clone())
    }

    async fn fetch_services(&self, _session: &Session) -> Result<Vec<ServiceOffering>> {
        self.record_fetch(Collection::Services)?;
        Ok(self.services.lock().unwrap().clone())
    }

    async fn fetch_performance(&self, _session: &Session) -> Result<Vec<PerformanceEntry>> {
        self.record_fetch(Collection::Performance)?;
        Ok(self.performance.lock().unwrap().clone())
    }

    async fn fetch_waitlist(&self, _session: &Session) -> Result<Vec<WaitlistEntry>> {
        self.record_fetch(Collection::Waitlist)?;
        Ok(self.waitlist.lock().unwrap().clone())
    }

    async fn fetch_calendar(&self, _session: &Session) -> Result<Vec<CalendarEntry>> {
        self.record_fetch(Collection::Calendar)?;
        Ok(self.calendar.lock().unwrap().clone())
    }

    async fn subscribe_appointments(
        &self,
        _session: &Session,
    ) -> Result<FeedSubscription<Appointment>> {
        self.check_subscribe(Collection::Appointments)?;
        Ok(self.appointment_feed.open(Collection::Appointments))
    }

    async fn subscribe_clients(&self, _session: &Session) -> Result<FeedSubscription<Client>> {
        self.check_subscribe(Collection::Clients)?;
        Ok(self.client_feed.open(Collection::Clients))
    }

    async fn subscribe_services(
        &self,
        _session: &Session,
    ) -> Result<FeedSubscription<ServiceOffering>> {
        self.check_subscribe(Collection::Services)?;
        Ok(self.service_feed.open(Collection::Services))
    }

    async fn subscribe_performance(
        &self,
        _session: &Session,
    ) -> Result<FeedSubscription<PerformanceEntry>> {
        self.check_subscribe(Collection::Performance)?;
        Ok(self.performance_feed.open(Collection::Performance))
    }

    async fn subscribe_waitlist(
        &self,
        _session: &Session,
    ) -> Result<FeedSubscription<WaitlistEntry>> {
        self.check_subscribe(Collection::Waitlist)?;
        Ok(self.waitlist_feed.open(Collection::Waitlist))
    }

    async fn subscribe_calendar(
        &self,
        _session: &Session,
    ) -> Result<FeedSubscription<CalendarEntry>> {
        self.check_subscribe(Collection::Calendar)?;
        Ok(self.calendar_feed.open(Collection::Calendar))
    }

    async fn release(&self, handle: &SubscriptionHandle) -> Result<()> {
        self.release_attempts
            .lock()
            .unwrap()
            .push(handle.collection());
        if self
            .fail_release
            .lock()
            .unwrap()
            .contains(&handle.collection())
        {
            return Err(TrellisError::backend("scripted release failure"));
        }
        Ok(())
    }
}

// ============================================================================
// Polling helper
// ============================================================================

/// Polls `check` until it returns true or two seconds pass. Pump tasks run
/// on the same runtime, so a short poll is enough for delivered events to
/// land.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if check().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
