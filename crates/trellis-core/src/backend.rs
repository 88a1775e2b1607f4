//! Data backend traits.
//!
//! Defines the boundary to the remote data store: one bulk-query call per
//! collection, one change-feed subscription per collection, and the live
//! authentication check. The wire format behind these traits is out of
//! scope; implementations live outside the core crate.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::collection::{ChangeEvent, Collection};
use crate::domain::{
    Appointment, CalendarEntry, Client, PerformanceEntry, ServiceOffering, WaitlistEntry,
};
use crate::error::Result;
use crate::session::Session;

/// An open change-feed channel for one collection.
///
/// Release is a single idempotent operation; releasing an already-released
/// handle is a no-op. The local cancellation token is the delivery kill
/// switch: backends stop sending once it is cancelled, and pump loops use it
/// to stop reading.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    collection: Collection,
    cancel: CancellationToken,
}

impl SubscriptionHandle {
    /// Creates a handle for a freshly opened channel.
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            cancel: CancellationToken::new(),
        }
    }

    /// The collection this channel delivers events for.
    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Stops local delivery. Idempotent; tolerant of resources that already
    /// went away.
    pub fn release(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the handle has been released.
    pub fn is_released(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token observed by the backend's delivery task and the pump loop.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// A change-feed subscription: the event receiver plus its handle.
pub struct FeedSubscription<T> {
    /// Events in arrival order. The sender side closes when the channel is
    /// released or the backend goes away.
    pub events: mpsc::UnboundedReceiver<ChangeEvent<T>>,
    /// The handle owned by the subscription lifecycle manager.
    pub handle: SubscriptionHandle,
}

/// Live authentication check against the remote store.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Resolves the caller's current session.
    ///
    /// # Returns
    ///
    /// - `Ok(session)`: the authoritative session (authenticated or not)
    /// - `Err(_)`: transport failure; callers treat this as unauthenticated
    async fn current_session(&self) -> Result<Session>;
}

/// Bulk queries and change feeds for the six domain collections.
///
/// Server-side scoping of both queries and feeds is advisory; the tenant
/// filter re-validates everything client-side. Errors from fetches and
/// subscribes are transient and retryable.
#[async_trait]
pub trait DataBackend: Send + Sync {
    async fn fetch_appointments(&self, session: &Session) -> Result<Vec<Appointment>>;
    async fn fetch_clients(&self, session: &Session) -> Result<Vec<Client>>;
    async fn fetch_services(&self, session: &Session) -> Result<Vec<ServiceOffering>>;
    async fn fetch_performance(&self, session: &Session) -> Result<Vec<PerformanceEntry>>;
    async fn fetch_waitlist(&self, session: &Session) -> Result<Vec<WaitlistEntry>>;
    async fn fetch_calendar(&self, session: &Session) -> Result<Vec<CalendarEntry>>;

    async fn subscribe_appointments(&self, session: &Session)
    -> Result<FeedSubscription<Appointment>>;
    async fn subscribe_clients(&self, session: &Session) -> Result<FeedSubscription<Client>>;
    async fn subscribe_services(&self, session: &Session)
    -> Result<FeedSubscription<ServiceOffering>>;
    async fn subscribe_performance(
        &self,
        session: &Session,
    ) -> Result<FeedSubscription<PerformanceEntry>>;
    async fn subscribe_waitlist(&self, session: &Session)
    -> Result<FeedSubscription<WaitlistEntry>>;
    async fn subscribe_calendar(&self, session: &Session)
    -> Result<FeedSubscription<CalendarEntry>>;

    /// Tells the backend to stop delivery for `handle`. Idempotent. A
    /// failure here never prevents local release of the handle.
    async fn release(&self, handle: &SubscriptionHandle) -> Result<()>;
}
