//! Session bootstrap controller.
//!
//! Resolves the caller's authentication state at process start, from the
//! persisted cache when possible and from a live check otherwise, and
//! publishes the canonical session over a watch channel for the rest of the
//! engine to observe.
//!
//! The persisted cache is a latency optimization: a well-formed cached
//! session is adopted immediately (so the bulk load can start without a
//! network round-trip), while a live check still runs in the background and
//! demotes the session if the backend disagrees.

use std::sync::Arc;

use tokio::sync::watch;

use trellis_core::backend::AuthBackend;
use trellis_core::session::{PersistedSessionRecord, Session, SessionCache};

use crate::navigator::{Navigator, View};

/// How the initial session was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOutcome {
    /// The session that was published.
    pub session: Session,
    /// True when the session came from the persisted cache (a background
    /// live check is still pending in that case).
    pub adopted_from_cache: bool,
}

/// Resolves and publishes the canonical session.
///
/// `SessionBootstrap` is responsible for:
/// - Reading and validating the persisted session slot
/// - Running the live authentication check (fail-closed on transport errors)
/// - Normalizing corrupted session state and clearing the slot it came from
/// - Publishing every session transition over a watch channel
/// - Redirecting to the entry view when a session ends on a protected view
pub struct SessionBootstrap {
    /// Persisted session slot
    cache: Arc<dyn SessionCache>,
    /// Live authentication check
    auth: Arc<dyn AuthBackend>,
    /// Routing boundary for the signed-out redirect
    navigator: Arc<dyn Navigator>,
    /// Canonical session publication
    session_tx: watch::Sender<Session>,
}

impl SessionBootstrap {
    /// Creates the controller and the receiver for the canonical session.
    ///
    /// The channel starts at the unauthenticated session; nothing is
    /// published until [`SessionBootstrap::start`] runs.
    pub fn new(
        cache: Arc<dyn SessionCache>,
        auth: Arc<dyn AuthBackend>,
        navigator: Arc<dyn Navigator>,
    ) -> (Arc<Self>, watch::Receiver<Session>) {
        let (session_tx, session_rx) = watch::channel(Session::unauthenticated());
        (
            Arc::new(Self {
                cache,
                auth,
                navigator,
                session_tx,
            }),
            session_rx,
        )
    }

    /// A fresh receiver for the canonical session.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session_tx.subscribe()
    }

    /// The session as currently published.
    pub fn current(&self) -> Session {
        self.session_tx.borrow().clone()
    }

    /// Resolves the initial session.
    ///
    /// A well-formed persisted record claiming authentication with both
    /// identity fields is adopted immediately and confirmed in the
    /// background. Anything else (absent slot, parse failure, missing
    /// identity) is discarded and resolved through a live check. A live
    /// transport failure resolves to unauthenticated; the state is never
    /// left unknown.
    pub async fn start(self: &Arc<Self>) -> BootstrapOutcome {
        match self.cache.read() {
            Some(record) if record.is_adoptable() => {
                let session = record.session;
                tracing::info!(
                    "[Bootstrap] Adopted persisted session for profile {:?}",
                    session.profile_id
                );
                self.publish(session.clone());

                // The cache may be stale; confirm against the backend
                // without holding up the bulk load.
                let controller = Arc::clone(self);
                let adopted = session.clone();
                tokio::spawn(async move {
                    controller.confirm_adopted(&adopted).await;
                });

                BootstrapOutcome {
                    session,
                    adopted_from_cache: true,
                }
            }
            Some(record) => {
                if record.session.is_corrupted() {
                    tracing::warn!(
                        "[Bootstrap] Persisted session claims authentication without identity, clearing"
                    );
                } else {
                    tracing::info!("[Bootstrap] Persisted session not adoptable, clearing");
                }
                self.cache.clear();
                let session = self.resolve_live().await;
                BootstrapOutcome {
                    session,
                    adopted_from_cache: false,
                }
            }
            None => {
                let session = self.resolve_live().await;
                BootstrapOutcome {
                    session,
                    adopted_from_cache: false,
                }
            }
        }
    }

    /// Ends the session: clears the persisted slot and publishes the
    /// unauthenticated session.
    pub fn sign_out(&self) {
        tracing::info!("[Bootstrap] Signing out");
        self.cache.clear();
        self.publish(Session::unauthenticated());
    }

    /// Runs the live check and publishes its result. Fail-closed: a
    /// transport error resolves to unauthenticated.
    async fn resolve_live(&self) -> Session {
        let session = match self.auth.current_session().await {
            Ok(live) => {
                if live.is_corrupted() {
                    tracing::warn!(
                        "[Bootstrap] Live session is missing identity fields, treating as signed out"
                    );
                    self.cache.clear();
                }
                live.normalized()
            }
            Err(e) => {
                tracing::warn!(
                    "[Bootstrap] Live session check failed, treating as signed out: {}",
                    e
                );
                Session::unauthenticated()
            }
        };

        if session.is_active() {
            self.cache
                .write(&PersistedSessionRecord::new(session.clone(), false));
        }
        self.publish(session.clone());
        session
    }

    /// Background confirmation of a cache-adopted session. The live result
    /// wins on disagreement; a transport failure leaves the adopted session
    /// standing (the cache was written by a previously confirmed bootstrap).
    async fn confirm_adopted(&self, adopted: &Session) {
        match self.auth.current_session().await {
            Ok(live) => {
                let live = live.normalized();
                if live == *adopted {
                    // Agreement; refresh the slot timestamp silently.
                    self.cache
                        .write(&PersistedSessionRecord::new(live, false));
                    return;
                }
                if live.is_active() {
                    tracing::info!("[Bootstrap] Live check replaced the persisted session");
                    self.cache
                        .write(&PersistedSessionRecord::new(live.clone(), false));
                } else {
                    tracing::warn!("[Bootstrap] Live check demoted the persisted session");
                    self.cache.clear();
                }
                self.publish(live);
            }
            Err(e) => {
                tracing::warn!(
                    "[Bootstrap] Background session confirmation failed, keeping adopted session: {}",
                    e
                );
            }
        }
    }

    /// Publishes `session` if it differs from the current value, and applies
    /// the signed-out redirect: an unauthenticated session on a protected
    /// view sends the caller to the entry view.
    fn publish(&self, session: Session) {
        let signed_out = !session.is_authenticated;
        self.session_tx.send_if_modified(|current| {
            if *current == session {
                false
            } else {
                *current = session;
                true
            }
        });

        if signed_out {
            let view = self.navigator.current_view();
            if !view.is_public() {
                tracing::info!("[Bootstrap] Session ended on {:?}, redirecting to sign-in", view);
                self.navigator.go_to(View::SignIn);
            }
        }
    }
}
