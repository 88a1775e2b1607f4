//! Use-case layer of the Trellis sync engine.
//!
//! Composes the domain layer into the running engine: session bootstrap,
//! the exactly-once data loading gate, and the realtime subscription
//! lifecycle. The presentation layer drives everything through the session
//! watch channel and the engine's action methods, and observes state
//! through store snapshots and the engine event stream.

pub mod bootstrap;
pub mod engine;
pub mod event;
pub mod gate;
pub mod lifecycle;
pub mod navigator;

pub use bootstrap::{BootstrapOutcome, SessionBootstrap};
pub use engine::{Stores, SyncEngine};
pub use event::EngineEvent;
pub use gate::LoadGate;
pub use lifecycle::SubscriptionLifecycle;
pub use navigator::{Navigator, View};
