//! Engine events surfaced to the presentation layer.

use serde::Serialize;

use trellis_core::TrellisError;
use trellis_core::collection::Collection;

/// Events the engine pushes to the presentation layer.
///
/// Delivered over an unbounded channel; the presentation layer decides how
/// to render them (retry affordances for failed loads, a degraded badge for
/// collections without a live feed).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// All six collections were loaded and installed.
    BulkLoadCompleted,
    /// The bulk load failed; the gate was reset so a retry can run.
    BulkLoadFailed { error: TrellisError },
    /// One collection's realtime channel could not be opened. The other
    /// channels and the already-loaded data remain usable.
    ChannelDegraded {
        collection: Collection,
        error: TrellisError,
    },
    /// All realtime channels were released.
    SubscriptionsClosed,
}
