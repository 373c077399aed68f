//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`RosterEvent`]s. It is
//! designed to be shared via `Arc<EventBus>`; subscribing to the bus is how
//! external consumers observe identity changes and roster mutations.

use serde::Serialize;
use tokio::sync::broadcast;

use classpoints_core::types::UserId;
use classpoints_core::user::User;

// ---------------------------------------------------------------------------
// RosterEvent
// ---------------------------------------------------------------------------

/// A domain event emitted by the engine after a successful operation.
///
/// The vocabulary is closed, so events are a typed enum rather than a
/// stringly envelope. Serializes with a `type` discriminant for consumers
/// that forward events as JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RosterEvent {
    /// An external identity resolved to a roster record (found or created).
    IdentityResolved { user: User },

    /// The identity provider signalled sign-out. No roster mutation.
    SignedOut { user_id: UserId },

    /// A points change was applied and its transaction recorded.
    PointsApplied {
        user_id: UserId,
        transaction_id: String,
        points_change: i64,
        new_total: i64,
    },

    /// A user's avatar configuration was replaced.
    AvatarUpdated { user_id: UserId },

    /// A learner became a facilitator.
    RolePromoted { user_id: UserId },

    /// A write could not be durably persisted; the local cache holds it.
    PersistenceDegraded { operation: String, detail: String },
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`RosterEvent`].
pub struct EventBus {
    sender: broadcast::Sender<RosterEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: RosterEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
