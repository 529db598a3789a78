//! Mutation event bus.
//!
//! Upload and delete operations publish a "mutation completed" event; any
//! interested consumer (result-list controller, stats display) subscribes
//! independently instead of being wired through callbacks.

use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// A server-side mutation the client has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationEvent {
    /// A batch upload finished successfully.
    UploadCompleted {
        success_count: usize,
        deduplicated_count: usize,
    },
    /// One or more files were deleted.
    FilesDeleted { deleted_count: usize },
}

/// Broadcast bus for [`MutationEvent`]. Cheap to clone; subscribers that
/// lag simply miss old events, which is fine because every consumer
/// re-fetches current server state rather than replaying history.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<MutationEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: MutationEvent) {
        let receivers = self.tx.send(event).unwrap_or(0);
        tracing::debug!(?event, receivers, "mutation event published");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MutationEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
