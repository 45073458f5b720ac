//! Change notifications.
//!
//! The repository broadcasts an event after initialization, after every
//! mutation, and after a reset. Consumers subscribe and re-read whatever
//! collections they display; events carry no data beyond what changed.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::entity::CollectionKind;

/// Buffered events per subscriber before the slowest one starts lagging.
pub const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "collection", rename_all = "snake_case")]
pub enum RepositoryEvent {
    /// Initial load finished; collections are populated.
    Ready,
    /// One collection was mutated.
    Changed(CollectionKind),
    /// All collections were restored to their defaults.
    Reset,
}

/// Broadcast fan-out for [`RepositoryEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RepositoryEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RepositoryEvent> {
        self.tx.subscribe()
    }

    /// Emit to all current subscribers. Having none is fine.
    pub fn emit(&self, event: RepositoryEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CAPACITY)
    }
}
