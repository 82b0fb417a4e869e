//! In-process event bus between the progress engine and the notifier.

use tokio::sync::broadcast;

use crate::model::event::PacteEvent;

/// Default number of events a slow subscriber may fall behind before it lags.
pub const DEFAULT_CAPACITY: usize = 256;

/// Fan-out channel for `PacteEvent`s.
///
/// Publishing never blocks and never fails; events published while nobody listens
/// are dropped.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PacteEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PacteEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: PacteEvent) {
        tracing::debug!("Publishing {} for pacte {}", event.kind.name(), event.pacte_id);
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
