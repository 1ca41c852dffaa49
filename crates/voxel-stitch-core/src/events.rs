use crate::model::Slot;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Progress notifications posted by the atlas builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StitchEvent {
    /// A texture's pixels were copied into its slot.
    Added { name: String, slot: Slot },
    /// A texture could not be loaded; its slot keeps the background fill.
    LoadFailed {
        name: String,
        slot: Slot,
        error: String,
    },
    /// The current stitch is complete. Posted at most once per stitch.
    AllAdded { loaded: usize, failed: usize },
}

/// Fans events out to every live subscriber.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    subscribers: Vec<UnboundedSender<StitchEvent>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// New receiver that sees every event emitted from now on.
    pub fn subscribe(&mut self) -> UnboundedReceiver<StitchEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event` to all subscribers, dropping those whose receiver is gone.
    pub fn emit(&mut self, event: StitchEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_receivers_are_pruned() {
        let mut events = EventDispatcher::new();
        let mut kept = events.subscribe();
        let dropped = events.subscribe();
        drop(dropped);
        events.emit(StitchEvent::AllAdded {
            loaded: 0,
            failed: 0,
        });
        assert_eq!(events.subscriber_count(), 1);
        assert_eq!(
            kept.try_recv().unwrap(),
            StitchEvent::AllAdded {
                loaded: 0,
                failed: 0
            }
        );
    }
}
