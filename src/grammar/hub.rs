//! In-process delivery of grammar feedback to SSE subscribers
//!
//! One watch channel per user message. The grammar task publishes exactly one
//! value; a subscriber observes it whether it subscribed before or while the
//! task was running. Subscribers that arrive after the value was published
//! read the persisted row instead, so handlers must subscribe before checking
//! the database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use uuid::Uuid;

use crate::grammar::types::GrammarFeedback;

type Slot = watch::Sender<Option<GrammarFeedback>>;

/// Registry of pending feedback channels, keyed by user-message id
#[derive(Clone, Default)]
pub struct FeedbackHub {
    slots: Arc<Mutex<HashMap<Uuid, Slot>>>,
}

impl FeedbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the feedback for a message, creating the channel if the
    /// publisher has not arrived yet
    pub fn subscribe(&self, message_id: Uuid) -> watch::Receiver<Option<GrammarFeedback>> {
        let mut slots = self.slots.lock().expect("feedback hub lock poisoned");
        slots
            .entry(message_id)
            .or_insert_with(|| watch::channel(None).0)
            .subscribe()
    }

    /// Publish the feedback for a message and retire its channel
    ///
    /// Receivers obtained before this call still observe the value; the entry
    /// itself is dropped so the map does not grow with completed messages.
    pub fn publish(&self, message_id: Uuid, feedback: GrammarFeedback) {
        let sender = {
            let mut slots = self.slots.lock().expect("feedback hub lock poisoned");
            slots.remove(&message_id)
        };
        if let Some(sender) = sender {
            // Send fails only when every receiver is gone; late subscribers
            // read the persisted row instead.
            let _ = sender.send(Some(feedback));
        }
    }

    /// Drop a subscriber-created channel that turned out to be unnecessary
    /// (the feedback was already persisted when the handler looked)
    pub fn prune(&self, message_id: Uuid) {
        let mut slots = self.slots.lock().expect("feedback hub lock poisoned");
        if let Some(sender) = slots.get(&message_id) {
            if sender.receiver_count() == 0 {
                slots.remove(&message_id);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::types::GrammarAnalysis;

    fn feedback_for(message_id: Uuid) -> GrammarFeedback {
        GrammarFeedback::from_analysis(message_id, "some text", &GrammarAnalysis::clean())
    }

    #[tokio::test]
    async fn test_subscriber_before_publish_sees_value() {
        let hub = FeedbackHub::new();
        let message_id = Uuid::new_v4();

        let mut rx = hub.subscribe(message_id);
        hub.publish(message_id, feedback_for(message_id));

        rx.changed().await.expect("value should arrive");
        let value = rx.borrow().clone();
        assert_eq!(value.unwrap().message_id, message_id);
    }

    #[tokio::test]
    async fn test_publish_retires_entry() {
        let hub = FeedbackHub::new();
        let message_id = Uuid::new_v4();

        let _rx = hub.subscribe(message_id);
        assert_eq!(hub.len(), 1);

        hub.publish(message_id, feedback_for(message_id));
        assert_eq!(hub.len(), 0);
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_silent() {
        let hub = FeedbackHub::new();
        let message_id = Uuid::new_v4();

        hub.publish(message_id, feedback_for(message_id));
        assert_eq!(hub.len(), 0);
    }

    #[tokio::test]
    async fn test_prune_removes_abandoned_entry() {
        let hub = FeedbackHub::new();
        let message_id = Uuid::new_v4();

        let rx = hub.subscribe(message_id);
        drop(rx);
        hub.prune(message_id);
        assert_eq!(hub.len(), 0);
    }

    #[tokio::test]
    async fn test_prune_keeps_live_entry() {
        let hub = FeedbackHub::new();
        let message_id = Uuid::new_v4();

        let _rx = hub.subscribe(message_id);
        hub.prune(message_id);
        assert_eq!(hub.len(), 1);
    }
}
