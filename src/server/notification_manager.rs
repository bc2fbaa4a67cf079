use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

/// Named notification topics. Publishes carry no payload; subscribers
/// re-fetch current state, so repeated or out-of-order delivery is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeTopic {
    AuthChanged,
    ProfileChanged,
    UsageChanged,
    ConfigChanged,
}

impl ChangeTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeTopic::AuthChanged => "auth.changed",
            ChangeTopic::ProfileChanged => "profile.changed",
            ChangeTopic::UsageChanged => "usage.changed",
            ChangeTopic::ConfigChanged => "config.changed",
        }
    }
}

/// Sender handle for a single subscriber
pub type ChangeSender = mpsc::Sender<ChangeTopic>;

const SUBSCRIBER_BUFFER: usize = 16;

/// Topic-based publish/subscribe fabric for state change notifications.
/// Delivery is fire-and-forget, at-most-once per subscriber per publish,
/// with no replay or history.
#[derive(Clone)]
pub struct NotificationManager {
    // topic -> subscriber key -> sender
    subscribers: Arc<Mutex<HashMap<ChangeTopic, HashMap<String, ChangeSender>>>>,
}

impl NotificationManager {
    /// Create a new NotificationManager instance
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a subscriber on a topic. Returns the subscriber key (for
    /// later unsubscription) and the receiving end of the channel.
    pub async fn subscribe(&self, topic: ChangeTopic) -> (String, mpsc::Receiver<ChangeTopic>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let key = uuid::Uuid::new_v4().to_string();

        let mut subscribers = self.subscribers.lock().await;
        subscribers
            .entry(topic)
            .or_insert_with(HashMap::new)
            .insert(key.clone(), tx);

        debug!("Subscriber {} registered on {}", key, topic.as_str());
        (key, rx)
    }

    /// Remove a subscriber from a topic. Returns whether it was present.
    pub async fn unsubscribe(&self, topic: ChangeTopic, key: &str) -> bool {
        let mut subscribers = self.subscribers.lock().await;
        subscribers
            .get_mut(&topic)
            .map(|subs| subs.remove(key).is_some())
            .unwrap_or(false)
    }

    /// Publish a change on a topic. Subscribers whose channels are closed
    /// are pruned; subscribers with full buffers are skipped (at-most-once,
    /// never blocking the publisher). Returns the number of deliveries.
    pub async fn publish(&self, topic: ChangeTopic) -> usize {
        let mut subscribers = self.subscribers.lock().await;

        let Some(subs) = subscribers.get_mut(&topic) else {
            return 0;
        };

        let mut delivered = 0;
        let mut dead = Vec::new();

        for (key, sender) in subs.iter() {
            match sender.try_send(topic) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Closed(_)) => dead.push(key.clone()),
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        "Dropping {} notification for slow subscriber {}",
                        topic.as_str(),
                        key
                    );
                }
            }
        }

        for key in dead {
            subs.remove(&key);
            debug!("Pruned closed subscriber {} from {}", key, topic.as_str());
        }

        debug!(
            "Published {} to {} subscriber(s)",
            topic.as_str(),
            delivered
        );
        delivered
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_all_topic_subscribers() {
        let manager = NotificationManager::new();
        let (_k1, mut rx1) = manager.subscribe(ChangeTopic::UsageChanged).await;
        let (_k2, mut rx2) = manager.subscribe(ChangeTopic::UsageChanged).await;
        let (_k3, mut rx3) = manager.subscribe(ChangeTopic::ConfigChanged).await;

        let delivered = manager.publish(ChangeTopic::UsageChanged).await;
        assert_eq!(delivered, 2);

        assert_eq!(rx1.recv().await, Some(ChangeTopic::UsageChanged));
        assert_eq!(rx2.recv().await, Some(ChangeTopic::UsageChanged));
        assert!(rx3.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let manager = NotificationManager::new();
        let (key, mut rx) = manager.subscribe(ChangeTopic::AuthChanged).await;

        assert!(manager.unsubscribe(ChangeTopic::AuthChanged, &key).await);
        assert!(!manager.unsubscribe(ChangeTopic::AuthChanged, &key).await);

        let delivered = manager.publish(ChangeTopic::AuthChanged).await;
        assert_eq!(delivered, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned_on_publish() {
        let manager = NotificationManager::new();
        let (_key, rx) = manager.subscribe(ChangeTopic::ProfileChanged).await;
        drop(rx);

        assert_eq!(manager.publish(ChangeTopic::ProfileChanged).await, 0);
        // Second publish sees an empty subscriber map
        assert_eq!(manager.publish(ChangeTopic::ProfileChanged).await, 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_does_not_block_publisher() {
        let manager = NotificationManager::new();
        let (_key, mut rx) = manager.subscribe(ChangeTopic::UsageChanged).await;

        // Overfill the buffer; extra publishes are dropped, not queued
        for _ in 0..(SUBSCRIBER_BUFFER + 5) {
            manager.publish(ChangeTopic::UsageChanged).await;
        }

        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, SUBSCRIBER_BUFFER);
    }
}
