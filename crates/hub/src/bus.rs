//! State-change bus for pub/sub entity notifications.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entity::{EntityId, StateChange};
use crate::error::{Error, Result};

/// Buffered changes per subscriber before the oldest are dropped.
const SUBSCRIBER_CHANNEL_CAPACITY: usize = 64;

/// Unique identifier for a bus subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    fn new() -> Self {
        Self(format!("sub-{}", Uuid::new_v4()))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-subscriber delivery state.
struct Subscriber {
    sender: broadcast::Sender<StateChange>,
    entities: HashSet<EntityId>,
}

/// Handle for receiving state changes.
pub struct StateChangeSubscription {
    receiver: broadcast::Receiver<StateChange>,
}

impl StateChangeSubscription {
    /// Receive the next state change.
    ///
    /// A lagged receiver skips the dropped notifications and keeps going;
    /// consumers re-read live state on their next evaluation, so drops are
    /// recoverable. A closed channel is terminal.
    pub async fn recv(&mut self) -> Result<StateChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Ok(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "State-change subscriber lagged, notifications dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(Error::ChannelClosed),
            }
        }
    }

    /// Try to receive a state change without waiting.
    pub fn try_recv(&mut self) -> Result<StateChange> {
        self.receiver.try_recv().map_err(|_| Error::ChannelClosed)
    }
}

/// Fan-out bus delivering entity state changes to interested subscribers.
///
/// Each subscriber names the entity set it watches; changes for other
/// entities are never delivered to it.
#[derive(Default)]
pub struct StateChangeBus {
    subscribers: RwLock<HashMap<SubscriptionId, Subscriber>>,
}

impl StateChangeBus {
    /// Create a new bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a state change to every subscriber watching the entity.
    pub async fn publish(&self, change: StateChange) {
        let subscribers = self.subscribers.read().await;
        for (id, sub) in subscribers
            .iter()
            .filter(|(_, sub)| sub.entities.contains(&change.entity_id))
        {
            if sub.sender.send(change.clone()).is_err() {
                // Receiver dropped without unsubscribing; delivery skipped.
                debug!(
                    subscription = %id,
                    entity_id = %change.entity_id,
                    "Subscriber gone, delivery skipped"
                );
            }
        }
    }

    /// Subscribe to state changes for a set of entities.
    pub async fn subscribe(
        &self,
        entity_ids: &[EntityId],
    ) -> (SubscriptionId, StateChangeSubscription) {
        let (sender, receiver) = broadcast::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        let id = SubscriptionId::new();

        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(
            id.clone(),
            Subscriber {
                sender,
                entities: entity_ids.iter().cloned().collect(),
            },
        );
        debug!(subscription = %id, entities = entity_ids.len(), "Subscription added");

        (id, StateChangeSubscription { receiver })
    }

    /// Remove a subscription.
    pub async fn unsubscribe(&self, id: &SubscriptionId) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.remove(id);
    }

    /// Number of live subscriptions.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}
