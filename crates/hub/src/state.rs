//! Live entity state registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::bus::StateChangeBus;
use crate::entity::{EntityId, StateChange};

/// Live states of hub entities.
///
/// Reads of a missing entity return `None`, never an error; consumers pick
/// their own safe default. Writes publish the change on the bus.
pub struct StateRegistry {
    states: RwLock<HashMap<EntityId, String>>,
    bus: Arc<StateChangeBus>,
}

impl StateRegistry {
    /// Create a registry publishing on the given bus.
    pub fn new(bus: Arc<StateChangeBus>) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            bus,
        }
    }

    /// Current state of an entity, if it has one.
    pub async fn get(&self, entity_id: &EntityId) -> Option<String> {
        self.states.read().await.get(entity_id).cloned()
    }

    /// Set an entity's state and publish the change.
    pub async fn set(&self, entity_id: EntityId, value: impl Into<String>) {
        let value = value.into();
        {
            let mut states = self.states.write().await;
            states.insert(entity_id.clone(), value.clone());
        }
        debug!(entity_id = %entity_id, value = %value, "Entity state set");
        self.bus.publish(StateChange::new(entity_id, value)).await;
    }

    /// Remove an entity and publish a removal notification.
    pub async fn remove(&self, entity_id: &EntityId) {
        let removed = self.states.write().await.remove(entity_id).is_some();
        if removed {
            debug!(entity_id = %entity_id, "Entity removed");
            self.bus.publish(StateChange::removed(entity_id.clone())).await;
        }
    }

    /// The bus this registry publishes on.
    pub fn bus(&self) -> &Arc<StateChangeBus> {
        &self.bus
    }
}
