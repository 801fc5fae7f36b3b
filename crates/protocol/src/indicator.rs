//! Crash-resilient activity view over the persisted anchor.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use samovar_hub::{EntityId, StateRegistry, StateStore};

use crate::anchor::RuntimeAnchor;
use crate::engine::SWITCH_ON;
use crate::error::Result;

/// Suggested poll cadence. The view only needs to be roughly current.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// Attributes exposed by [`ProtocolActiveIndicator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorAttributes {
    /// Raw persisted anchor timestamp, as last refreshed from the store.
    pub start_ts: Option<String>,
}

/// Reports whether the keep-warm protocol is active.
///
/// Reads the persisted anchor directly from the store on each refresh,
/// bypassing any in-memory engine copy, so a poll-only consumer still gets
/// a correct answer when the engine instance is gone.
pub struct ProtocolActiveIndicator {
    store: Arc<dyn StateStore>,
    registry: Arc<StateRegistry>,
    keep_warm_switch: EntityId,
    start_ts: RwLock<Option<String>>,
}

impl ProtocolActiveIndicator {
    /// Create an indicator over the given store and switch.
    pub fn new(
        store: Arc<dyn StateStore>,
        registry: Arc<StateRegistry>,
        keep_warm_switch: EntityId,
    ) -> Self {
        Self {
            store,
            registry,
            keep_warm_switch,
            start_ts: RwLock::new(None),
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        "Kettle Keep-Warm Protocol Active"
    }

    /// Stable unique id.
    pub fn unique_id(&self) -> &'static str {
        "kettle_keep_warm_protocol_active"
    }

    /// Device class hint for the host platform.
    pub fn device_class(&self) -> &'static str {
        "running"
    }

    /// Reload the persisted anchor from the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures; the cached value keeps its last state.
    pub async fn refresh(&self) -> Result<()> {
        let record = self.store.load().await?;
        let anchor = RuntimeAnchor::restore(record.as_ref());
        *self.start_ts.write().await = anchor.start_ts().map(str::to_string);
        Ok(())
    }

    /// Active iff the switch is live "on" and the last refresh saw an armed
    /// anchor.
    pub async fn is_on(&self) -> bool {
        let switch_on = self
            .registry
            .get(&self.keep_warm_switch)
            .await
            .is_some_and(|state| state == SWITCH_ON);
        switch_on && self.start_ts.read().await.is_some()
    }

    /// Extra attributes.
    pub async fn attributes(&self) -> IndicatorAttributes {
        IndicatorAttributes {
            start_ts: self.start_ts.read().await.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use samovar_hub::{Hub, InMemoryStateStore, StateRecord};
    use serde_json::Value;

    use crate::anchor::START_TS_KEY;

    fn switch() -> EntityId {
        EntityId::new("switch.kettle_keep_warm").unwrap()
    }

    fn armed_record() -> StateRecord {
        let mut record = StateRecord::new();
        record.insert(
            START_TS_KEY.to_string(),
            Value::String("2024-05-01T12:00:00+00:00".to_string()),
        );
        record
    }

    fn indicator(hub: &Hub, store: Arc<InMemoryStateStore>) -> ProtocolActiveIndicator {
        ProtocolActiveIndicator::new(
            store as Arc<dyn StateStore>,
            Arc::clone(&hub.registry),
            switch(),
        )
    }

    #[tokio::test]
    async fn should_be_off_before_any_refresh() {
        let hub = Hub::new();
        let store = InMemoryStateStore::new_arc();
        hub.registry.set(switch(), "on").await;

        let ind = indicator(&hub, store);
        assert!(!ind.is_on().await);
    }

    #[tokio::test]
    async fn should_require_both_switch_and_anchor() {
        let hub = Hub::new();
        let store = InMemoryStateStore::new_arc();
        store.save(&armed_record()).await.unwrap();

        let ind = indicator(&hub, Arc::clone(&store));
        ind.refresh().await.unwrap();

        // Anchor present but switch not on.
        assert!(!ind.is_on().await);

        hub.registry.set(switch(), "on").await;
        assert!(ind.is_on().await);

        hub.registry.set(switch(), "off").await;
        assert!(!ind.is_on().await);
    }

    #[tokio::test]
    async fn should_track_store_across_refreshes() {
        let hub = Hub::new();
        let store = InMemoryStateStore::new_arc();
        hub.registry.set(switch(), "on").await;

        let ind = indicator(&hub, Arc::clone(&store));

        store.save(&armed_record()).await.unwrap();
        ind.refresh().await.unwrap();
        assert!(ind.is_on().await);
        assert_eq!(
            ind.attributes().await.start_ts.as_deref(),
            Some("2024-05-01T12:00:00+00:00")
        );

        // Anchor cleared on disk; the next poll observes it.
        let mut cleared = StateRecord::new();
        cleared.insert(START_TS_KEY.to_string(), Value::Null);
        store.save(&cleared).await.unwrap();
        ind.refresh().await.unwrap();
        assert!(!ind.is_on().await);
        assert_eq!(ind.attributes().await.start_ts, None);
    }

    #[tokio::test]
    async fn test_entity_metadata() {
        let hub = Hub::new();
        let ind = indicator(&hub, InMemoryStateStore::new_arc());

        assert_eq!(ind.name(), "Kettle Keep-Warm Protocol Active");
        assert_eq!(ind.unique_id(), "kettle_keep_warm_protocol_active");
        assert_eq!(ind.device_class(), "running");
    }
}
