//! Pull-based projection sensors over the engine.
//!
//! Both views are stateless: every read queries the engine, nothing is
//! cached, and they never push.

use std::sync::Arc;

use serde::Serialize;

use crate::engine::KeepWarmEngine;

/// Placeholder shown when no countdown is available.
pub const NO_REMAINING: &str = "\u{2014}";

/// Icon while the protocol is armed.
pub const ICON_ACTIVE: &str = "mdi:timer-sand";
/// Icon while idle.
pub const ICON_IDLE: &str = "mdi:timer-outline";

/// Attributes exposed by [`StatusLiveSensor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusAttributes {
    /// Whether the keep-warm protocol is armed and the switch is on.
    pub protocol_active: bool,
    /// Configured keep-warm cap in minutes.
    pub max_minutes: u32,
    /// Countdown as `MM:SS`, or an em dash when unavailable.
    pub remaining: String,
}

/// Live kettle status with an optional countdown.
pub struct StatusLiveSensor {
    engine: Arc<KeepWarmEngine>,
}

impl StatusLiveSensor {
    /// Create a view over the engine.
    pub fn new(engine: Arc<KeepWarmEngine>) -> Self {
        Self { engine }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        "Kettle Status (Live)"
    }

    /// Stable unique id.
    pub fn unique_id(&self) -> &'static str {
        "kettle_status_live"
    }

    /// Primary value: the engine's live status label.
    pub async fn state(&self) -> String {
        self.engine.status_live().await
    }

    /// Extra attributes recomputed per read.
    pub async fn attributes(&self) -> StatusAttributes {
        StatusAttributes {
            protocol_active: self.engine.is_active().await,
            max_minutes: self.engine.config().max_minutes,
            remaining: self
                .engine
                .remaining_mmss()
                .await
                .unwrap_or_else(|| NO_REMAINING.to_string()),
        }
    }
}

/// Remaining keep-warm time as `MM:SS`.
pub struct RemainingSensor {
    engine: Arc<KeepWarmEngine>,
}

impl RemainingSensor {
    /// Create a view over the engine.
    pub fn new(engine: Arc<KeepWarmEngine>) -> Self {
        Self { engine }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        "Kettle Keep-Warm Remaining"
    }

    /// Stable unique id.
    pub fn unique_id(&self) -> &'static str {
        "kettle_keep_warm_remaining"
    }

    /// Primary value: countdown or em dash.
    pub async fn state(&self) -> String {
        self.engine
            .remaining_mmss()
            .await
            .unwrap_or_else(|| NO_REMAINING.to_string())
    }

    /// Icon hint, different while the protocol is armed.
    pub async fn icon(&self) -> &'static str {
        if self.engine.is_active().await {
            ICON_ACTIVE
        } else {
            ICON_IDLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use samovar_hub::{
        Clock, ConfigEntry, EntityId, Hub, InMemoryStateStore, ManualClock, StateStore,
    };

    use crate::config::{
        CONF_KEEP_WARM_SWITCH, CONF_START_SWITCH, CONF_STATUS_SENSOR, CONF_TEMP_SENSOR,
        ProtocolConfig,
    };

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    async fn fixture() -> (Arc<KeepWarmEngine>, Hub, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let hub = Hub::builder()
            .with_clock(Arc::clone(&clock) as Arc<dyn Clock>)
            .build();

        let entry = ConfigEntry::new("abc123", "Kettle Protocol")
            .with_field(CONF_TEMP_SENSOR, "sensor.kettle_temperature")
            .with_field(CONF_STATUS_SENSOR, "sensor.kettle_status")
            .with_field(CONF_START_SWITCH, "switch.kettle_start")
            .with_field(CONF_KEEP_WARM_SWITCH, "switch.kettle_keep_warm");
        let config = ProtocolConfig::from_entry(&entry).unwrap();
        let engine = Arc::new(KeepWarmEngine::new(
            &hub,
            InMemoryStateStore::new_arc() as Arc<dyn StateStore>,
            config,
        ));
        (engine, hub, clock)
    }

    async fn arm(engine: &Arc<KeepWarmEngine>, hub: &Hub) {
        let switch = EntityId::new("switch.kettle_keep_warm").unwrap();
        hub.registry.set(switch.clone(), "on").await;
        engine
            .handle_state_change(&samovar_hub::StateChange::new(switch, "on"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn should_show_placeholder_when_idle() {
        let (engine, _hub, _clock) = fixture().await;
        let remaining = RemainingSensor::new(Arc::clone(&engine));

        assert_eq!(remaining.state().await, NO_REMAINING);
        assert_eq!(remaining.icon().await, ICON_IDLE);
    }

    #[tokio::test]
    async fn should_show_countdown_and_active_icon_when_armed() {
        let (engine, hub, clock) = fixture().await;
        arm(&engine, &hub).await;
        clock.advance(Duration::seconds(30 * 60 - 95));

        let remaining = RemainingSensor::new(Arc::clone(&engine));
        assert_eq!(remaining.state().await, "01:35");
        assert_eq!(remaining.icon().await, ICON_ACTIVE);
    }

    #[tokio::test]
    async fn should_expose_status_attributes() {
        let (engine, hub, _clock) = fixture().await;
        let status = StatusLiveSensor::new(Arc::clone(&engine));

        let attrs = status.attributes().await;
        assert!(!attrs.protocol_active);
        assert_eq!(attrs.max_minutes, 30);
        assert_eq!(attrs.remaining, NO_REMAINING);

        arm(&engine, &hub).await;
        let attrs = status.attributes().await;
        assert!(attrs.protocol_active);
        assert_eq!(attrs.remaining, "30:00");
    }

    #[tokio::test]
    async fn should_mirror_engine_status_label() {
        let (engine, hub, _clock) = fixture().await;
        let status_sensor = EntityId::new("sensor.kettle_status").unwrap();
        hub.registry.set(status_sensor, "heating").await;

        let status = StatusLiveSensor::new(Arc::clone(&engine));
        assert_eq!(status.state().await, "Heating");
    }

    #[tokio::test]
    async fn test_entity_metadata() {
        let (engine, _hub, _clock) = fixture().await;
        let status = StatusLiveSensor::new(Arc::clone(&engine));
        let remaining = RemainingSensor::new(Arc::clone(&engine));

        assert_eq!(status.name(), "Kettle Status (Live)");
        assert_eq!(status.unique_id(), "kettle_status_live");
        assert_eq!(remaining.name(), "Kettle Keep-Warm Remaining");
        assert_eq!(remaining.unique_id(), "kettle_keep_warm_remaining");
    }

    #[test]
    fn test_attributes_serialize_with_expected_keys() {
        let attrs = StatusAttributes {
            protocol_active: true,
            max_minutes: 30,
            remaining: "01:35".to_string(),
        };
        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json["protocol_active"], true);
        assert_eq!(json["max_minutes"], 30);
        assert_eq!(json["remaining"], "01:35");
    }
}
