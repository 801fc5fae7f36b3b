//! Property-based tests for the countdown projection and the
//! switch/anchor agreement invariant.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use samovar_hub::{
    Clock, ConfigEntry, EntityId, Hub, InMemoryStateStore, ManualClock, StateChange, StateStore,
};
use samovar_protocol::{KeepWarmEngine, ProtocolConfig};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn switch() -> EntityId {
    EntityId::new("switch.kettle_keep_warm").unwrap()
}

fn entry(max_minutes: u32) -> ConfigEntry {
    ConfigEntry::new("abc123", "Kettle Protocol")
        .with_field("temp_sensor", "sensor.kettle_temperature")
        .with_field("status_sensor", "sensor.kettle_status")
        .with_field("start_switch", "switch.kettle_start")
        .with_field("keep_warm_switch", "switch.kettle_keep_warm")
        .with_field("max_minutes", max_minutes)
}

fn fixture(max_minutes: u32) -> (Arc<KeepWarmEngine>, Hub, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let hub = Hub::builder()
        .with_clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .build();
    let config = ProtocolConfig::from_entry(&entry(max_minutes)).unwrap();
    let engine = Arc::new(KeepWarmEngine::new(
        &hub,
        InMemoryStateStore::new_arc() as Arc<dyn StateStore>,
        config,
    ));
    (engine, hub, clock)
}

// ==========================================================================
// PROPERTY: Countdown is exact, bounded, and monotone non-increasing
// ==========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_countdown_monotone_and_bounded(
        max_minutes in 1u32..120,
        mut offsets in proptest::collection::vec(0i64..14_400, 1..32),
    ) {
        offsets.sort_unstable();

        let rt = tokio::runtime::Runtime::new().unwrap();
        let samples: Vec<(i64, i64)> = rt.block_on(async {
            let (engine, hub, clock) = fixture(max_minutes);

            hub.registry.set(switch(), "on").await;
            engine
                .handle_state_change(&StateChange::new(switch(), "on"))
                .await
                .unwrap();

            let mut samples = Vec::with_capacity(offsets.len());
            for &offset in &offsets {
                clock.set(t0() + Duration::seconds(offset));
                let remaining = engine.remaining().await.unwrap();
                samples.push((offset, remaining.num_seconds()));
            }
            samples
        });

        let cap = i64::from(max_minutes) * 60;
        for &(offset, remaining) in &samples {
            prop_assert!(remaining >= 0, "never negative (offset {offset})");
            prop_assert!(remaining <= cap, "never above the cap (offset {offset})");
            prop_assert_eq!(remaining, (cap - offset).max(0), "exact countdown");
        }
        for pair in samples.windows(2) {
            prop_assert!(
                pair[1].1 <= pair[0].1,
                "remaining must not increase as time passes"
            );
        }
    }

    #[test]
    fn prop_mmss_rendering_matches_remaining(
        max_minutes in 1u32..120,
        offset in 0i64..14_400,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let rendered = rt.block_on(async {
            let (engine, hub, clock) = fixture(max_minutes);

            hub.registry.set(switch(), "on").await;
            engine
                .handle_state_change(&StateChange::new(switch(), "on"))
                .await
                .unwrap();

            clock.set(t0() + Duration::seconds(offset));
            engine.remaining_mmss().await.unwrap()
        });

        let secs = (i64::from(max_minutes) * 60 - offset).max(0);
        prop_assert_eq!(rendered, format!("{:02}:{:02}", secs / 60, secs % 60));
    }
}

// ==========================================================================
// PROPERTY: is_active iff the last transition was "on" and an anchor exists
// ==========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_activity_follows_last_switch_transition(
        transitions in proptest::collection::vec(prop::bool::ANY, 1..24),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (active, anchored, last_on) = rt.block_on(async {
            let (engine, hub, _clock) = fixture(30);

            let mut last_on = false;
            for &on in &transitions {
                let value = if on { "on" } else { "off" };
                hub.registry.set(switch(), value).await;
                engine
                    .handle_state_change(&StateChange::new(switch(), value))
                    .await
                    .unwrap();
                last_on = on;
            }

            let anchored = engine.remaining().await.is_some();
            (engine.is_active().await, anchored, last_on)
        });

        prop_assert_eq!(active, last_on, "activity tracks the last transition");
        prop_assert_eq!(anchored, last_on, "anchor and switch state agree");
    }
}
