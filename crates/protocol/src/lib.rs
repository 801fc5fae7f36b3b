//! Keep-warm coordination for a smart-home kettle.
//!
//! This crate layers a safety protocol over a kettle's keep-warm switch:
//!
//! - **Engine**: anchors a start timestamp when the switch turns on,
//!   persists it, and forces the switch off when the configured cap is
//!   exceeded or the status sensor reports an abort value
//! - **Projection sensors**: pull-based live-status and remaining-time
//!   views over the engine
//! - **Activity indicator**: a slow-poll view reading the persisted anchor
//!   directly from the store, usable even without the engine instance
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use samovar_hub::{ConfigEntry, Hub, InMemoryStateStore};
//! use samovar_protocol::setup_entry;
//!
//! #[tokio::main]
//! async fn main() {
//!     let hub = Hub::new();
//!     let entry = ConfigEntry::new("kitchen", "Kettle Protocol")
//!         .with_field("temp_sensor", "sensor.kettle_temperature")
//!         .with_field("status_sensor", "sensor.kettle_status")
//!         .with_field("start_switch", "switch.kettle_start")
//!         .with_field("keep_warm_switch", "switch.kettle_keep_warm");
//!
//!     let handle = setup_entry(&hub, &entry, InMemoryStateStore::new_arc())
//!         .await
//!         .unwrap();
//!
//!     println!("{}", handle.status.state().await);
//!     handle.shutdown().await;
//! }
//! ```

pub mod anchor;
pub mod config;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod sensors;
pub mod setup;

// Re-export main types
pub use anchor::{RuntimeAnchor, START_TS_KEY};
pub use config::{parse_abort_statuses, ProtocolConfig};
pub use engine::{KeepWarmEngine, ACTIVE_TICK_SECONDS, IDLE_TICK_SECONDS};
pub use error::{Error, Result};
pub use indicator::{IndicatorAttributes, ProtocolActiveIndicator, SCAN_INTERVAL};
pub use sensors::{RemainingSensor, StatusAttributes, StatusLiveSensor, NO_REMAINING};
pub use setup::{setup_entry, store_key_for_entry, ProtocolHandle, DOMAIN, STORE_KEY, STORE_VERSION};
