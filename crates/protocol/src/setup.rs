//! Per-entry wiring of the keep-warm protocol.

use std::sync::Arc;

use tracing::info;

use samovar_hub::{ConfigEntry, Hub, StateStore};

use crate::config::ProtocolConfig;
use crate::engine::KeepWarmEngine;
use crate::error::Result;
use crate::indicator::ProtocolActiveIndicator;
use crate::sensors::{RemainingSensor, StatusLiveSensor};

/// Integration domain.
pub const DOMAIN: &str = "kettle_protocol";
/// Store-key prefix for persisted runtime state.
pub const STORE_KEY: &str = "kettle_protocol_state";
/// Persisted-schema version.
pub const STORE_VERSION: u32 = 1;

/// Store key for one config entry.
pub fn store_key_for_entry(entry_id: &str) -> String {
    format!("{STORE_KEY}_{entry_id}")
}

/// Everything set up for one config entry.
///
/// Dropping the handle does not stop the engine; call
/// [`shutdown`](ProtocolHandle::shutdown).
pub struct ProtocolHandle {
    /// The running engine.
    pub engine: Arc<KeepWarmEngine>,
    /// Live-status projection.
    pub status: StatusLiveSensor,
    /// Remaining-time projection.
    pub remaining: RemainingSensor,
    /// Slow-poll activity view.
    pub indicator: ProtocolActiveIndicator,
}

impl ProtocolHandle {
    /// Tear the engine down.
    pub async fn shutdown(&self) {
        self.engine.stop().await;
    }
}

/// Parse the entry, restore the persisted anchor, and start the engine with
/// its projection views.
///
/// One handle per config entry; the caller owns its lifecycle.
///
/// # Errors
///
/// Fails on a malformed entry or when the store cannot be read.
pub async fn setup_entry(
    hub: &Hub,
    entry: &ConfigEntry,
    store: Arc<dyn StateStore>,
) -> Result<ProtocolHandle> {
    let config = ProtocolConfig::from_entry(entry)?;
    info!(
        entry_id = %entry.entry_id,
        keep_warm_switch = %config.keep_warm_switch,
        status_sensor = %config.status_sensor,
        "Setting up keep-warm protocol"
    );

    let engine = Arc::new(KeepWarmEngine::new(hub, Arc::clone(&store), config));
    engine.restore().await?;

    let status = StatusLiveSensor::new(Arc::clone(&engine));
    let remaining = RemainingSensor::new(Arc::clone(&engine));
    let indicator = ProtocolActiveIndicator::new(
        store,
        Arc::clone(&hub.registry),
        engine.config().keep_warm_switch.clone(),
    );
    indicator.refresh().await?;

    Arc::clone(&engine).start().await?;

    Ok(ProtocolHandle {
        engine,
        status,
        remaining,
        indicator,
    })
}
