//! Protocol configuration parsed from a config entry.

use chrono::Duration;
use itertools::Itertools;

use samovar_hub::{ConfigEntry, EntityId};

use crate::error::{Error, Result};

/// Config-entry field names.
pub const CONF_TEMP_SENSOR: &str = "temp_sensor";
pub const CONF_STATUS_SENSOR: &str = "status_sensor";
pub const CONF_START_SWITCH: &str = "start_switch";
pub const CONF_KEEP_WARM_SWITCH: &str = "keep_warm_switch";
pub const CONF_MAX_MINUTES: &str = "max_minutes";
pub const CONF_WARM_VALUE: &str = "warm_value";
pub const CONF_ABORT_STATUSES: &str = "abort_statuses";

/// Default keep-warm cap in minutes.
pub const DEFAULT_MAX_MINUTES: u32 = 30;
/// Default status value meaning "keeping warm".
pub const DEFAULT_WARM_VALUE: &str = "Warm";
/// Default abort statuses, comma-separated.
pub const DEFAULT_ABORT_STATUSES: &str = "standby";

/// Immutable per-instance protocol configuration.
///
/// Set once at setup; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// Temperature sensor (registered with the entry, not consumed by the
    /// engine).
    pub temp_sensor: EntityId,
    /// Status sensor watched for warm and abort values.
    pub status_sensor: EntityId,
    /// Start switch (registered with the entry, not consumed by the engine).
    pub start_switch: EntityId,
    /// The keep-warm switch this protocol guards.
    pub keep_warm_switch: EntityId,
    /// Keep-warm cap in minutes.
    pub max_minutes: u32,
    /// Status value meaning the kettle is keeping warm.
    pub warm_value: String,
    /// Status values that disarm the protocol immediately.
    pub abort_statuses: Vec<String>,
}

impl ProtocolConfig {
    /// Parse and validate a config entry, applying defaults for the
    /// optional fields.
    pub fn from_entry(entry: &ConfigEntry) -> Result<Self> {
        Ok(Self {
            temp_sensor: required_entity(entry, CONF_TEMP_SENSOR)?,
            status_sensor: required_entity(entry, CONF_STATUS_SENSOR)?,
            start_switch: required_entity(entry, CONF_START_SWITCH)?,
            keep_warm_switch: required_entity(entry, CONF_KEEP_WARM_SWITCH)?,
            max_minutes: entry
                .get_u32(CONF_MAX_MINUTES)
                .unwrap_or(DEFAULT_MAX_MINUTES),
            warm_value: entry
                .get_str(CONF_WARM_VALUE)
                .unwrap_or(DEFAULT_WARM_VALUE)
                .to_string(),
            abort_statuses: parse_abort_statuses(
                entry
                    .get_str(CONF_ABORT_STATUSES)
                    .unwrap_or(DEFAULT_ABORT_STATUSES),
            ),
        })
    }

    /// The keep-warm cap as a duration.
    pub fn max_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.max_minutes))
    }

    /// Whether a status value disarms the protocol.
    pub fn is_abort_status(&self, status: &str) -> bool {
        self.abort_statuses.iter().any(|s| s == status)
    }
}

fn required_entity(entry: &ConfigEntry, field: &str) -> Result<EntityId> {
    let raw = entry
        .get_str(field)
        .ok_or_else(|| Error::config(field, "missing required entity"))?;
    EntityId::new(raw).map_err(|e| Error::config(field, e.to_string()))
}

/// Split comma-separated abort statuses, trimming whitespace and dropping
/// empty tokens.
pub fn parse_abort_statuses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect_vec()
}
