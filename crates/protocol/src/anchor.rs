//! The persisted runtime anchor.

use chrono::{DateTime, Utc};
use serde_json::Value;

use samovar_hub::{parse_timestamp, StateRecord};

/// Persisted-record key for the anchor timestamp.
pub const START_TS_KEY: &str = "start_ts";

/// Runtime state of the keep-warm protocol: the instant it was armed, or
/// nothing.
///
/// Armed means the keep-warm switch was observed turning on; cleared means
/// off or force-aborted. The raw timestamp string is kept as persisted so
/// the record round-trips byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeAnchor {
    start_ts: Option<String>,
}

impl RuntimeAnchor {
    /// An unarmed anchor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a loaded store record.
    ///
    /// An absent record, absent key, or null value all mean unarmed.
    pub fn restore(record: Option<&StateRecord>) -> Self {
        let start_ts = record
            .and_then(|r| r.get(START_TS_KEY))
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { start_ts }
    }

    /// The exact persisted schema: `{"start_ts": <string or null>}`.
    pub fn to_record(&self) -> StateRecord {
        let mut record = StateRecord::new();
        record.insert(
            START_TS_KEY.to_string(),
            self.start_ts.clone().map_or(Value::Null, Value::String),
        );
        record
    }

    /// Arm at the given instant.
    pub fn arm(&mut self, now: DateTime<Utc>) {
        self.start_ts = Some(now.to_rfc3339());
    }

    /// Disarm.
    pub fn clear(&mut self) {
        self.start_ts = None;
    }

    /// Whether the protocol is armed.
    pub fn is_armed(&self) -> bool {
        self.start_ts.is_some()
    }

    /// Raw persisted timestamp string.
    pub fn start_ts(&self) -> Option<&str> {
        self.start_ts.as_deref()
    }

    /// Parsed start instant. An unparsable timestamp reads as `None` and
    /// never errors.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_ts.as_deref().and_then(parse_timestamp)
    }
}
