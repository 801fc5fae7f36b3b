//! Config-entry input surface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One configured instance of an integration, as collected by the setup UI.
///
/// The data map is raw user input; validation and defaulting belong to the
/// consumer parsing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Stable identifier of this entry.
    pub entry_id: String,
    /// Display title.
    pub title: String,
    /// Raw field values.
    pub data: Map<String, Value>,
}

impl ConfigEntry {
    /// Create an entry with an empty data map.
    pub fn new(entry_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            title: title.into(),
            data: Map::new(),
        }
    }

    /// Builder-style field insert.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// String field lookup.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Integer field lookup, coercing JSON numbers or numeric strings.
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        match self.data.get(key)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
