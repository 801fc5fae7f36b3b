//! Entity identifiers and state-change notifications.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a hub entity in `domain.object_id` form, e.g.
/// `switch.kettle_keep_warm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Parse an entity id, validating the `domain.object_id` shape.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        match raw.split_once('.') {
            Some((domain, object_id))
                if !domain.is_empty() && !object_id.is_empty() && !object_id.contains('.') =>
            {
                Ok(Self(raw))
            }
            _ => Err(Error::invalid_entity_id(raw)),
        }
    }

    /// The domain half (`switch` in `switch.kettle_keep_warm`).
    pub fn domain(&self) -> &str {
        self.0.split_once('.').map_or("", |(domain, _)| domain)
    }

    /// The object half (`kettle_keep_warm` in `switch.kettle_keep_warm`).
    pub fn object_id(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, object_id)| object_id)
    }

    /// The full id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// A state-change notification for a single entity.
///
/// `new_value == None` means the entity disappeared from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// The entity that changed.
    pub entity_id: EntityId,
    /// The new state value, or `None` when the entity was removed.
    pub new_value: Option<String>,
}

impl StateChange {
    /// A change carrying a new value.
    pub fn new(entity_id: EntityId, new_value: impl Into<String>) -> Self {
        Self {
            entity_id,
            new_value: Some(new_value.into()),
        }
    }

    /// A removal notification.
    pub fn removed(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            new_value: None,
        }
    }
}
