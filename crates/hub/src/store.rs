//! Durable key-value store for per-entry runtime state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use samovar_core::Error as CoreError;

use crate::error::{Error, Result};

/// A persisted JSON mapping.
pub type StateRecord = Map<String, Value>;

/// Trait for durable state storage backends.
///
/// `load` immediately after `save` must return the same mapping.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the last-saved mapping, or `None` on first run.
    async fn load(&self) -> Result<Option<StateRecord>>;

    /// Save a mapping, replacing any previous one.
    async fn save(&self, record: &StateRecord) -> Result<()>;
}

/// In-memory store for tests and ephemeral embedding.
#[derive(Default)]
pub struct InMemoryStateStore {
    record: RwLock<Option<StateRecord>>,
}

impl InMemoryStateStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new store wrapped in an Arc.
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self) -> Result<Option<StateRecord>> {
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, record: &StateRecord) -> Result<()> {
        *self.record.write().await = Some(record.clone());
        Ok(())
    }
}

/// JSON-file-backed store, one file per store key.
///
/// Writes go through a temp file and rename so a crash never leaves a
/// half-written record behind.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store writing `<dir>/<key>.json`.
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_record(&self) -> samovar_core::Result<Option<StateRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let record = serde_json::from_slice(&bytes)?;
                Ok(Some(record))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::file_read_failed(self.path.clone(), e.to_string())),
        }
    }

    async fn write_record(&self, record: &StateRecord) -> samovar_core::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::directory_creation_failed(parent, e.to_string()))?;
        }
        let bytes = serde_json::to_vec(record)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| CoreError::file_write_failed(tmp.clone(), e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CoreError::file_write_failed(self.path.clone(), e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<Option<StateRecord>> {
        self.read_record()
            .await
            .map_err(|e| Error::store_failed("load", e.to_string()))
    }

    async fn save(&self, record: &StateRecord) -> Result<()> {
        self.write_record(record)
            .await
            .map_err(|e| Error::store_failed("save", e.to_string()))
    }
}
