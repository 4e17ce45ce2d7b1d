// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-file implementation of the CollectionStore trait.
//!
//! Each collection is a file `<data_dir>/<key>.json` holding one JSON array.
//! Saves write a sibling temp file and rename it over the target, so a
//! reader never observes a half-written collection. All writes go through
//! a single async mutex.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use servineo_config::model::StorageConfig;
use servineo_core::{AdapterType, CollectionStore, HealthStatus, PluginAdapter, ServineoError};

/// File-per-collection store rooted at a data directory.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. Nothing touches disk until
    /// [`JsonFileStore::initialize`] or the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.data_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the data directory if it does not exist yet.
    pub async fn initialize(&self) -> Result<(), ServineoError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(ServineoError::storage)?;
        debug!(dir = %self.dir.display(), "JSON collection store initialized");
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ServineoError> {
        let well_formed = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !well_formed {
            return Err(ServineoError::Storage {
                source: format!("invalid collection key {key:?}").into(),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl PluginAdapter for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ServineoError> {
        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                self.dir.display()
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HealthStatus::Degraded(format!(
                "{} does not exist yet",
                self.dir.display()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl CollectionStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Vec<Value>, ServineoError> {
        let path = self.path_for(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ServineoError::storage(e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(ServineoError::storage)
    }

    async fn save(&self, key: &str, items: Vec<Value>) -> Result<(), ServineoError> {
        let path = self.path_for(key)?;
        let body = serde_json::to_vec_pretty(&items).map_err(ServineoError::storage)?;

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(ServineoError::storage)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(ServineoError::storage)?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(ServineoError::storage)?;
        debug!(key, items = items.len(), "collection saved");
        Ok(())
    }
}
