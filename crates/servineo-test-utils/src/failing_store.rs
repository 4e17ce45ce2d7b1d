// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A collection store whose writes fail for chosen keys.

use std::collections::HashSet;
use std::io;

use async_trait::async_trait;
use serde_json::Value;

use servineo_core::{AdapterType, CollectionStore, HealthStatus, PluginAdapter, ServineoError};
use servineo_storage::MemoryStore;

/// Wraps a [`MemoryStore`]; `save` on any listed key returns a storage error
/// and leaves the collection untouched. Every other call passes through.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    failing: HashSet<String>,
}

impl FailingStore {
    pub fn failing_saves(keys: &[&str]) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[async_trait]
impl PluginAdapter for FailingStore {
    fn name(&self) -> &str {
        "failing-memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ServineoError> {
        Ok(HealthStatus::Degraded(format!(
            "writes fail for {} collection(s)",
            self.failing.len()
        )))
    }
}

#[async_trait]
impl CollectionStore for FailingStore {
    async fn load(&self, key: &str) -> Result<Vec<Value>, ServineoError> {
        self.inner.load(key).await
    }

    async fn save(&self, key: &str, items: Vec<Value>) -> Result<(), ServineoError> {
        if self.failing.contains(key) {
            return Err(ServineoError::storage(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{key} is read-only"),
            )));
        }
        self.inner.save(key, items).await
    }
}
