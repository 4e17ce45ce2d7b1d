// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementation of the CollectionStore trait.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use servineo_core::{AdapterType, CollectionStore, HealthStatus, PluginAdapter, ServineoError};

/// Collections held in a map for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every collection written so far.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.collections.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ServineoError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Vec<Value>, ServineoError> {
        Ok(self
            .collections
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, key: &str, items: Vec<Value>) -> Result<(), ServineoError> {
        self.collections.write().await.insert(key.to_string(), items);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_key_reads_empty() {
        let store = MemoryStore::new();
        assert!(store.load("requests").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_replaces_collection() {
        let store = MemoryStore::new();
        store.save("requests", vec![json!(1), json!(2)]).await.unwrap();
        store.save("requests", vec![json!(3)]).await.unwrap();
        assert_eq!(store.load("requests").await.unwrap(), vec![json!(3)]);
        assert_eq!(store.keys().await, vec!["requests".to_string()]);
    }
}
