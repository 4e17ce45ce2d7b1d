// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage port: named collections of JSON values.
//!
//! This is the only persistence shape the guard needs: read a named list,
//! replace a named list. A key that was never written reads as empty.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ServineoError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for key/value collection storage.
#[async_trait]
pub trait CollectionStore: PluginAdapter {
    /// Returns the collection stored under `key`, or an empty list.
    async fn load(&self, key: &str) -> Result<Vec<Value>, ServineoError>;

    /// Replaces the collection stored under `key`.
    async fn save(&self, key: &str, items: Vec<Value>) -> Result<(), ServineoError>;
}

/// Loads a collection and deserializes every element.
pub async fn load_typed<T>(store: &dyn CollectionStore, key: &str) -> Result<Vec<T>, ServineoError>
where
    T: DeserializeOwned,
{
    store
        .load(key)
        .await?
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(ServineoError::storage))
        .collect()
}

/// Serializes every element and replaces the collection.
pub async fn save_typed<T>(
    store: &dyn CollectionStore,
    key: &str,
    items: &[T],
) -> Result<(), ServineoError>
where
    T: Serialize,
{
    let values = items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(ServineoError::storage))
        .collect::<Result<Vec<_>, _>>()?;
    store.save(key, values).await
}
