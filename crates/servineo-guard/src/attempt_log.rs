// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only, size-capped logs over a [`CollectionStore`] key.
//!
//! Entries are stored oldest-first; appending past the cap evicts from the
//! front. Reads return the most recent entries first.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use servineo_core::error::ServineoError;
use servineo_core::traits::{CollectionStore, load_typed, save_typed};
use servineo_core::types::DeliveryAttempt;
use tokio::sync::Mutex;

/// Store key of the delivery attempt log.
pub const ATTEMPTS_KEY: &str = "delivery_attempts";

/// Log of confirmation delivery attempts.
pub type AttemptLog = CappedLog<DeliveryAttempt>;

/// A FIFO-evicting log persisted under a single store key.
pub struct CappedLog<T> {
    store: Arc<dyn CollectionStore + Send + Sync>,
    key: &'static str,
    cap: usize,
    write_lock: Mutex<()>,
    _entry: PhantomData<fn() -> T>,
}

impl<T> CappedLog<T>
where
    T: Serialize + DeserializeOwned,
{
    /// A log under `key` holding at most `cap` entries. A zero cap is raised to one.
    pub fn new(store: Arc<dyn CollectionStore + Send + Sync>, key: &'static str, cap: usize) -> Self {
        Self {
            store,
            key,
            cap: cap.max(1),
            write_lock: Mutex::new(()),
            _entry: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Appends `entry`, evicting the oldest entries beyond the cap.
    pub async fn append(&self, entry: T) -> Result<(), ServineoError> {
        let _guard = self.write_lock.lock().await;
        let mut entries: Vec<T> = load_typed(self.store.as_ref(), self.key).await?;
        entries.push(entry);
        evict_oldest(&mut entries, self.cap);
        save_typed(self.store.as_ref(), self.key, &entries).await
    }

    /// Entries most-recent-first, optionally limited.
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<T>, ServineoError> {
        let mut entries: Vec<T> = load_typed(self.store.as_ref(), self.key).await?;
        entries.reverse();
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    pub async fn len(&self) -> Result<usize, ServineoError> {
        Ok(self.store.load(self.key).await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, ServineoError> {
        Ok(self.len().await? == 0)
    }
}

/// Drops entries from the front until at most `cap` remain.
pub fn evict_oldest<T>(entries: &mut Vec<T>, cap: usize) {
    if entries.len() > cap {
        let excess = entries.len() - cap;
        entries.drain(..excess);
    }
}
