// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connects the guard to the on-disk store and the WhatsApp endpoint.

use std::sync::Arc;

use servineo_config::model::ServineoConfig;
use servineo_core::ServineoError;
use servineo_guard::Guard;
use servineo_storage::JsonFileStore;
use servineo_whatsapp::WhatsAppSender;
use tracing::debug;

/// Opens the JSON collection store, creating the data directory if needed.
pub async fn open_store(config: &ServineoConfig) -> Result<Arc<JsonFileStore>, ServineoError> {
    let store = JsonFileStore::from_config(&config.storage);
    store.initialize().await?;
    Ok(Arc::new(store))
}

/// Builds a guard that can send messages. Needs the WhatsApp API key.
pub async fn build_guard(config: &ServineoConfig) -> Result<Guard, ServineoError> {
    let store = open_store(config).await?;
    let sender = WhatsAppSender::new(&config.whatsapp)?;
    debug!(
        data_dir = %store.dir().display(),
        endpoint = %sender.endpoint(),
        "guard wired"
    );
    Guard::builder(config)
        .store(store)
        .sender(Arc::new(sender))
        .build()
}
