// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp message sender backed by an Evolution API deployment.
//!
//! One `send()` is one HTTP request: `POST <base_url>/message/sendText/<instance>`
//! with a `{number, text}` body. Retrying is the caller's job.

pub mod client;
pub mod types;

use async_trait::async_trait;
use servineo_config::model::WhatsAppConfig;
use servineo_core::{
    AdapterType, HealthStatus, MessageSender, OutboundMessage, PluginAdapter, SendReceipt,
    ServineoError,
};

use crate::client::EvolutionClient;

/// [`MessageSender`] over the Evolution API.
#[derive(Debug, Clone)]
pub struct WhatsAppSender {
    client: EvolutionClient,
}

impl WhatsAppSender {
    /// Builds the sender. Fails when the API key is missing.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, ServineoError> {
        Ok(Self {
            client: EvolutionClient::new(config)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }
}

#[async_trait]
impl PluginAdapter for WhatsAppSender {
    fn name(&self) -> &str {
        "whatsapp-evolution"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ServineoError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl MessageSender for WhatsAppSender {
    async fn send(&self, msg: &OutboundMessage) -> Result<SendReceipt, ServineoError> {
        self.client.send_text(msg).await
    }
}
