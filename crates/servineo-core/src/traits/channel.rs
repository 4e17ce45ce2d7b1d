// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for outbound messaging (WhatsApp).

use async_trait::async_trait;

use crate::error::ServineoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{OutboundMessage, SendReceipt};

/// Adapter that pushes a text message to a phone number.
///
/// Implementations return [`ServineoError::Channel`] or
/// [`ServineoError::Timeout`] when no answer came back, and
/// [`ServineoError::Rejected`] when the endpoint answered with a failure.
/// They never retry on their own; retry policy belongs to the caller.
#[async_trait]
pub trait MessageSender: PluginAdapter {
    /// Sends one message.
    async fn send(&self, msg: &OutboundMessage) -> Result<SendReceipt, ServineoError>;
}
