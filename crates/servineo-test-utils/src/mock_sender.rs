// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock message sender for deterministic testing.
//!
//! `MockSender` implements `MessageSender` with a scripted queue of replies
//! and captures every outbound message for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use servineo_core::ServineoError;
use servineo_core::traits::adapter::PluginAdapter;
use servineo_core::traits::channel::MessageSender;
use servineo_core::types::{AdapterType, HealthStatus, OutboundMessage, SendReceipt};

/// How the mock answers one `send()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// 200 with `{"success":true}`.
    Delivered,
    /// Non-2xx answer with the given body.
    HttpError { status: u16, body: String },
    /// 400 whose body says the number has no WhatsApp account.
    NoAccount,
    /// The request never reached the endpoint.
    Unreachable,
    /// The per-request timeout fired.
    Timeout,
}

impl MockReply {
    /// A 500 with a short body.
    pub fn server_error() -> Self {
        Self::HttpError {
            status: 500,
            body: "internal server error".to_string(),
        }
    }

    fn into_result(self) -> Result<SendReceipt, ServineoError> {
        match self {
            Self::Delivered => Ok(SendReceipt {
                status: 200,
                response_time_ms: 1,
                body: r#"{"success":true}"#.to_string(),
            }),
            Self::HttpError { status, body } => Err(ServineoError::Rejected {
                status: Some(status),
                body,
            }),
            Self::NoAccount => Err(ServineoError::Rejected {
                status: Some(400),
                body: r#"{"status":400,"response":{"message":[{"exists":false,"number":"59177480958"}]}}"#
                    .to_string(),
            }),
            Self::Unreachable => Err(ServineoError::Channel {
                message: "connection refused".to_string(),
                source: None,
            }),
            Self::Timeout => Err(ServineoError::Timeout {
                duration: Duration::from_secs(10),
            }),
        }
    }
}

/// A scripted messaging channel.
///
/// Replies are taken from the script in order; once it runs out every send
/// gets the fallback reply.
pub struct MockSender {
    script: Arc<Mutex<VecDeque<MockReply>>>,
    fallback: MockReply,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl MockSender {
    /// A sender that delivers everything.
    pub fn new() -> Self {
        Self::scripted(Vec::new())
    }

    /// A sender that answers every send with HTTP 500.
    pub fn failing() -> Self {
        Self::new().with_fallback(MockReply::server_error())
    }

    /// Replies from `script` first, then delivers.
    pub fn scripted(script: Vec<MockReply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            fallback: MockReply::Delivered,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply used once the script is exhausted.
    pub fn with_fallback(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Queue another scripted reply.
    pub async fn push_reply(&self, reply: MockReply) {
        self.script.lock().await.push_back(reply);
    }

    /// Every message passed to `send()`, in order.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Idempotency keys of every send, in order.
    pub async fn idempotency_keys(&self) -> Vec<Option<String>> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|m| m.idempotency_key.clone())
            .collect()
    }
}

impl Default for MockSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockSender {
    fn name(&self) -> &str {
        "mock-sender"
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
impl MessageSender for MockSender {
    async fn send(&self, msg: &OutboundMessage) -> Result<SendReceipt, ServineoError> {
        self.sent.lock().await.push(msg.clone());
        let reply = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        reply.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_then_fallback() {
        let sender = MockSender::scripted(vec![MockReply::Unreachable]);
        let msg = OutboundMessage::new("59169542509", "hola").with_idempotency_key("SOL-1");

        assert!(sender.send(&msg).await.is_err());
        assert!(sender.send(&msg).await.is_ok());
        assert_eq!(sender.sent_count().await, 2);
        assert_eq!(
            sender.idempotency_keys().await,
            vec![Some("SOL-1".to_string()), Some("SOL-1".to_string())]
        );
    }

    #[tokio::test]
    async fn no_account_reply_is_a_validation_signal() {
        let sender = MockSender::scripted(vec![MockReply::NoAccount]);
        let err = sender
            .send(&OutboundMessage::new("59177480958", "hola"))
            .await
            .unwrap_err();
        assert!(err.is_channel_validation_signal());
    }

    #[tokio::test]
    async fn failing_sender_always_fails() {
        let sender = MockSender::failing();
        for _ in 0..3 {
            let err = sender.send(&OutboundMessage::new("1", "x")).await.unwrap_err();
            assert!(matches!(err, ServineoError::Rejected { status: Some(500), .. }));
        }
    }
}
