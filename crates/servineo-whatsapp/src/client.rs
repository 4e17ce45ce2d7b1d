// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Evolution API `sendText` endpoint.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use servineo_config::model::WhatsAppConfig;
use servineo_core::{OutboundMessage, SendReceipt, ServineoError};
use tracing::debug;

use crate::types::{SendTextRequest, SendTextResponse};

/// Header carrying the per-attempt idempotency key.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Authenticated client bound to one Evolution API instance.
#[derive(Debug, Clone)]
pub struct EvolutionClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl EvolutionClient {
    /// Creates a client with the `apikey` and `Authorization` headers set.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, ServineoError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ServineoError::Config(
                    "whatsapp.api_key is required (or set SERVINEO_WHATSAPP_API_KEY)".to_string(),
                )
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|e| ServineoError::Config(format!("invalid API key header value: {e}")))?,
        );
        if let Some(token) = config.auth_token.as_deref().filter(|t| !t.trim().is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                    ServineoError::Config(format!("invalid auth token header value: {e}"))
                })?,
            );
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ServineoError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/message/sendText/{}",
                config.base_url.trim_end_matches('/'),
                config.instance
            ),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one text message. Never retries.
    ///
    /// 2xx is success unless the body reports `success: false`. Any other
    /// status is [`ServineoError::Rejected`] with the body kept for
    /// diagnostics.
    pub async fn send_text(&self, msg: &OutboundMessage) -> Result<SendReceipt, ServineoError> {
        let mut request = self.client.post(&self.endpoint).json(&SendTextRequest {
            number: &msg.number,
            text: &msg.text,
        });
        if let Some(key) = &msg.idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(
            status = %status,
            response_time_ms,
            idempotency_key = msg.idempotency_key.as_deref().unwrap_or(""),
            "evolution api responded"
        );

        if !status.is_success() {
            return Err(ServineoError::Rejected {
                status: Some(status.as_u16()),
                body,
            });
        }
        if SendTextResponse::reports_failure(&body) {
            return Err(ServineoError::Rejected { status: None, body });
        }

        Ok(SendReceipt {
            status: status.as_u16(),
            response_time_ms,
            body,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ServineoError {
        if e.is_timeout() {
            ServineoError::Timeout {
                duration: self.timeout,
            }
        } else {
            ServineoError::Channel {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}
