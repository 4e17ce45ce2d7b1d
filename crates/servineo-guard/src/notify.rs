// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-shot notifications: appointment cancellations to fixers and
//! accepted/rejected status updates to requesters.
//!
//! Neither is retried automatically. Status updates keep a per-request
//! failure counter; once it reaches the configured limit the administrator
//! is alerted and, if that alert goes through, the fixer is told the
//! requester could not be reached.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use chrono::{DateTime, FixedOffset, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use servineo_config::model::EscalationConfig;
use servineo_core::error::ServineoError;
use servineo_core::traits::{Clock, MessageSender};
use servineo_core::types::{OutboundMessage, RequestId};
use strum::{Display, EnumString};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::message;

/// Longest accepted rejection reason, in characters.
pub const MAX_REASON_CHARS: usize = 100;

static REASON_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9áéíóúÁÉÍÓÚñÑ\s.,!?¿¡()\-]*$").unwrap());

/// A requester cancelled an appointment; tell the fixer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationNotice {
    pub fixer_name: String,
    /// Country code plus phone; formatting characters are ignored.
    pub fixer_number: String,
    pub requester_name: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Decision a fixer made about a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusDecision {
    Accepted,
    Rejected,
}

/// An accepted/rejected notice for a requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub request_id: RequestId,
    pub requester_name: String,
    pub requester_number: String,
    pub service_type: String,
    pub fixer_name: String,
    /// Where to send the failure notice after escalation.
    #[serde(default)]
    pub fixer_number: Option<String>,
    pub decision: StatusDecision,
    /// Required when rejecting.
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl StatusUpdate {
    /// Checks the update before anything is sent.
    pub fn validate(&self) -> Result<(), ServineoError> {
        if !self.requester_number.chars().any(|c| c.is_ascii_digit()) {
            return Err(ServineoError::Validation(
                "requester phone number is required".to_string(),
            ));
        }
        let reason = self.reason.as_deref().unwrap_or_default();
        if self.decision == StatusDecision::Rejected && reason.trim().is_empty() {
            return Err(ServineoError::Validation(
                "a rejection needs a reason".to_string(),
            ));
        }
        validate_reason(reason)
    }
}

/// Reasons are short and limited to letters, digits, whitespace and basic punctuation.
pub fn validate_reason(reason: &str) -> Result<(), ServineoError> {
    if reason.chars().count() > MAX_REASON_CHARS {
        return Err(ServineoError::Validation(format!(
            "reason exceeds {MAX_REASON_CHARS} characters"
        )));
    }
    if !REASON_PATTERN.is_match(reason) {
        return Err(ServineoError::Validation(
            "reason contains characters that are not allowed".to_string(),
        ));
    }
    Ok(())
}

/// `CITA-<unix millis>-<0..999>`.
pub fn appointment_id(now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("CITA-{}-{}", now.timestamp_millis(), suffix)
}

/// What happened to one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationReport {
    /// Appointment id for cancellations, request id for status updates.
    pub reference: String,
    pub delivered: bool,
    pub response_time_ms: u64,
    pub error: Option<String>,
    /// Consecutive failures for this request after this send.
    pub failures: u32,
    /// Whether the administrator alert was delivered.
    pub escalated: bool,
}

/// Sends cancellation and status-update notifications.
pub struct Notifier {
    sender: Arc<dyn MessageSender + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
    offset: FixedOffset,
    escalation: EscalationConfig,
    failures: Mutex<HashMap<RequestId, u32>>,
}

impl Notifier {
    pub fn new(
        sender: Arc<dyn MessageSender + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        offset: FixedOffset,
        escalation: EscalationConfig,
    ) -> Self {
        Self {
            sender,
            clock,
            offset,
            escalation,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Tells the fixer an appointment was cancelled. Sent once.
    pub async fn send_cancellation(
        &self,
        notice: &CancellationNotice,
    ) -> Result<NotificationReport, ServineoError> {
        if notice.fixer_name.trim().is_empty() {
            return Err(ServineoError::Validation("fixer name is required".to_string()));
        }
        if !notice.fixer_number.chars().any(|c| c.is_ascii_digit()) {
            return Err(ServineoError::Validation(
                "fixer phone number is required".to_string(),
            ));
        }

        let now = self.clock.now();
        let reference = appointment_id(now);
        let msg = message::cancellation(notice, &reference, now, self.offset);
        let (result, elapsed) = self.timed_send(&msg).await;

        match result {
            Ok(()) => info!(appointment = %reference, fixer = %notice.fixer_name, "cancellation notice sent"),
            Err(ref e) => warn!(appointment = %reference, error = %e, "cancellation notice failed"),
        }
        Ok(NotificationReport {
            reference,
            delivered: result.is_ok(),
            response_time_ms: elapsed,
            error: result.err().map(|e| e.to_string()),
            failures: 0,
            escalated: false,
        })
    }

    /// Tells the requester the fixer accepted or rejected their request.
    ///
    /// Validation problems are returned as errors before anything is sent.
    /// Send failures are reported, counted and possibly escalated.
    pub async fn send_status_update(
        &self,
        update: &StatusUpdate,
    ) -> Result<NotificationReport, ServineoError> {
        update.validate()?;

        let msg = message::status_update(update, self.clock.now(), self.offset);
        let (result, elapsed) = self.timed_send(&msg).await;

        let reference = update.request_id.to_string();
        match result {
            Ok(()) => {
                self.failures.lock().await.remove(&update.request_id);
                info!(request_id = %reference, decision = %update.decision, "status update sent");
                Ok(NotificationReport {
                    reference,
                    delivered: true,
                    response_time_ms: elapsed,
                    error: None,
                    failures: 0,
                    escalated: false,
                })
            }
            Err(e) => {
                let failures = {
                    let mut counts = self.failures.lock().await;
                    let count = counts.entry(update.request_id.clone()).or_insert(0);
                    *count += 1;
                    *count
                };
                warn!(
                    request_id = %reference,
                    decision = %update.decision,
                    failures,
                    error = %e,
                    "status update failed"
                );
                let escalated = if failures >= self.escalation.max_failures {
                    self.escalate(update, failures).await
                } else {
                    false
                };
                Ok(NotificationReport {
                    reference,
                    delivered: false,
                    response_time_ms: elapsed,
                    error: Some(e.to_string()),
                    failures,
                    escalated,
                })
            }
        }
    }

    /// Consecutive failed status updates recorded for `id`.
    pub async fn failure_count(&self, id: &RequestId) -> u32 {
        self.failures.lock().await.get(id).copied().unwrap_or(0)
    }

    async fn escalate(&self, update: &StatusUpdate, failures: u32) -> bool {
        let Some(admin_number) = self.escalation.admin_number.as_deref() else {
            warn!(request_id = %update.request_id, "escalation threshold reached but no administrator number is configured");
            return false;
        };

        let alert = message::status_failure_alert(admin_number, update, failures);
        if let (Err(e), _) = self.timed_send(&alert).await {
            warn!(admin = %self.escalation.admin_name, error = %e, "administrator alert failed");
            return false;
        }
        info!(admin = %self.escalation.admin_name, request_id = %update.request_id, failures, "administrator alerted");

        if let Some(fixer_number) = update.fixer_number.as_deref() {
            let notice = message::fixer_failure_notice(fixer_number, update);
            if let (Err(e), _) = self.timed_send(&notice).await {
                warn!(fixer = %update.fixer_name, error = %e, "fixer failure notice failed");
            }
        }
        true
    }

    async fn timed_send(&self, msg: &OutboundMessage) -> (Result<(), ServineoError>, u64) {
        let started = Instant::now();
        let result = self.sender.send(msg).await.map(|_| ());
        (result, elapsed_ms(started))
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
