// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confirmation delivery state machine.
//!
//! ```text
//! Validating ──terminal number──────────────────────────▶ Rejected
//!     │
//!     ▼
//!  Sending ──ok──▶ Succeeded
//!     │
//!   failed
//!     ▼
//! Retrying ──ok──▶ Succeeded
//!     │ ├─revalidation terminal (before first retry)──────▶ Rejected
//!     └─schedule exhausted───────────────────────────────▶ Exhausted
//! ```
//!
//! Only the notification is retried; the request is registered once,
//! before delivery starts, and is never removed. Each send attempt appends
//! one finished entry to the attempt log, numbered from 1 within the
//! session. A rejection appends one `validation-failed` entry and sends
//! nothing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::FixedOffset;
use servineo_config::model::DeliveryConfig;
use servineo_core::error::ServineoError;
use servineo_core::traits::{Clock, MessageSender, Scheduler};
use servineo_core::types::{
    AttemptOutcome, ChannelValidationResult, DeliveryAttempt, RequestId, RequestStatus,
    ServiceRequest,
};
use strum::Display;
use tracing::{debug, info, warn};

use crate::attempt_log::AttemptLog;
use crate::channel::ChannelValidator;
use crate::message;
use crate::notify::elapsed_ms;
use crate::registry::{RequestRegistry, UndeliverableReason};

/// States of one delivery session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DeliveryState {
    Validating,
    Sending,
    Retrying,
    Succeeded,
    Rejected,
    Exhausted,
}

impl DeliveryState {
    pub fn is_final(self) -> bool {
        matches!(self, Self::Succeeded | Self::Rejected | Self::Exhausted)
    }
}

/// Outcome of [`DeliveryOrchestrator::deliver`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReport {
    pub request_id: RequestId,
    /// Always a final state.
    pub state: DeliveryState,
    /// Classification of the number the session ended with.
    pub validation: ChannelValidationResult,
    /// Attempt log entries written by this session, in order.
    pub attempts: Vec<DeliveryAttempt>,
    /// Non-fatal message for the requester when delivery did not succeed.
    pub warning: Option<String>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> bool {
        self.state == DeliveryState::Succeeded
    }
}

/// Drives one confirmation through validation, send and retries.
pub struct DeliveryOrchestrator {
    sender: Arc<dyn MessageSender + Send + Sync>,
    validator: ChannelValidator,
    registry: Arc<RequestRegistry>,
    attempts: Arc<AttemptLog>,
    scheduler: Arc<dyn Scheduler + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
    retry_delays: Vec<Duration>,
    offset: FixedOffset,
    admin_number: Option<String>,
}

/// Mutable bookkeeping for one `deliver` call.
struct Session {
    request_id: RequestId,
    state: DeliveryState,
    attempts: Vec<DeliveryAttempt>,
}

impl Session {
    fn transition(&mut self, next: DeliveryState) {
        debug!(request_id = %self.request_id, from = %self.state, to = %next, "delivery transition");
        self.state = next;
    }

    fn next_attempt_number(&self) -> u32 {
        u32::try_from(self.attempts.len()).unwrap_or(u32::MAX).saturating_add(1)
    }
}

impl DeliveryOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sender: Arc<dyn MessageSender + Send + Sync>,
        validator: ChannelValidator,
        registry: Arc<RequestRegistry>,
        attempts: Arc<AttemptLog>,
        scheduler: Arc<dyn Scheduler + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        config: &DeliveryConfig,
        offset: FixedOffset,
        admin_number: Option<String>,
    ) -> Self {
        Self {
            sender,
            validator,
            registry,
            attempts,
            scheduler,
            clock,
            retry_delays: config
                .retry_delays_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
            offset,
            admin_number,
        }
    }

    /// Delivers the registration confirmation for an already registered request.
    ///
    /// Delivery problems never surface as `Err`: they end in `Rejected` or
    /// `Exhausted` with a warning. Errors are storage failures only.
    pub async fn deliver(
        &self,
        request: &ServiceRequest,
    ) -> Result<DeliveryReport, ServineoError> {
        let mut session = Session {
            request_id: request.id.clone(),
            state: DeliveryState::Validating,
            attempts: Vec::new(),
        };

        let validation = self.validator.validate(&request.phone);
        if validation.is_terminal() {
            return self.reject(request, validation, session).await;
        }
        if !validation.valid {
            debug!(
                request_id = %request.id,
                error_kind = ?validation.error_kind,
                "number is malformed but retry-eligible, sending anyway"
            );
        }

        self.registry
            .update_status(&request.id, RequestStatus::Pending)
            .await?;

        session.transition(DeliveryState::Sending);
        let first = self
            .attempt(request, &mut session, Duration::ZERO, request.id.to_string())
            .await?;
        if first.outcome == AttemptOutcome::Success {
            return self.succeed(request, validation, session).await;
        }

        session.transition(DeliveryState::Retrying);
        let mut current = request.clone();
        let mut validation = validation;
        let mut last_error = first.error_text.unwrap_or_default();

        for (index, delay) in self.retry_delays.iter().enumerate() {
            let retry = index + 1;
            if retry == 1 {
                if let Some(stored) = self.registry.get(&request.id).await? {
                    current.country_code = stored.country_code;
                    current.phone = stored.phone;
                }
                validation = self.validator.validate(&current.phone);
                if validation.is_terminal() {
                    info!(request_id = %request.id, "number became unreachable before first retry");
                    return self.reject(&current, validation, session).await;
                }
            }

            self.scheduler.sleep(*delay).await;
            let key = format!("{}-retry-{}", request.id, retry);
            let outcome = self.attempt(&current, &mut session, *delay, key).await?;
            if outcome.outcome == AttemptOutcome::Success {
                return self.succeed(&current, validation, session).await;
            }
            last_error = outcome.error_text.unwrap_or_default();
        }

        self.exhaust(&current, validation, session, &last_error).await
    }

    /// One send. The finished entry is logged and returned.
    async fn attempt(
        &self,
        request: &ServiceRequest,
        session: &mut Session,
        wait: Duration,
        idempotency_key: String,
    ) -> Result<DeliveryAttempt, ServineoError> {
        let entry = DeliveryAttempt::started(
            request.id.clone(),
            session.next_attempt_number(),
            duration_ms(wait),
            self.clock.now(),
        )
        .with_idempotency_key(idempotency_key.clone());

        let msg = message::confirmation(request, self.offset).with_idempotency_key(idempotency_key);
        let started = Instant::now();
        let entry = match self.sender.send(&msg).await {
            Ok(receipt) => entry.resolve(AttemptOutcome::Success, Some(receipt.response_time_ms), None),
            Err(e) => {
                let outcome = if e.is_channel_validation_signal() {
                    AttemptOutcome::ValidationFailed
                } else {
                    AttemptOutcome::Failed
                };
                warn!(
                    request_id = %request.id,
                    attempt = entry.attempt_number,
                    %outcome,
                    error = %e,
                    "confirmation send failed"
                );
                entry.resolve(outcome, Some(elapsed_ms(started)), Some(e.to_string()))
            }
        };

        self.record(&entry).await;
        session.attempts.push(entry.clone());
        Ok(entry)
    }

    /// Appends to the attempt log. A failed write never changes the outcome
    /// of a send that already happened.
    async fn record(&self, entry: &DeliveryAttempt) {
        if let Err(e) = self.attempts.append(entry.clone()).await {
            warn!(
                request_id = %entry.request_id,
                attempt = entry.attempt_number,
                error = %e,
                "attempt log write failed"
            );
        }
    }

    async fn succeed(
        &self,
        request: &ServiceRequest,
        validation: ChannelValidationResult,
        mut session: Session,
    ) -> Result<DeliveryReport, ServineoError> {
        session.transition(DeliveryState::Succeeded);
        self.registry
            .update_status(&request.id, RequestStatus::Sent)
            .await?;
        info!(
            request_id = %request.id,
            attempts = session.attempts.len(),
            "confirmation delivered"
        );
        Ok(report(session, validation, None))
    }

    async fn reject(
        &self,
        request: &ServiceRequest,
        validation: ChannelValidationResult,
        mut session: Session,
    ) -> Result<DeliveryReport, ServineoError> {
        session.transition(DeliveryState::Rejected);
        let detail = format!(
            "number {} failed channel validation: {}",
            validation.digits,
            validation
                .error_kind
                .map(|k| k.to_string())
                .unwrap_or_default()
        );

        let entry = DeliveryAttempt::started(
            request.id.clone(),
            session.next_attempt_number(),
            0,
            self.clock.now(),
        )
        .resolve(AttemptOutcome::ValidationFailed, None, Some(detail.clone()));
        self.record(&entry).await;
        session.attempts.push(entry);

        self.registry
            .update_status(&request.id, RequestStatus::Failed)
            .await?;
        self.registry
            .record_undeliverable(
                request,
                UndeliverableReason::ChannelRejected,
                validation.error_kind,
                detail.as_str(),
            )
            .await?;

        let warning = message::unreachable_warning(request);
        warn!(request_id = %request.id, %detail, "confirmation rejected without sending");
        Ok(report(session, validation, Some(warning)))
    }

    async fn exhaust(
        &self,
        request: &ServiceRequest,
        validation: ChannelValidationResult,
        mut session: Session,
        last_error: &str,
    ) -> Result<DeliveryReport, ServineoError> {
        session.transition(DeliveryState::Exhausted);
        self.registry
            .update_status(&request.id, RequestStatus::Created)
            .await?;
        self.registry
            .record_undeliverable(
                request,
                UndeliverableReason::RetriesExhausted,
                validation.error_kind,
                last_error,
            )
            .await?;

        let attempts = u32::try_from(session.attempts.len()).unwrap_or(u32::MAX);
        warn!(
            request_id = %request.id,
            attempts,
            last_error,
            "confirmation retries exhausted"
        );

        if let Some(admin) = self.admin_number.as_deref() {
            let alert = message::confirmation_failure_alert(admin, request, attempts, last_error);
            match self.sender.send(&alert).await {
                Ok(_) => info!(request_id = %request.id, "administrator alerted about undelivered confirmation"),
                Err(e) => warn!(request_id = %request.id, error = %e, "administrator alert failed"),
            }
        }

        let warning = message::undelivered_warning(request);
        Ok(report(session, validation, Some(warning)))
    }
}

fn report(
    session: Session,
    validation: ChannelValidationResult,
    warning: Option<String>,
) -> DeliveryReport {
    DeliveryReport {
        request_id: session.request_id,
        state: session.state,
        validation,
        attempts: session.attempts,
        warning,
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
