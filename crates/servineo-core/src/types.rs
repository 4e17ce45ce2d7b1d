// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the guard, its ports and its adapters.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a service request (e.g. `SOL-M1X2Y3-ABC123XYZ`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a service request.
///
/// `Created` on registration, `Pending` while the confirmation is in flight,
/// `Sent` once delivered, `Failed` when the channel rejected the number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum RequestStatus {
    Created,
    Pending,
    Sent,
    Failed,
}

/// A requester's service request as registered in the local archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: RequestId,
    pub requester_name: String,
    /// Dialling prefix without `+` (e.g. `591`).
    pub country_code: String,
    pub phone: String,
    pub zone: String,
    pub service_type: String,
    pub description: String,
    /// Named fixer, if the requester asked for one. Never an empty string.
    pub fixer_name: Option<String>,
    pub work_on_saturday: bool,
    pub created_at: DateTime<Utc>,
    pub estimated_response: NaiveDate,
    pub status: RequestStatus,
}

impl ServiceRequest {
    /// Whether the requester named a specific fixer.
    pub fn has_fixer(&self) -> bool {
        self.fixer_name.is_some()
    }

    /// Full destination number: country code plus phone, digits only.
    pub fn destination_number(&self) -> String {
        self.country_code
            .chars()
            .chain(self.phone.chars())
            .filter(char::is_ascii_digit)
            .collect()
    }
}

/// Outcome recorded for one delivery attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttemptOutcome {
    /// The attempt has been issued but has not resolved yet.
    Started,
    Success,
    Failed,
    /// The channel validator (or the endpoint) reported the number unusable.
    ValidationFailed,
}

/// One entry of the attempt log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub request_id: RequestId,
    /// 1-based, strictly increasing within one delivery session.
    pub attempt_number: u32,
    /// Delay waited before this attempt.
    pub wait_ms: u64,
    pub outcome: AttemptOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DeliveryAttempt {
    /// A freshly issued attempt; finish it with [`DeliveryAttempt::resolve`].
    pub fn started(
        request_id: RequestId,
        attempt_number: u32,
        wait_ms: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            request_id,
            attempt_number,
            wait_ms,
            outcome: AttemptOutcome::Started,
            idempotency_key: None,
            response_time_ms: None,
            error_text: None,
            timestamp,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Records how the attempt ended.
    pub fn resolve(
        mut self,
        outcome: AttemptOutcome,
        response_time_ms: Option<u64>,
        error_text: Option<String>,
    ) -> Self {
        self.outcome = outcome;
        self.response_time_ms = response_time_ms;
        self.error_text = error_text;
        self
    }
}

/// Why a phone number failed channel validation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ChannelErrorKind {
    Empty,
    TooShort,
    TooLong,
    /// The number exists but is not reachable on the messaging channel.
    NoChannel,
    Invalid,
}

/// Classification of a phone number by the channel validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelValidationResult {
    pub valid: bool,
    pub error_kind: Option<ChannelErrorKind>,
    /// Whether a failed delivery to this number may be retried.
    pub retry_eligible: bool,
    /// The number with every non-digit stripped.
    pub digits: String,
}

impl ChannelValidationResult {
    pub fn valid(digits: String) -> Self {
        Self {
            valid: true,
            error_kind: None,
            retry_eligible: true,
            digits,
        }
    }

    pub fn invalid(digits: String, kind: ChannelErrorKind, retry_eligible: bool) -> Self {
        Self {
            valid: false,
            error_kind: Some(kind),
            retry_eligible,
            digits,
        }
    }

    /// Invalid and not worth any retry budget.
    pub fn is_terminal(&self) -> bool {
        !self.valid && !self.retry_eligible
    }
}

/// A text message to push through a [`crate::MessageSender`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Destination: country code plus phone digits.
    pub number: String,
    pub text: String,
    /// Sent as the `Idempotency-Key` header when present.
    #[serde(skip)]
    pub idempotency_key: Option<String>,
}

impl OutboundMessage {
    pub fn new(number: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            text: text.into(),
            idempotency_key: None,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Successful answer from the messaging endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub status: u16,
    pub response_time_ms: u64,
    pub body: String,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a port.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ServiceRequest {
        ServiceRequest {
            id: RequestId("SOL-1".into()),
            requester_name: "Juan Pérez".into(),
            country_code: "+591".into(),
            phone: "6954-2509".into(),
            zone: "La Paz".into(),
            service_type: "Reparación de laptop".into(),
            description: "Pantalla rota".into(),
            fixer_name: None,
            work_on_saturday: false,
            created_at: Utc::now(),
            estimated_response: NaiveDate::from_ymd_opt(2025, 10, 17).unwrap(),
            status: RequestStatus::Created,
        }
    }

    #[test]
    fn destination_number_keeps_only_digits() {
        assert_eq!(sample_request().destination_number(), "59169542509");
    }

    #[test]
    fn request_serializes_with_plain_string_id() {
        let json = serde_json::to_value(sample_request()).unwrap();
        assert_eq!(json["id"], "SOL-1");
        assert_eq!(json["status"], "Created");
    }

    #[test]
    fn attempt_outcome_uses_kebab_case() {
        let json = serde_json::to_string(&AttemptOutcome::ValidationFailed).unwrap();
        assert_eq!(json, "\"validation-failed\"");
        assert_eq!(AttemptOutcome::ValidationFailed.to_string(), "validation-failed");
    }

    #[test]
    fn started_attempt_resolves_in_place() {
        let attempt = DeliveryAttempt::started(RequestId("SOL-1".into()), 2, 5000, Utc::now())
            .with_idempotency_key("SOL-1-retry-1");
        assert_eq!(attempt.outcome, AttemptOutcome::Started);

        let done = attempt.resolve(AttemptOutcome::Failed, Some(120), Some("HTTP 500".into()));
        assert_eq!(done.outcome, AttemptOutcome::Failed);
        assert_eq!(done.attempt_number, 2);
        assert_eq!(done.idempotency_key.as_deref(), Some("SOL-1-retry-1"));
    }

    #[test]
    fn terminal_results_are_invalid_and_not_retryable() {
        let no_channel =
            ChannelValidationResult::invalid("77480958".into(), ChannelErrorKind::NoChannel, false);
        assert!(no_channel.is_terminal());

        let short = ChannelValidationResult::invalid("123".into(), ChannelErrorKind::TooShort, true);
        assert!(!short.is_terminal());
        assert!(!ChannelValidationResult::valid("69542509".into()).is_terminal());
    }
}
