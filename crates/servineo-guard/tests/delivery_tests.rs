// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the confirmation delivery state machine.

use std::time::Duration;

use servineo_config::model::ServineoConfig;
use servineo_core::Clock;
use servineo_core::types::{AttemptOutcome, ChannelErrorKind, RequestStatus};
use servineo_core::ServiceRequest;
use servineo_guard::{DeliveryReport, DeliveryState, RequestForm, SubmissionOutcome, UndeliverableReason};
use servineo_test_utils::{MockReply, TestHarness};

fn registered(outcome: SubmissionOutcome) -> (ServiceRequest, DeliveryReport) {
    match outcome {
        SubmissionOutcome::Registered { request, delivery } => (request, delivery),
        other => panic!("expected a registration, got {other:?}"),
    }
}

#[tokio::test]
async fn first_send_succeeds() {
    let h = TestHarness::builder().build().unwrap();

    let (request, delivery) = registered(h.submit(TestHarness::form()).await.unwrap());

    assert_eq!(delivery.state, DeliveryState::Succeeded);
    assert!(delivery.warning.is_none());
    assert_eq!(request.status, RequestStatus::Sent);
    assert_eq!(delivery.attempts.len(), 1);
    assert_eq!(delivery.attempts[0].attempt_number, 1);
    assert_eq!(delivery.attempts[0].outcome, AttemptOutcome::Success);

    let keys = h.sender.idempotency_keys().await;
    assert_eq!(keys, vec![Some(request.id.to_string())]);
    assert_eq!(h.sender.sent_messages().await[0].number, "59169542509");
    assert!(h.scheduler.waits().await.is_empty());
}

#[tokio::test]
async fn no_channel_number_is_rejected_without_sending() {
    let h = TestHarness::builder().build().unwrap();
    let form = RequestForm {
        phone: "77480958".into(),
        ..TestHarness::form()
    };

    let (request, delivery) = registered(h.submit(form).await.unwrap());

    assert_eq!(delivery.state, DeliveryState::Rejected);
    assert_eq!(h.sender.sent_count().await, 0);
    assert_eq!(request.status, RequestStatus::Failed);
    assert!(delivery.warning.is_some());
    assert_eq!(delivery.validation.error_kind, Some(ChannelErrorKind::NoChannel));

    let log = h.guard.attempts().recent(None).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].outcome, AttemptOutcome::ValidationFailed);

    let undeliverable = h.guard.registry().undeliverable(None).await.unwrap();
    assert_eq!(undeliverable.len(), 1);
    assert_eq!(undeliverable[0].reason, UndeliverableReason::ChannelRejected);
    assert_eq!(undeliverable[0].channel_error, Some(ChannelErrorKind::NoChannel));
}

#[tokio::test]
async fn exhausted_after_three_retries() {
    let h = TestHarness::builder()
        .with_fallback(MockReply::server_error())
        .build()
        .unwrap();

    let (request, delivery) = registered(h.submit(TestHarness::form()).await.unwrap());
    let id = request.id.to_string();

    assert_eq!(delivery.state, DeliveryState::Exhausted);
    // Registered, never rolled back.
    assert_eq!(request.status, RequestStatus::Created);
    assert_eq!(h.guard.registry().archive().await.unwrap().len(), 1);
    assert!(delivery.warning.as_deref().unwrap().contains("no pudimos enviar la confirmación"));

    let log = h.guard.attempts().recent(None).await.unwrap();
    assert_eq!(log.len(), 4);
    let numbers: Vec<u32> = log.iter().rev().map(|a| a.attempt_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert!(log.iter().all(|a| a.outcome == AttemptOutcome::Failed));
    assert!(log.iter().all(|a| a.error_text.as_deref().unwrap().contains("500")));

    assert_eq!(
        h.scheduler.waits().await,
        vec![
            Duration::from_millis(5_000),
            Duration::from_millis(15_000),
            Duration::from_millis(30_000),
        ]
    );
    assert_eq!(
        h.sender.idempotency_keys().await,
        vec![
            Some(id.clone()),
            Some(format!("{id}-retry-1")),
            Some(format!("{id}-retry-2")),
            Some(format!("{id}-retry-3")),
        ]
    );

    let undeliverable = h.guard.registry().undeliverable(None).await.unwrap();
    assert_eq!(undeliverable[0].reason, UndeliverableReason::RetriesExhausted);
}

#[tokio::test]
async fn retry_recovers_transient_failures() {
    let h = TestHarness::builder()
        .with_replies(vec![MockReply::Unreachable, MockReply::Timeout])
        .build()
        .unwrap();

    let (request, delivery) = registered(h.submit(TestHarness::form()).await.unwrap());

    assert_eq!(delivery.state, DeliveryState::Succeeded);
    assert_eq!(request.status, RequestStatus::Sent);
    let outcomes: Vec<AttemptOutcome> = delivery.attempts.iter().map(|a| a.outcome).collect();
    assert_eq!(
        outcomes,
        vec![AttemptOutcome::Failed, AttemptOutcome::Failed, AttemptOutcome::Success]
    );
    assert_eq!(delivery.attempts[2].wait_ms, 15_000);
    assert_eq!(h.scheduler.waits().await.len(), 2);
}

#[tokio::test]
async fn malformed_number_is_still_attempted() {
    let h = TestHarness::builder().build().unwrap();
    let form = RequestForm {
        phone: "123".into(),
        ..TestHarness::form()
    };

    let (_, delivery) = registered(h.submit(form).await.unwrap());

    assert_eq!(h.sender.sent_count().await, 1);
    assert_eq!(delivery.state, DeliveryState::Succeeded);
    assert_eq!(delivery.validation.error_kind, Some(ChannelErrorKind::TooShort));
}

#[tokio::test]
async fn revalidation_before_first_retry_can_reject() {
    let h = TestHarness::builder()
        .with_fallback(MockReply::server_error())
        .build()
        .unwrap();
    let now = h.clock.now();
    let mut stored = servineo_test_utils::sample_request("SOL-REVALIDATE", now);
    stored.phone = "77480958".into();
    h.guard.registry().register(stored.clone()).await.unwrap();

    // The caller still holds the number as it was at submission time.
    let mut in_hand = stored.clone();
    in_hand.phone = "69542509".into();
    let delivery = h.guard.orchestrator().deliver(&in_hand).await.unwrap();

    assert_eq!(delivery.state, DeliveryState::Rejected);
    assert_eq!(h.sender.sent_count().await, 1);
    assert!(h.scheduler.waits().await.is_empty());
    let outcomes: Vec<AttemptOutcome> = delivery.attempts.iter().map(|a| a.outcome).collect();
    assert_eq!(outcomes, vec![AttemptOutcome::Failed, AttemptOutcome::ValidationFailed]);
    assert_eq!(delivery.attempts[1].attempt_number, 2);

    let current = h.guard.registry().get(&stored.id).await.unwrap().unwrap();
    assert_eq!(current.status, RequestStatus::Failed);
}

#[tokio::test]
async fn endpoint_no_account_signal_is_logged_as_validation_failure() {
    let h = TestHarness::builder()
        .with_replies(vec![MockReply::NoAccount])
        .build()
        .unwrap();

    let (_, delivery) = registered(h.submit(TestHarness::form()).await.unwrap());

    assert_eq!(delivery.attempts[0].outcome, AttemptOutcome::ValidationFailed);
    assert_eq!(delivery.state, DeliveryState::Succeeded);
}

#[tokio::test]
async fn exhaustion_alerts_configured_admin() {
    let mut config = ServineoConfig::default();
    config.escalation.admin_number = Some("59169542500".into());
    let h = TestHarness::builder()
        .with_config(config)
        .with_replies(vec![MockReply::server_error(); 4])
        .build()
        .unwrap();

    let (_, delivery) = registered(h.submit(TestHarness::form()).await.unwrap());

    assert_eq!(delivery.state, DeliveryState::Exhausted);
    let sent = h.sender.sent_messages().await;
    assert_eq!(sent.len(), 5);
    assert_eq!(sent[4].number, "59169542500");
    assert!(sent[4].text.contains("Confirmación no entregada"));
    // The alert is not a delivery attempt.
    assert_eq!(h.guard.attempts().len().await.unwrap(), 4);
}

#[tokio::test]
async fn attempt_log_respects_cap() {
    let mut config = ServineoConfig::default();
    config.delivery.attempt_log_cap = 5;
    let h = TestHarness::builder()
        .with_config(config)
        .with_fallback(MockReply::server_error())
        .build()
        .unwrap();

    h.submit(TestHarness::form()).await.unwrap();
    let second = RequestForm {
        requester_name: "Ana Rojas".into(),
        ..TestHarness::form()
    };
    let (second, _) = registered(h.submit(second).await.unwrap());

    let log = h.guard.attempts().recent(None).await.unwrap();
    assert_eq!(log.len(), 5);
    // Newest first; the oldest three entries of the first session were evicted.
    assert!(log[..4].iter().all(|a| a.request_id == second.id));
    assert_eq!(log[4].attempt_number, 4);
}

#[tokio::test]
async fn shorter_retry_schedule_is_honoured() {
    let mut config = ServineoConfig::default();
    config.delivery.retry_delays_ms = vec![100];
    let h = TestHarness::builder()
        .with_config(config)
        .with_fallback(MockReply::server_error())
        .build()
        .unwrap();

    let (_, delivery) = registered(h.submit(TestHarness::form()).await.unwrap());

    assert_eq!(delivery.state, DeliveryState::Exhausted);
    assert_eq!(delivery.attempts.len(), 2);
    assert_eq!(h.scheduler.waits().await, vec![Duration::from_millis(100)]);
}
