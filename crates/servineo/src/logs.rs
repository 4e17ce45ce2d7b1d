// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only listing commands over the local collections.
//!
//! None of these need the WhatsApp credentials, so they open the store
//! directly instead of building a full guard.

use std::sync::Arc;

use servineo_config::model::ServineoConfig;
use servineo_core::{
    AttemptOutcome, CollectionStore, RandomIds, ServiceRequest, ServineoError, SystemClock,
};
use servineo_guard::attempt_log::ATTEMPTS_KEY;
use servineo_guard::calendar::{description_preview, format_timestamp, local_offset};
use servineo_guard::duplicate::AUDIT_KEY;
use servineo_guard::message::status_label;
use servineo_guard::{AttemptLog, CappedLog, DuplicateCheck, RequestRegistry};

use crate::output::Output;
use crate::wiring;

type Store = Arc<dyn CollectionStore + Send + Sync>;

fn registry(store: Store, config: &ServineoConfig) -> RequestRegistry {
    RequestRegistry::new(
        store,
        Arc::new(RandomIds),
        Arc::new(SystemClock),
        config.duplicates.recent_window_cap,
        config.delivery.undeliverable_log_cap,
    )
}

/// Registered requests, most recent first.
async fn latest_requests(
    registry: &RequestRegistry,
    limit: Option<usize>,
) -> Result<Vec<ServiceRequest>, ServineoError> {
    let mut requests = registry.archive().await?;
    requests.reverse();
    if let Some(limit) = limit {
        requests.truncate(limit);
    }
    Ok(requests)
}

pub async fn run_requests(
    config: &ServineoConfig,
    limit: Option<usize>,
    out: &Output,
) -> Result<(), ServineoError> {
    let store: Store = wiring::open_store(config).await?;
    let requests = latest_requests(&registry(store, config), limit).await?;
    if out.json {
        return out.print_json(&requests);
    }

    let offset = local_offset(config.app.utc_offset_hours);
    out.heading(&format!("servineo requests ({})", requests.len()));
    for request in &requests {
        println!(
            "    {}  {}  {:<9} {} / {} / {}",
            request.id,
            format_timestamp(request.created_at, offset),
            status_label(request.status),
            request.requester_name,
            request.service_type,
            description_preview(&request.description),
        );
    }
    println!();
    Ok(())
}

pub async fn run_history(
    config: &ServineoConfig,
    limit: Option<usize>,
    out: &Output,
) -> Result<(), ServineoError> {
    let store: Store = wiring::open_store(config).await?;
    let log = AttemptLog::new(store, ATTEMPTS_KEY, config.delivery.attempt_log_cap);
    let attempts = log.recent(limit).await?;
    if out.json {
        return out.print_json(&attempts);
    }

    let offset = local_offset(config.app.utc_offset_hours);
    out.heading(&format!("servineo history ({})", attempts.len()));
    for attempt in &attempts {
        let label = attempt.outcome.to_string();
        let outcome = match attempt.outcome {
            AttemptOutcome::Success => out.ok(&label),
            AttemptOutcome::Started => label,
            AttemptOutcome::Failed | AttemptOutcome::ValidationFailed => out.fail(&label),
        };
        println!(
            "    {} #{} {}  wait {}ms  {}",
            attempt.request_id,
            attempt.attempt_number,
            format_timestamp(attempt.timestamp, offset),
            attempt.wait_ms,
            outcome,
        );
        if let Some(error) = &attempt.error_text {
            println!("        {error}");
        }
    }
    println!();
    Ok(())
}

pub async fn run_duplicates(
    config: &ServineoConfig,
    limit: Option<usize>,
    out: &Output,
) -> Result<(), ServineoError> {
    let store: Store = wiring::open_store(config).await?;
    let audit: CappedLog<DuplicateCheck> =
        CappedLog::new(store, AUDIT_KEY, config.duplicates.audit_log_cap);
    let checks = audit.recent(limit).await?;
    if out.json {
        return out.print_json(&checks);
    }

    let offset = local_offset(config.app.utc_offset_hours);
    out.heading(&format!("servineo duplicates ({})", checks.len()));
    for check in &checks {
        let verdict = match &check.matched_id {
            Some(id) => out.warn(&format!("duplicate of {id}")),
            None => out.ok("unique"),
        };
        let similarity = check
            .best_similarity
            .map(|s| format!("  best {s:.3}"))
            .unwrap_or_default();
        println!(
            "    {}  {}  {} / {}  compared {}{}  {}",
            format_timestamp(check.checked_at, offset),
            check.policy,
            check.requester_name,
            check.service_type,
            check.compared,
            similarity,
            verdict,
        );
    }
    println!();
    Ok(())
}

pub async fn run_undeliverable(
    config: &ServineoConfig,
    limit: Option<usize>,
    out: &Output,
) -> Result<(), ServineoError> {
    let store: Store = wiring::open_store(config).await?;
    let records = registry(store, config).undeliverable(limit).await?;
    if out.json {
        return out.print_json(&records);
    }

    let offset = local_offset(config.app.utc_offset_hours);
    out.heading(&format!("servineo undeliverable ({})", records.len()));
    for record in &records {
        println!(
            "    {}  {}  {}  {}",
            record.request.id,
            format_timestamp(record.recorded_at, offset),
            out.fail(&record.reason.to_string()),
            record.request.destination_number(),
        );
        println!("        {}", record.detail);
    }
    println!();
    Ok(())
}
