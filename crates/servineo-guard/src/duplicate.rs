// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate detection for incoming service requests.
//!
//! Two disjoint policies, picked by whether the candidate names a fixer:
//!
//! - **Named fixer**: any archived request for the same fixer and the same
//!   service type inside the window is a duplicate, whatever it says.
//! - **No fixer**: a request in the recent window from the same requester,
//!   for the same service in the same zone, also without a fixer, inside
//!   the window, whose description is more similar than the threshold.
//!
//! Every check is appended to an audit log. The log is never read back by
//! detection.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use servineo_config::model::DuplicatesConfig;
use servineo_core::error::ServineoError;
use servineo_core::traits::{Clock, CollectionStore};
use servineo_core::types::{RequestId, ServiceRequest};
use strum::Display;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attempt_log::CappedLog;
use crate::similarity::similarity;

/// Store key of the duplicate-check audit log.
pub const AUDIT_KEY: &str = "duplicate_audit";

/// Tunables for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateSettings {
    /// Similarity must be strictly greater than this.
    pub similarity_threshold: f64,
    /// How far back a previous request still counts.
    pub window: Duration,
}

impl DuplicateSettings {
    pub fn from_config(config: &DuplicatesConfig) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            window: Duration::hours(i64::from(config.window_hours)),
        }
    }
}

impl Default for DuplicateSettings {
    fn default() -> Self {
        Self::from_config(&DuplicatesConfig::default())
    }
}

/// Which rule set a check used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DuplicatePolicy {
    NamedFixer,
    SimilarDescription,
}

/// Result of one duplicate check.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub policy: DuplicatePolicy,
    pub matched: Option<ServiceRequest>,
    /// Requests that passed the field filters and were compared.
    pub compared: usize,
    /// Highest description similarity seen (similar-description policy only).
    pub best_similarity: Option<f64>,
}

/// One audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCheck {
    pub id: Uuid,
    pub checked_at: DateTime<Utc>,
    pub policy: DuplicatePolicy,
    pub requester_name: String,
    pub service_type: String,
    pub zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixer_name: Option<String>,
    pub description: String,
    pub compared: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_id: Option<RequestId>,
    pub duplicate: bool,
}

/// Pure duplicate search. `now` bounds the window.
pub fn detect(
    candidate: &ServiceRequest,
    recent_window: &[ServiceRequest],
    archive: &[ServiceRequest],
    now: DateTime<Utc>,
    settings: &DuplicateSettings,
) -> Detection {
    let since = now - settings.window;
    match candidate.fixer_name.as_deref() {
        Some(fixer) => {
            let fixer = normalize(fixer);
            let service = normalize(&candidate.service_type);
            let mut compared = 0;
            let matched = archive
                .iter()
                .filter(|r| r.created_at > since)
                .find(|r| {
                    compared += 1;
                    r.fixer_name.as_deref().map(normalize).as_deref() == Some(fixer.as_str())
                        && normalize(&r.service_type) == service
                })
                .cloned();
            Detection {
                policy: DuplicatePolicy::NamedFixer,
                matched,
                compared,
                best_similarity: None,
            }
        }
        None => {
            let mut compared = 0;
            let mut best: Option<f64> = None;
            let matched = recent_window
                .iter()
                .filter(|r| {
                    !r.has_fixer()
                        && r.requester_name == candidate.requester_name
                        && r.service_type == candidate.service_type
                        && r.zone == candidate.zone
                        && r.created_at > since
                })
                .find(|r| {
                    compared += 1;
                    let score = similarity(&r.description, &candidate.description);
                    best = Some(best.map_or(score, |b| b.max(score)));
                    score > settings.similarity_threshold
                })
                .cloned();
            Detection {
                policy: DuplicatePolicy::SimilarDescription,
                matched,
                compared,
                best_similarity: best,
            }
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Duplicate detector with an audit trail.
pub struct DuplicateDetector {
    settings: DuplicateSettings,
    audit: CappedLog<DuplicateCheck>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl DuplicateDetector {
    pub fn new(
        settings: DuplicateSettings,
        store: Arc<dyn CollectionStore + Send + Sync>,
        audit_cap: usize,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            settings,
            audit: CappedLog::new(store, AUDIT_KEY, audit_cap),
            clock,
        }
    }

    pub fn settings(&self) -> &DuplicateSettings {
        &self.settings
    }

    /// Returns the earlier request `candidate` duplicates, if any.
    ///
    /// Audit write failures are logged and otherwise ignored.
    pub async fn find_duplicate(
        &self,
        candidate: &ServiceRequest,
        recent_window: &[ServiceRequest],
        archive: &[ServiceRequest],
    ) -> Option<ServiceRequest> {
        let now = self.clock.now();
        let detection = detect(candidate, recent_window, archive, now, &self.settings);

        if let Some(existing) = &detection.matched {
            info!(
                policy = %detection.policy,
                existing = %existing.id,
                similarity = ?detection.best_similarity,
                "duplicate request detected"
            );
        }

        let entry = DuplicateCheck {
            id: Uuid::new_v4(),
            checked_at: now,
            policy: detection.policy,
            requester_name: candidate.requester_name.clone(),
            service_type: candidate.service_type.clone(),
            zone: candidate.zone.clone(),
            fixer_name: candidate.fixer_name.clone(),
            description: candidate.description.clone(),
            compared: detection.compared,
            best_similarity: detection.best_similarity,
            matched_id: detection.matched.as_ref().map(|r| r.id.clone()),
            duplicate: detection.matched.is_some(),
        };
        if let Err(e) = self.audit.append(entry).await {
            warn!(error = %e, "failed to append duplicate-check audit entry");
        }

        detection.matched
    }

    /// Audit entries, most recent first.
    pub async fn audit_trail(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<DuplicateCheck>, ServineoError> {
        self.audit.recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servineo_storage::MemoryStore;
    use servineo_test_utils::{FailingStore, ManualClock, at, sample_request};
    use tracing_test::traced_test;

    const LAPTOP: &str = "Necesito reparar la pantalla de mi laptop Dell";
    const LAPTOP_BROKEN: &str = "Necesito reparar la pantalla de mi laptop Dell que se rompió";

    fn with_fixer(id: &str, created: DateTime<Utc>, fixer: &str, service: &str) -> ServiceRequest {
        let mut r = sample_request(id, created);
        r.fixer_name = Some(fixer.to_string());
        r.service_type = service.to_string();
        r
    }

    #[test]
    fn named_fixer_matches_regardless_of_description() {
        let now = at(2025, 10, 14, 12, 0);
        let mut earlier = with_fixer("SOL-1", now - Duration::hours(3), "Carlos", "Plomería");
        earlier.description = "Fuga en el baño".into();
        let mut candidate = with_fixer("SOL-2", now, "Carlos", "Plomería");
        candidate.description = "Cambiar grifo de cocina".into();

        let detection = detect(&candidate, &[], &[earlier.clone()], now, &DuplicateSettings::default());
        assert_eq!(detection.policy, DuplicatePolicy::NamedFixer);
        assert_eq!(detection.matched, Some(earlier));
    }

    #[test]
    fn named_fixer_compare_is_trimmed_and_case_insensitive() {
        let now = at(2025, 10, 14, 12, 0);
        let earlier = with_fixer("SOL-1", now - Duration::hours(1), "  carlos ", "PLOMERÍA");
        let candidate = with_fixer("SOL-2", now, "Carlos", "plomería");

        let detection = detect(&candidate, &[], &[earlier], now, &DuplicateSettings::default());
        assert!(detection.matched.is_some());
    }

    #[test]
    fn named_fixer_outside_window_is_not_duplicate() {
        let now = at(2025, 10, 14, 12, 0);
        let earlier = with_fixer("SOL-1", now - Duration::hours(25), "Carlos", "Plomería");
        let candidate = with_fixer("SOL-2", now, "Carlos", "Plomería");

        let detection = detect(&candidate, &[], &[earlier], now, &DuplicateSettings::default());
        assert!(detection.matched.is_none());
    }

    #[test]
    fn named_fixer_first_archive_match_wins() {
        let now = at(2025, 10, 14, 12, 0);
        let first = with_fixer("SOL-1", now - Duration::hours(5), "Carlos", "Plomería");
        let second = with_fixer("SOL-2", now - Duration::hours(1), "Carlos", "Plomería");
        let candidate = with_fixer("SOL-3", now, "Carlos", "Plomería");

        let detection = detect(&candidate, &[], &[first, second], now, &DuplicateSettings::default());
        assert_eq!(detection.matched.map(|r| r.id.0), Some("SOL-1".to_string()));
    }

    #[test]
    fn named_fixer_ignores_recent_window() {
        let now = at(2025, 10, 14, 12, 0);
        let earlier = with_fixer("SOL-1", now - Duration::hours(1), "Carlos", "Plomería");
        let candidate = with_fixer("SOL-2", now, "Carlos", "Plomería");

        let detection = detect(&candidate, &[earlier], &[], now, &DuplicateSettings::default());
        assert!(detection.matched.is_none());
    }

    #[test]
    fn appended_clause_matches_with_relaxed_threshold() {
        // The extra clause puts the pair at ~0.77, under the default 0.9.
        let now = at(2025, 10, 14, 12, 0);
        let earlier = sample_request("SOL-1", now - Duration::hours(2));
        let mut candidate = sample_request("SOL-2", now);
        candidate.description = LAPTOP_BROKEN.into();
        let recent = [earlier.clone()];

        let strict = detect(&candidate, &recent, &recent, now, &DuplicateSettings::default());
        assert!(strict.matched.is_none());

        let relaxed = DuplicateSettings {
            similarity_threshold: 0.75,
            ..DuplicateSettings::default()
        };
        let detection = detect(&candidate, &recent, &recent, now, &relaxed);
        assert_eq!(detection.matched, Some(earlier));
        assert_eq!(detection.compared, 1);
    }

    #[test]
    fn near_identical_description_matches_at_default_threshold() {
        let now = at(2025, 10, 14, 12, 0);
        let earlier = sample_request("SOL-1", now - Duration::hours(2));
        let mut candidate = sample_request("SOL-2", now);
        candidate.description = format!("{LAPTOP}.");

        let detection = detect(&candidate, &[earlier.clone()], &[], now, &DuplicateSettings::default());
        assert_eq!(detection.matched, Some(earlier));
        assert!(detection.best_similarity.unwrap() > 0.9);
    }

    #[test]
    fn earlier_request_with_fixer_is_skipped() {
        let now = at(2025, 10, 14, 12, 0);
        let mut earlier = sample_request("SOL-1", now - Duration::hours(2));
        earlier.fixer_name = Some("Carlos".into());
        let candidate = sample_request("SOL-2", now);

        let detection = detect(&candidate, &[earlier], &[], now, &DuplicateSettings::default());
        assert!(detection.matched.is_none());
        assert_eq!(detection.compared, 0);
    }

    #[test]
    fn different_zone_or_requester_is_not_duplicate() {
        let now = at(2025, 10, 14, 12, 0);
        let mut other_zone = sample_request("SOL-1", now - Duration::hours(1));
        other_zone.zone = "Miraflores".into();
        let mut other_requester = sample_request("SOL-2", now - Duration::hours(1));
        other_requester.requester_name = "Ana Rojas".into();
        let candidate = sample_request("SOL-3", now);

        let detection = detect(
            &candidate,
            &[other_zone, other_requester],
            &[],
            now,
            &DuplicateSettings::default(),
        );
        assert!(detection.matched.is_none());
    }

    #[test]
    fn stale_request_is_outside_window() {
        let now = at(2025, 10, 14, 12, 0);
        let earlier = sample_request("SOL-1", now - Duration::hours(24));
        let candidate = sample_request("SOL-2", now);

        let detection = detect(&candidate, &[earlier], &[], now, &DuplicateSettings::default());
        assert!(detection.matched.is_none());
    }

    #[test]
    fn window_is_configurable() {
        let now = at(2025, 10, 14, 12, 0);
        let earlier = sample_request("SOL-1", now - Duration::hours(30));
        let candidate = sample_request("SOL-2", now);
        let settings = DuplicateSettings {
            window: Duration::hours(48),
            ..DuplicateSettings::default()
        };

        assert!(detect(&candidate, &[earlier], &[], now, &settings).matched.is_some());
    }

    #[tokio::test]
    async fn every_check_is_audited() {
        let now = at(2025, 10, 14, 12, 0);
        let store = Arc::new(MemoryStore::new());
        let detector = DuplicateDetector::new(
            DuplicateSettings::default(),
            store,
            10,
            Arc::new(ManualClock::new(now)),
        );
        let earlier = sample_request("SOL-1", now - Duration::hours(1));
        let candidate = sample_request("SOL-2", now);
        let mut unrelated = sample_request("SOL-3", now);
        unrelated.service_type = "Electricidad".into();

        assert!(detector.find_duplicate(&candidate, &[earlier.clone()], &[]).await.is_some());
        assert!(detector.find_duplicate(&unrelated, &[earlier], &[]).await.is_none());

        let trail = detector.audit_trail(None).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert!(!trail[0].duplicate);
        assert_eq!(trail[0].service_type, "Electricidad");
        assert!(trail[1].duplicate);
        assert_eq!(trail[1].matched_id, Some(RequestId("SOL-1".into())));
        assert_eq!(trail[1].policy, DuplicatePolicy::SimilarDescription);
    }

    #[tokio::test]
    #[traced_test]
    async fn unwritable_audit_leaves_the_decision_alone() {
        let now = at(2025, 10, 14, 12, 0);
        let detector = DuplicateDetector::new(
            DuplicateSettings::default(),
            Arc::new(FailingStore::failing_saves(&[AUDIT_KEY])),
            10,
            Arc::new(ManualClock::new(now)),
        );
        let earlier = sample_request("SOL-1", now - Duration::hours(1));
        let candidate = sample_request("SOL-2", now);
        let mut unrelated = sample_request("SOL-3", now);
        unrelated.service_type = "Electricidad".into();

        let matched = detector.find_duplicate(&candidate, &[earlier.clone()], &[]).await;
        assert_eq!(matched.map(|r| r.id), Some(RequestId("SOL-1".into())));
        assert!(detector.find_duplicate(&unrelated, &[earlier], &[]).await.is_none());

        assert!(detector.audit_trail(None).await.unwrap().is_empty());
        assert!(logs_contain("failed to append duplicate-check audit entry"));
    }
}
