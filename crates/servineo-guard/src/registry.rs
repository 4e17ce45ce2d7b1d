// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local archive of registered service requests.
//!
//! Requests live in two collections: the full archive and a capped rolling
//! window of the most recent registrations used for duplicate checks. After
//! registration only `status` ever changes, and it changes in both.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use servineo_core::error::ServineoError;
use servineo_core::traits::{Clock, CollectionStore, IdGenerator, load_typed, save_typed};
use servineo_core::types::{ChannelErrorKind, RequestId, RequestStatus, ServiceRequest};
use strum::Display;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::attempt_log::{CappedLog, evict_oldest};

/// Store key of the full archive.
pub const ARCHIVE_KEY: &str = "requests";
/// Store key of the rolling window of recent requests.
pub const RECENT_KEY: &str = "recent_requests";
/// Store key of the undeliverable-requests log.
pub const UNDELIVERABLE_KEY: &str = "undeliverable_requests";

/// Id regenerations tried before registration gives up.
const MAX_ID_ATTEMPTS: usize = 16;

/// Why a request ended up in the undeliverable log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UndeliverableReason {
    /// The channel validator classified the number as terminal.
    ChannelRejected,
    /// Every retry failed.
    RetriesExhausted,
}

/// A registered request whose confirmation could not be delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndeliverableRecord {
    pub request: ServiceRequest,
    pub reason: UndeliverableReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_error: Option<ChannelErrorKind>,
    pub detail: String,
    pub recorded_at: DateTime<Utc>,
}

/// Owns the request collections and serialises every write to them.
pub struct RequestRegistry {
    store: Arc<dyn CollectionStore + Send + Sync>,
    ids: Arc<dyn IdGenerator + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
    recent_cap: usize,
    undeliverable: CappedLog<UndeliverableRecord>,
    write_lock: Mutex<()>,
}

impl RequestRegistry {
    pub fn new(
        store: Arc<dyn CollectionStore + Send + Sync>,
        ids: Arc<dyn IdGenerator + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        recent_cap: usize,
        undeliverable_cap: usize,
    ) -> Self {
        Self {
            undeliverable: CappedLog::new(Arc::clone(&store), UNDELIVERABLE_KEY, undeliverable_cap),
            store,
            ids,
            clock,
            recent_cap: recent_cap.max(1),
            write_lock: Mutex::new(()),
        }
    }

    /// Every registered request, oldest first.
    pub async fn archive(&self) -> Result<Vec<ServiceRequest>, ServineoError> {
        load_typed(self.store.as_ref(), ARCHIVE_KEY).await
    }

    /// The rolling window of recent requests, oldest first.
    pub async fn recent_window(&self) -> Result<Vec<ServiceRequest>, ServineoError> {
        load_typed(self.store.as_ref(), RECENT_KEY).await
    }

    pub async fn get(&self, id: &RequestId) -> Result<Option<ServiceRequest>, ServineoError> {
        Ok(self.archive().await?.into_iter().find(|r| &r.id == id))
    }

    /// Persists `request` in the archive and the recent window.
    ///
    /// If the id is already taken a fresh one is generated. Returns the
    /// request as stored.
    pub async fn register(
        &self,
        mut request: ServiceRequest,
    ) -> Result<ServiceRequest, ServineoError> {
        let _guard = self.write_lock.lock().await;
        let mut archive: Vec<ServiceRequest> = self.archive().await?;

        let mut tries = 0;
        while archive.iter().any(|r| r.id == request.id) {
            tries += 1;
            if tries > MAX_ID_ATTEMPTS {
                return Err(ServineoError::Internal(format!(
                    "could not generate a unique request id after {MAX_ID_ATTEMPTS} attempts"
                )));
            }
            let fresh = RequestId(self.ids.generate(self.clock.now()));
            debug!(collided = %request.id, fresh = %fresh, "request id collision, regenerating");
            request.id = fresh;
        }

        archive.push(request.clone());
        save_typed(self.store.as_ref(), ARCHIVE_KEY, &archive).await?;

        let mut recent = self.recent_window().await?;
        recent.push(request.clone());
        evict_oldest(&mut recent, self.recent_cap);
        save_typed(self.store.as_ref(), RECENT_KEY, &recent).await?;

        info!(
            request_id = %request.id,
            service = %request.service_type,
            has_fixer = request.has_fixer(),
            "service request registered"
        );
        Ok(request)
    }

    /// Sets the status of `id` in both collections.
    ///
    /// Returns the updated request, or `None` when the id is unknown.
    pub async fn update_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<Option<ServiceRequest>, ServineoError> {
        let _guard = self.write_lock.lock().await;

        let mut archive = self.archive().await?;
        let Some(updated) = set_status(&mut archive, id, status) else {
            return Ok(None);
        };
        save_typed(self.store.as_ref(), ARCHIVE_KEY, &archive).await?;

        let mut recent = self.recent_window().await?;
        if set_status(&mut recent, id, status).is_some() {
            save_typed(self.store.as_ref(), RECENT_KEY, &recent).await?;
        }

        debug!(request_id = %id, %status, "request status updated");
        Ok(Some(updated))
    }

    /// Records `request` in the undeliverable log for operator review.
    pub async fn record_undeliverable(
        &self,
        request: &ServiceRequest,
        reason: UndeliverableReason,
        channel_error: Option<ChannelErrorKind>,
        detail: impl Into<String>,
    ) -> Result<(), ServineoError> {
        self.undeliverable
            .append(UndeliverableRecord {
                request: request.clone(),
                reason,
                channel_error,
                detail: detail.into(),
                recorded_at: self.clock.now(),
            })
            .await
    }

    /// Undeliverable records, most recent first.
    pub async fn undeliverable(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<UndeliverableRecord>, ServineoError> {
        self.undeliverable.recent(limit).await
    }
}

fn set_status(
    requests: &mut [ServiceRequest],
    id: &RequestId,
    status: RequestStatus,
) -> Option<ServiceRequest> {
    let request = requests.iter_mut().find(|r| &r.id == id)?;
    request.status = status;
    Some(request.clone())
}
