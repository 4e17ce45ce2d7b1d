// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The submission pipeline: validate, check duplicates, register, deliver.

use servineo_core::error::ServineoError;
use servineo_core::types::{RequestId, ServiceRequest};
use tracing::info;

use crate::delivery::DeliveryReport;
use crate::guard::Guard;
use crate::intake::RequestForm;
use crate::message;

/// How a submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Nothing was registered; an earlier request already covers this one.
    Duplicate {
        existing: ServiceRequest,
        warning: String,
    },
    /// The request was registered. Delivery may still have failed; see
    /// [`DeliveryReport::warning`].
    Registered {
        request: ServiceRequest,
        delivery: DeliveryReport,
    },
}

impl SubmissionOutcome {
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Duplicate { warning, .. } => Some(warning),
            Self::Registered { delivery, .. } => delivery.warning.as_deref(),
        }
    }
}

impl Guard {
    /// Runs one submission end to end.
    ///
    /// Validation errors and storage failures are returned as `Err`.
    /// Duplicates and delivery problems are outcomes, not errors.
    pub async fn submit(&self, form: RequestForm) -> Result<SubmissionOutcome, ServineoError> {
        form.validate()?;

        let now = self.clock.now();
        let id = RequestId(self.ids.generate(now));
        let candidate = form.into_request(id, now, self.offset);

        // Check and register as one step so concurrent identical
        // submissions cannot both pass the duplicate check.
        let registered = {
            let _intake = self.intake_lock.lock().await;
            let recent = self.registry.recent_window().await?;
            let archive = self.registry.archive().await?;
            if let Some(existing) = self
                .detector
                .find_duplicate(&candidate, &recent, &archive)
                .await
            {
                let warning = message::duplicate_warning(&existing);
                return Ok(SubmissionOutcome::Duplicate { existing, warning });
            }
            self.registry.register(candidate).await?
        };

        let delivery = self.orchestrator.deliver(&registered).await?;
        let request = self
            .registry
            .get(&registered.id)
            .await?
            .unwrap_or(registered);

        info!(
            request_id = %request.id,
            status = %request.status,
            delivery = %delivery.state,
            "submission complete"
        );
        Ok(SubmissionOutcome::Registered { request, delivery })
    }
}
