// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembles the guard from configuration and adapters.

use std::sync::Arc;

use chrono::FixedOffset;
use servineo_config::model::ServineoConfig;
use servineo_core::error::ServineoError;
use tokio::sync::Mutex;

use servineo_core::traits::{
    Clock, CollectionStore, IdGenerator, MessageSender, RandomIds, Scheduler, SystemClock,
    TokioScheduler,
};

use crate::attempt_log::{ATTEMPTS_KEY, AttemptLog};
use crate::calendar::local_offset;
use crate::channel::ChannelValidator;
use crate::delivery::DeliveryOrchestrator;
use crate::duplicate::{DuplicateDetector, DuplicateSettings};
use crate::notify::Notifier;
use crate::registry::RequestRegistry;

/// The assembled duplicate and delivery guard.
pub struct Guard {
    pub(crate) registry: Arc<RequestRegistry>,
    pub(crate) detector: DuplicateDetector,
    pub(crate) orchestrator: DeliveryOrchestrator,
    pub(crate) notifier: Notifier,
    pub(crate) attempts: Arc<AttemptLog>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) ids: Arc<dyn IdGenerator + Send + Sync>,
    pub(crate) offset: FixedOffset,
    /// Held from the duplicate check until the request is registered.
    pub(crate) intake_lock: Mutex<()>,
}

impl Guard {
    pub fn builder(config: &ServineoConfig) -> GuardBuilder {
        GuardBuilder::new(config)
    }

    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    pub fn detector(&self) -> &DuplicateDetector {
        &self.detector
    }

    pub fn orchestrator(&self) -> &DeliveryOrchestrator {
        &self.orchestrator
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn attempts(&self) -> &AttemptLog {
        &self.attempts
    }
}

/// Builder for [`Guard`]. Store and sender are required; clock, ids and
/// scheduler default to the real ones.
pub struct GuardBuilder {
    config: ServineoConfig,
    store: Option<Arc<dyn CollectionStore + Send + Sync>>,
    sender: Option<Arc<dyn MessageSender + Send + Sync>>,
    clock: Arc<dyn Clock + Send + Sync>,
    ids: Arc<dyn IdGenerator + Send + Sync>,
    scheduler: Arc<dyn Scheduler + Send + Sync>,
}

impl GuardBuilder {
    pub fn new(config: &ServineoConfig) -> Self {
        Self {
            config: config.clone(),
            store: None,
            sender: None,
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIds),
            scheduler: Arc::new(TokioScheduler),
        }
    }

    pub fn store(mut self, store: Arc<dyn CollectionStore + Send + Sync>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn sender(mut self, sender: Arc<dyn MessageSender + Send + Sync>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator + Send + Sync>) -> Self {
        self.ids = ids;
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler + Send + Sync>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn build(self) -> Result<Guard, ServineoError> {
        let store = self
            .store
            .ok_or_else(|| ServineoError::Config("guard needs a collection store".to_string()))?;
        let sender = self
            .sender
            .ok_or_else(|| ServineoError::Config("guard needs a message sender".to_string()))?;
        let config = self.config;
        let offset = local_offset(config.app.utc_offset_hours);

        let registry = Arc::new(RequestRegistry::new(
            Arc::clone(&store),
            Arc::clone(&self.ids),
            Arc::clone(&self.clock),
            config.duplicates.recent_window_cap,
            config.delivery.undeliverable_log_cap,
        ));
        let attempts = Arc::new(AttemptLog::new(
            Arc::clone(&store),
            ATTEMPTS_KEY,
            config.delivery.attempt_log_cap,
        ));
        let detector = DuplicateDetector::new(
            DuplicateSettings::from_config(&config.duplicates),
            Arc::clone(&store),
            config.duplicates.audit_log_cap,
            Arc::clone(&self.clock),
        );
        let orchestrator = DeliveryOrchestrator::new(
            Arc::clone(&sender),
            ChannelValidator::new(&config.channel),
            Arc::clone(&registry),
            Arc::clone(&attempts),
            self.scheduler,
            Arc::clone(&self.clock),
            &config.delivery,
            offset,
            config.escalation.admin_number.clone(),
        );
        let notifier = Notifier::new(
            sender,
            Arc::clone(&self.clock),
            offset,
            config.escalation.clone(),
        );

        Ok(Guard {
            registry,
            detector,
            orchestrator,
            notifier,
            attempts,
            clock: self.clock,
            ids: self.ids,
            offset,
            intake_lock: Mutex::new(()),
        })
    }
}
