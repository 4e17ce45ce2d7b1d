// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles a complete guard over an in-memory store with a
//! scripted sender, a manual clock, sequential ids and a scheduler that
//! never sleeps.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use servineo_config::model::ServineoConfig;
use servineo_core::ServineoError;
use servineo_guard::{Guard, RequestForm, SubmissionOutcome};
use servineo_storage::MemoryStore;

use crate::fixtures::at;
use crate::mock_sender::{MockReply, MockSender};
use crate::time::{ManualClock, RecordingScheduler, SequenceIds};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: ServineoConfig,
    replies: Vec<MockReply>,
    fallback: MockReply,
    start: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: ServineoConfig::default(),
            replies: Vec::new(),
            fallback: MockReply::Delivered,
            // Tuesday morning in La Paz.
            start: at(2025, 10, 14, 14, 0),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: ServineoConfig) -> Self {
        self.config = config;
        self
    }

    /// Replies consumed by the first sends, in order.
    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Reply for every send after the scripted ones.
    pub fn with_fallback(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Initial clock time.
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn build(self) -> Result<TestHarness, ServineoError> {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(MockSender::scripted(self.replies).with_fallback(self.fallback));
        let clock = Arc::new(ManualClock::new(self.start));
        let scheduler = RecordingScheduler::new();

        let guard = Guard::builder(&self.config)
            .store(store.clone())
            .sender(sender.clone())
            .clock(clock.clone())
            .ids(Arc::new(SequenceIds::new()))
            .scheduler(Arc::new(scheduler.clone()))
            .build()?;

        Ok(TestHarness {
            guard: Arc::new(guard),
            store,
            sender,
            clock,
            scheduler,
        })
    }
}

/// A fully wired guard plus handles on every fake behind it.
pub struct TestHarness {
    /// Shared so tests can submit from spawned tasks.
    pub guard: Arc<Guard>,
    pub store: Arc<MemoryStore>,
    pub sender: Arc<MockSender>,
    pub clock: Arc<ManualClock>,
    pub scheduler: RecordingScheduler,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A form that registers cleanly with the default configuration.
    pub fn form() -> RequestForm {
        RequestForm {
            requester_name: "Juan Pérez".to_string(),
            country_code: "+591".to_string(),
            phone: "69542509".to_string(),
            zone: "Sopocachi".to_string(),
            service_type: "Reparación de laptop".to_string(),
            description: "Necesito reparar la pantalla de mi laptop Dell".to_string(),
            fixer_name: None,
            work_on_saturday: false,
        }
    }

    pub async fn submit(&self, form: RequestForm) -> Result<SubmissionOutcome, ServineoError> {
        self.guard.submit(form).await
    }
}
