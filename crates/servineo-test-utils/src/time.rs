// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic clock, ids and scheduler.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use servineo_core::traits::{Clock, IdGenerator, Scheduler};
use tokio::sync::Mutex;

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: StdMutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: StdMutex::new(start),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = at;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Ids `SOL-TEST-0001`, `SOL-TEST-0002`, ... after any queued ids.
#[derive(Debug, Default)]
pub struct SequenceIds {
    queued: StdMutex<VecDeque<String>>,
    counter: StdMutex<u32>,
}

impl SequenceIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out `ids` first, e.g. to force a collision.
    pub fn with_queued(ids: &[&str]) -> Self {
        Self {
            queued: StdMutex::new(ids.iter().map(|s| s.to_string()).collect()),
            counter: StdMutex::new(0),
        }
    }
}

impl IdGenerator for SequenceIds {
    fn generate(&self, _now: DateTime<Utc>) -> String {
        if let Some(id) = self.queued.lock().ok().and_then(|mut q| q.pop_front()) {
            return id;
        }
        let mut counter = match self.counter.lock() {
            Ok(c) => c,
            Err(poisoned) => poisoned.into_inner(),
        };
        *counter += 1;
        format!("SOL-TEST-{:04}", *counter)
    }
}

/// A scheduler that records requested waits and returns immediately.
#[derive(Debug, Default, Clone)]
pub struct RecordingScheduler {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn waits(&self) -> Vec<Duration> {
        self.waits.lock().await.clone()
    }
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().await.push(duration);
    }
}
