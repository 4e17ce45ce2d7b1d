// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Servineo integration tests.
//!
//! Provides mock adapters, deterministic time and ids, and a test harness
//! that wires the whole submission pipeline over an in-memory store.

pub mod failing_store;
pub mod fixtures;
pub mod harness;
pub mod mock_sender;
pub mod time;

pub use failing_store::FailingStore;
pub use fixtures::{at, sample_request};
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_sender::{MockReply, MockSender};
pub use time::{ManualClock, RecordingScheduler, SequenceIds};
