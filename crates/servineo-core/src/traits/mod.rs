// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Port trait definitions.
//!
//! Adapters behind I/O ports (channel, storage) extend the [`PluginAdapter`]
//! base trait and use `#[async_trait]` for dynamic dispatch compatibility.
//! The clock, id and scheduler ports are injected so the guard can be driven
//! deterministically in tests.

pub mod adapter;
pub mod channel;
pub mod clock;
pub mod scheduler;
pub mod storage;

pub use adapter::PluginAdapter;
pub use channel::MessageSender;
pub use clock::{Clock, IdGenerator, RandomIds, SystemClock};
pub use scheduler::{Scheduler, TokioScheduler};
pub use storage::{load_typed, save_typed, CollectionStore};
