// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate detection and delivery guard for Servineo service requests.
//!
//! A submission is checked against recent requests, registered once in the
//! local archive, and confirmed to the requester over WhatsApp. Confirmation
//! delivery follows a fixed retry schedule and classifies phone numbers so
//! numbers that can never receive messages do not consume retries.
//!
//! All I/O goes through the ports in `servineo-core`: a collection store, a
//! message sender, a clock, an id generator and a scheduler.

pub mod attempt_log;
pub mod calendar;
pub mod channel;
pub mod delivery;
pub mod duplicate;
pub mod guard;
pub mod intake;
pub mod message;
pub mod notify;
pub mod registry;
pub mod similarity;
pub mod submission;

pub use attempt_log::{AttemptLog, CappedLog};
pub use channel::ChannelValidator;
pub use delivery::{DeliveryOrchestrator, DeliveryReport, DeliveryState};
pub use duplicate::{DuplicateCheck, DuplicateDetector, DuplicatePolicy, DuplicateSettings};
pub use guard::{Guard, GuardBuilder};
pub use intake::RequestForm;
pub use notify::{CancellationNotice, NotificationReport, Notifier, StatusDecision, StatusUpdate};
pub use registry::{RequestRegistry, UndeliverableReason, UndeliverableRecord};
pub use similarity::similarity;
pub use submission::SubmissionOutcome;
