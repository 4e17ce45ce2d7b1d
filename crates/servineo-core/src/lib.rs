// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Servineo request guard.
//!
//! This crate provides the error type, the domain types shared by every
//! other crate (service requests, delivery attempts, channel validation
//! results), and the port traits through which the guard reaches its
//! collaborators: storage, clock, id generation, scheduling and the
//! messaging channel.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ServineoError;
pub use types::{
    AdapterType, AttemptOutcome, ChannelErrorKind, ChannelValidationResult, DeliveryAttempt,
    HealthStatus, OutboundMessage, RequestId, RequestStatus, SendReceipt, ServiceRequest,
};

// Re-export all port traits at crate root.
pub use traits::{
    Clock, CollectionStore, IdGenerator, MessageSender, PluginAdapter, RandomIds, Scheduler,
    SystemClock, TokioScheduler,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn servineo_error_has_all_variants() {
        let _config = ServineoError::Config("test".into());
        let _storage = ServineoError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = ServineoError::Channel {
            message: "test".into(),
            source: None,
        };
        let _rejected = ServineoError::Rejected {
            status: Some(500),
            body: "boom".into(),
        };
        let _timeout = ServineoError::Timeout {
            duration: std::time::Duration::from_secs(10),
        };
        let _validation = ServineoError::Validation("test".into());
        let _internal = ServineoError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Channel, AdapterType::Storage] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_port_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_message_sender<T: MessageSender>() {}
        fn _assert_collection_store<T: CollectionStore>() {}
        fn _assert_clock<T: Clock>() {}
        fn _assert_id_generator<T: IdGenerator>() {}
        fn _assert_scheduler<T: Scheduler>() {}
    }
}
