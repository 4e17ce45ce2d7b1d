// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Servineo request guard.

use thiserror::Error;

/// Marker the Evolution API puts in a rejection body when the number has no
/// WhatsApp account behind it.
const NO_ACCOUNT_MARKER: &str = "\"exists\":false";

/// The primary error type used across all Servineo ports and core operations.
#[derive(Debug, Error)]
pub enum ServineoError {
    /// Configuration errors (invalid TOML, missing secrets, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Collection store errors (I/O, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport-level channel failure: the request never got an answer.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The messaging endpoint answered, but not with success.
    ///
    /// `status` is `None` when the endpoint returned 2xx with a
    /// `success: false` body.
    #[error("message rejected (status {status:?}): {body}")]
    Rejected { status: Option<u16>, body: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Form validation failed before any storage or network activity.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServineoError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// True when the endpoint rejected the message because the number is not
    /// reachable on the channel.
    pub fn is_channel_validation_signal(&self) -> bool {
        match self {
            Self::Rejected { body, .. } => {
                let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
                compact.contains(NO_ACCOUNT_MARKER)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_no_account_rejection() {
        let err = ServineoError::Rejected {
            status: Some(400),
            body: r#"{"status":400,"response":{"message":[{"exists": false,"number":"59177480958"}]}}"#
                .into(),
        };
        assert!(err.is_channel_validation_signal());
    }

    #[test]
    fn server_errors_are_not_validation_signals() {
        let err = ServineoError::Rejected {
            status: Some(503),
            body: "service unavailable".into(),
        };
        assert!(!err.is_channel_validation_signal());

        let err = ServineoError::Channel {
            message: "connection refused".into(),
            source: None,
        };
        assert!(!err.is_channel_validation_signal());
    }
}
