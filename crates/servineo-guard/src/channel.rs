// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number classification for the WhatsApp channel.
//!
//! Malformed numbers stay retry-eligible: they may be typos corrected before
//! a retry fires. Numbers known to lack the channel, or structurally bogus
//! ones, are terminal and must not consume any retry budget.

use std::collections::HashSet;

use servineo_config::model::ChannelConfig;
use servineo_core::types::{ChannelErrorKind, ChannelValidationResult};

/// Classifies phone numbers against the configured channel rules.
#[derive(Debug, Clone)]
pub struct ChannelValidator {
    required_digits: usize,
    no_channel: HashSet<String>,
    invalid: HashSet<String>,
}

impl ChannelValidator {
    pub fn new(config: &ChannelConfig) -> Self {
        Self {
            required_digits: config.required_digits,
            no_channel: config.no_channel_numbers.iter().cloned().collect(),
            invalid: config.invalid_numbers.iter().cloned().collect(),
        }
    }

    /// Classifies `raw`. Rules apply in order; the first one that fires wins.
    pub fn validate(&self, raw: &str) -> ChannelValidationResult {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        if digits.is_empty() {
            return ChannelValidationResult::invalid(digits, ChannelErrorKind::Empty, true);
        }
        if digits.len() < self.required_digits {
            return ChannelValidationResult::invalid(digits, ChannelErrorKind::TooShort, true);
        }
        if digits.len() > self.required_digits {
            return ChannelValidationResult::invalid(digits, ChannelErrorKind::TooLong, true);
        }
        if self.no_channel.contains(&digits) {
            return ChannelValidationResult::invalid(digits, ChannelErrorKind::NoChannel, false);
        }
        if self.invalid.contains(&digits) || is_single_repeated_digit(&digits) {
            return ChannelValidationResult::invalid(digits, ChannelErrorKind::Invalid, false);
        }

        ChannelValidationResult::valid(digits)
    }
}

impl Default for ChannelValidator {
    fn default() -> Self {
        Self::new(&ChannelConfig::default())
    }
}

/// `11111111`, `00000000`, ...
fn is_single_repeated_digit(digits: &str) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}
