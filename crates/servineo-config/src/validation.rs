// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: ranges, non-empty schedules, digit-only phone lists.

use crate::diagnostic::ConfigError;
use crate::model::ServineoConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or every collected error
/// (does not fail fast).
pub fn validate_config(config: &ServineoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !(-12..=14).contains(&config.app.utc_offset_hours) {
        fail(format!(
            "app.utc_offset_hours must be between -12 and 14, got {}",
            config.app.utc_offset_hours
        ));
    }

    if config.whatsapp.base_url.trim().is_empty() {
        fail("whatsapp.base_url must not be empty".to_string());
    }

    if config.whatsapp.instance.trim().is_empty() {
        fail("whatsapp.instance must not be empty".to_string());
    }

    if config.whatsapp.timeout_secs == 0 {
        fail("whatsapp.timeout_secs must be at least 1".to_string());
    }

    if !is_digits(&config.whatsapp.country_code) {
        fail(format!(
            "whatsapp.country_code `{}` must contain digits only",
            config.whatsapp.country_code
        ));
    }

    let threshold = config.duplicates.similarity_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        fail(format!(
            "duplicates.similarity_threshold must be in (0, 1], got {threshold}"
        ));
    }

    if config.duplicates.window_hours == 0 {
        fail("duplicates.window_hours must be at least 1".to_string());
    }

    if config.duplicates.recent_window_cap == 0 {
        fail("duplicates.recent_window_cap must be at least 1".to_string());
    }

    if config.duplicates.audit_log_cap == 0 {
        fail("duplicates.audit_log_cap must be at least 1".to_string());
    }

    if config.channel.required_digits == 0 {
        fail("channel.required_digits must be at least 1".to_string());
    }

    for (list, numbers) in [
        ("no_channel_numbers", &config.channel.no_channel_numbers),
        ("invalid_numbers", &config.channel.invalid_numbers),
    ] {
        for number in numbers {
            if !is_digits(number) {
                fail(format!("channel.{list} entry `{number}` must contain digits only"));
            }
        }
    }

    if config.delivery.retry_delays_ms.is_empty() {
        fail("delivery.retry_delays_ms must list at least one delay".to_string());
    }

    for (i, delay) in config.delivery.retry_delays_ms.iter().enumerate() {
        if *delay == 0 {
            fail(format!("delivery.retry_delays_ms[{i}] must be greater than 0"));
        }
    }

    if config.delivery.attempt_log_cap == 0 {
        fail("delivery.attempt_log_cap must be at least 1".to_string());
    }

    if config.delivery.undeliverable_log_cap == 0 {
        fail("delivery.undeliverable_log_cap must be at least 1".to_string());
    }

    if config.storage.data_dir.trim().is_empty() {
        fail("storage.data_dir must not be empty".to_string());
    }

    if let Some(admin) = &config.escalation.admin_number
        && !is_digits(admin)
    {
        fail(format!(
            "escalation.admin_number `{admin}` must contain digits only"
        ));
    }

    if config.escalation.max_failures == 0 {
        fail("escalation.max_failures must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = ServineoConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn threshold_out_of_range_fails_validation() {
        let mut config = ServineoConfig::default();
        config.duplicates.similarity_threshold = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "similarity_threshold"));

        config.duplicates.similarity_threshold = 0.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "similarity_threshold"));
    }

    #[test]
    fn empty_retry_schedule_fails_validation() {
        let mut config = ServineoConfig::default();
        config.delivery.retry_delays_ms.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "retry_delays_ms"));
    }

    #[test]
    fn zero_delay_fails_validation() {
        let mut config = ServineoConfig::default();
        config.delivery.retry_delays_ms = vec![5_000, 0];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "retry_delays_ms[1]"));
    }

    #[test]
    fn non_digit_denylist_entry_fails_validation() {
        let mut config = ServineoConfig::default();
        config.channel.no_channel_numbers.push("7748-0958".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "no_channel_numbers"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = ServineoConfig::default();
        config.duplicates.window_hours = 0;
        config.delivery.attempt_log_cap = 0;
        config.storage.data_dir = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn admin_number_with_plus_fails_validation() {
        let mut config = ServineoConfig::default();
        config.escalation.admin_number = Some("+59169542509".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "admin_number"));
    }
}
