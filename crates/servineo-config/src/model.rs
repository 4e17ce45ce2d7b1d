// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Servineo request guard.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Servineo configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to the values the guard was tuned with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServineoConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// WhatsApp (Evolution API) endpoint settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Duplicate detection tuning.
    #[serde(default)]
    pub duplicates: DuplicatesConfig,

    /// Phone number rules for the messaging channel.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Confirmation delivery and retry settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Local collection storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Administrator escalation settings.
    #[serde(default)]
    pub escalation: EscalationConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Offset from UTC used for displayed dates and the estimated response date.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_utc_offset_hours() -> i32 {
    -4
}

/// WhatsApp messaging endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Base URL of the Evolution API deployment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Evolution API instance name; messages go to `/message/sendText/<instance>`.
    #[serde(default = "default_instance")]
    pub instance: String,

    /// Value of the `apikey` header. `None` requires the environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Bearer token for the `Authorization` header.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default dialling prefix for requesters, without `+`.
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            instance: default_instance(),
            api_key: None,
            auth_token: None,
            timeout_secs: default_timeout_secs(),
            country_code: default_country_code(),
        }
    }
}

fn default_base_url() -> String {
    "https://n8n-evolution-api.oumu0g.easypanel.host".to_string()
}

fn default_instance() -> String {
    "pruebas".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_country_code() -> String {
    "591".to_string()
}

/// Duplicate detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DuplicatesConfig {
    /// Descriptions must be strictly more similar than this to count as duplicates.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Only requests created within this many hours are compared.
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,

    /// Size of the rolling window of recent requests.
    #[serde(default = "default_recent_window_cap")]
    pub recent_window_cap: usize,

    /// Maximum entries kept in the duplicate-check audit log.
    #[serde(default = "default_audit_log_cap")]
    pub audit_log_cap: usize,
}

impl Default for DuplicatesConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            window_hours: default_window_hours(),
            recent_window_cap: default_recent_window_cap(),
            audit_log_cap: default_audit_log_cap(),
        }
    }
}

fn default_similarity_threshold() -> f64 {
    0.9
}

fn default_window_hours() -> u32 {
    24
}

fn default_recent_window_cap() -> usize {
    100
}

fn default_audit_log_cap() -> usize {
    500
}

/// Phone number rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Exact number of local digits a phone number must have.
    #[serde(default = "default_required_digits")]
    pub required_digits: usize,

    /// Numbers known to have no WhatsApp account. Never retried.
    #[serde(default = "default_no_channel_numbers")]
    pub no_channel_numbers: Vec<String>,

    /// Structurally invalid numbers, in addition to all-same-digit numbers.
    #[serde(default = "default_invalid_numbers")]
    pub invalid_numbers: Vec<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            required_digits: default_required_digits(),
            no_channel_numbers: default_no_channel_numbers(),
            invalid_numbers: default_invalid_numbers(),
        }
    }
}

fn default_required_digits() -> usize {
    8
}

fn default_no_channel_numbers() -> Vec<String> {
    vec!["77480958".to_string()]
}

fn default_invalid_numbers() -> Vec<String> {
    vec!["12345678".to_string(), "87654321".to_string()]
}

/// Confirmation delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Waits before each retry, in milliseconds. One retry per entry.
    #[serde(default = "default_retry_delays_ms")]
    pub retry_delays_ms: Vec<u64>,

    /// Maximum entries kept in the delivery attempt log.
    #[serde(default = "default_attempt_log_cap")]
    pub attempt_log_cap: usize,

    /// Maximum entries kept in the undeliverable-requests log.
    #[serde(default = "default_undeliverable_log_cap")]
    pub undeliverable_log_cap: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            retry_delays_ms: default_retry_delays_ms(),
            attempt_log_cap: default_attempt_log_cap(),
            undeliverable_log_cap: default_undeliverable_log_cap(),
        }
    }
}

fn default_retry_delays_ms() -> Vec<u64> {
    vec![5_000, 15_000, 30_000]
}

fn default_attempt_log_cap() -> usize {
    500
}

fn default_undeliverable_log_cap() -> usize {
    100
}

/// Local storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding one JSON file per collection.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("servineo"))
        .unwrap_or_else(|| std::path::PathBuf::from("servineo-data"))
        .to_string_lossy()
        .into_owned()
}

/// Administrator escalation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationConfig {
    /// Name shown in administrator alerts.
    #[serde(default = "default_admin_name")]
    pub admin_name: String,

    /// Administrator phone (country code included). `None` disables alerts.
    #[serde(default)]
    pub admin_number: Option<String>,

    /// Failed status-update sends before the administrator is alerted.
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            admin_name: default_admin_name(),
            admin_number: None,
            max_failures: default_max_failures(),
        }
    }
}

fn default_admin_name() -> String {
    "Administrador ServiNeo".to_string()
}

fn default_max_failures() -> u32 {
    3
}
