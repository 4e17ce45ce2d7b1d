// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./servineo.toml` > `~/.config/servineo/servineo.toml`
//! > `/etc/servineo/servineo.toml` with environment variable overrides via the
//! `SERVINEO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ServineoConfig;

pub(crate) const LOCAL_CONFIG_FILE: &str = "servineo.toml";
pub(crate) const SYSTEM_CONFIG_FILE: &str = "/etc/servineo/servineo.toml";

/// Sections addressable through `SERVINEO_<SECTION>_<KEY>`.
const ENV_SECTIONS: &[&str] = &[
    "app",
    "whatsapp",
    "duplicates",
    "channel",
    "delivery",
    "storage",
    "escalation",
];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("servineo").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/servineo/servineo.toml`
/// 3. `~/.config/servineo/servineo.toml`
/// 4. `./servineo.toml`
/// 5. `SERVINEO_*` environment variables
pub fn load_config() -> Result<ServineoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ServineoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ServineoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ServineoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ServineoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ServineoConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_FILE))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `SERVINEO_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `SERVINEO_WHATSAPP_API_KEY` must become `whatsapp.api_key`,
/// not `whatsapp.api.key`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("SERVINEO_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
