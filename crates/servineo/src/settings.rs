// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `servineo config` command implementation.

use servineo_config::model::ServineoConfig;
use servineo_core::ServineoError;

use crate::output::Output;

const MASK: &str = "********";

/// Prints the effective configuration as TOML (or JSON with `--json`).
pub fn run_config(config: &ServineoConfig, out: &Output) -> Result<(), ServineoError> {
    let shown = masked(config);
    if out.json {
        return out.print_json(&shown);
    }
    print!("{}", render_toml(&shown)?);
    Ok(())
}

/// A copy of `config` with credentials replaced.
fn masked(config: &ServineoConfig) -> ServineoConfig {
    let mut shown = config.clone();
    for secret in [&mut shown.whatsapp.api_key, &mut shown.whatsapp.auth_token] {
        if secret.is_some() {
            *secret = Some(MASK.to_string());
        }
    }
    shown
}

fn render_toml(config: &ServineoConfig) -> Result<String, ServineoError> {
    toml::to_string_pretty(config)
        .map_err(|e| ServineoError::Internal(format!("failed to render config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_are_masked() {
        let mut config = ServineoConfig::default();
        config.whatsapp.api_key = Some("secret-key".into());

        let text = render_toml(&masked(&config)).unwrap();
        assert!(!text.contains("secret-key"));
        assert!(text.contains(MASK));
        assert!(!text.contains("auth_token"));
    }

    #[test]
    fn rendered_config_loads_back() {
        let text = render_toml(&masked(&ServineoConfig::default())).unwrap();
        let config = servineo_config::load_and_validate_str(&text).unwrap();
        assert_eq!(config.whatsapp.instance, "pruebas");
        assert_eq!(config.escalation.max_failures, 3);
    }
}
