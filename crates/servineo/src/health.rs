// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `servineo health` command implementation.
//!
//! Asks each adapter behind the guard for its health without writing
//! anything: the data directory is not created and no message is sent.

use std::time::Instant;

use serde::Serialize;
use servineo_config::model::ServineoConfig;
use servineo_core::{AdapterType, HealthStatus, PluginAdapter, ServineoError};
use servineo_storage::JsonFileStore;
use servineo_whatsapp::WhatsAppSender;

use crate::output::Output;

/// One adapter's answer.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterHealth {
    pub name: String,
    pub kind: AdapterType,
    /// `None` when the adapter could not be constructed.
    pub version: Option<String>,
    /// `healthy`, `degraded` or `unhealthy`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub duration_ms: u64,
}

impl AdapterHealth {
    fn unavailable(name: &str, kind: AdapterType, error: &ServineoError) -> Self {
        Self {
            name: name.to_string(),
            kind,
            version: None,
            status: "unhealthy",
            detail: Some(error.to_string()),
            duration_ms: 0,
        }
    }

    pub fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Runs `adapter`'s health check. A failing check counts as unhealthy.
pub async fn check(adapter: &dyn PluginAdapter) -> AdapterHealth {
    let started = Instant::now();
    let (status, detail) = match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => ("healthy", None),
        Ok(HealthStatus::Degraded(why)) => ("degraded", Some(why)),
        Ok(HealthStatus::Unhealthy(why)) => ("unhealthy", Some(why)),
        Err(e) => ("unhealthy", Some(e.to_string())),
    };
    AdapterHealth {
        name: adapter.name().to_string(),
        kind: adapter.adapter_type(),
        version: Some(adapter.version().to_string()),
        status,
        detail,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

pub async fn run_health(config: &ServineoConfig, out: &Output) -> Result<(), ServineoError> {
    let mut results = vec![check(&JsonFileStore::from_config(&config.storage)).await];
    results.push(match WhatsAppSender::new(&config.whatsapp) {
        Ok(sender) => check(&sender).await,
        Err(e) => AdapterHealth::unavailable("whatsapp-evolution", AdapterType::Channel, &e),
    });

    if out.json {
        out.print_json(&results)?;
    } else {
        print_results(&results, out);
    }

    let unhealthy = results.iter().filter(|r| r.is_unhealthy()).count();
    if unhealthy > 0 {
        return Err(ServineoError::Internal(format!(
            "{unhealthy} adapter(s) unhealthy"
        )));
    }
    Ok(())
}

fn print_results(results: &[AdapterHealth], out: &Output) {
    out.heading("servineo health");
    for result in results {
        let label = format!(
            "{:<20} {:<8} {}",
            result.name,
            result.kind,
            result.version.as_deref().unwrap_or("-")
        );
        let line = match result.status {
            "healthy" => out.ok(&label),
            "degraded" => out.warn(&label),
            _ => out.fail(&label),
        };
        println!("    {line} ({}ms)", result.duration_ms);
        if let Some(detail) = &result.detail {
            println!("        {detail}");
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use servineo_storage::MemoryStore;
    use servineo_test_utils::{FailingStore, MockSender};

    #[tokio::test]
    async fn healthy_adapter_reports_identity() {
        let result = check(&MemoryStore::new()).await;
        assert_eq!(result.name, "memory");
        assert_eq!(result.kind, AdapterType::Storage);
        assert_eq!(result.version.as_deref(), Some("0.1.0"));
        assert_eq!(result.status, "healthy");
        assert!(result.detail.is_none());
    }

    #[tokio::test]
    async fn degraded_adapter_keeps_the_reason() {
        let result = check(&FailingStore::failing_saves(&["requests"])).await;
        assert_eq!(result.status, "degraded");
        assert!(!result.is_unhealthy());
        assert!(result.detail.unwrap().contains("writes fail"));
    }

    #[tokio::test]
    async fn missing_data_dir_is_degraded_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("absent");

        let result = check(&JsonFileStore::new(&data_dir)).await;
        assert_eq!(result.status, "degraded");
        assert!(!data_dir.exists());
    }

    #[tokio::test]
    async fn channel_adapter_is_checked() {
        let result = check(&MockSender::new()).await;
        assert_eq!(result.kind, AdapterType::Channel);
    }

    #[test]
    fn missing_api_key_is_unhealthy() {
        let err = ServineoError::Config("whatsapp.api_key is not set".into());
        let result = AdapterHealth::unavailable("whatsapp-evolution", AdapterType::Channel, &err);
        assert!(result.is_unhealthy());
        assert!(result.version.is_none());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["kind"], "Channel");
    }
}
