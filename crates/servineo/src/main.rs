// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Servineo - duplicate and delivery guard for service requests.
//!
//! This is the binary entry point. Every subcommand loads and validates the
//! configuration first; a broken config file is rendered with source spans
//! and the process exits with status 1.

mod health;
mod logs;
mod notify;
mod output;
mod settings;
mod submit;
mod wiring;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use servineo_config::model::ServineoConfig;

use crate::notify::{CancelArgs, StatusArgs};
use crate::output::Output;
use crate::submit::SubmitArgs;

/// Servineo - duplicate and delivery guard for service requests.
#[derive(Parser, Debug)]
#[command(name = "servineo", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colors.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a service request and send the WhatsApp confirmation.
    Submit(SubmitArgs),
    /// List registered requests, most recent first.
    Requests {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the delivery attempt log, most recent first.
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the duplicate-check audit trail, most recent first.
    Duplicates {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List requests whose confirmation could not be delivered.
    Undeliverable {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Tell a fixer that an appointment was cancelled.
    Cancel(CancelArgs),
    /// Tell a requester that the fixer accepted or rejected their request.
    Status(StatusArgs),
    /// Print the effective configuration with secrets masked.
    Config,
    /// Check the storage and WhatsApp adapters without sending anything.
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            servineo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    let out = Output::new(cli.json, cli.plain);
    let result = match cli.command {
        Commands::Submit(args) => submit::run_submit(&config, args, &out).await,
        Commands::Requests { limit } => logs::run_requests(&config, limit, &out).await,
        Commands::History { limit } => logs::run_history(&config, limit, &out).await,
        Commands::Duplicates { limit } => logs::run_duplicates(&config, limit, &out).await,
        Commands::Undeliverable { limit } => logs::run_undeliverable(&config, limit, &out).await,
        Commands::Cancel(args) => notify::run_cancel(&config, args, &out).await,
        Commands::Status(args) => notify::run_status(&config, args, &out).await,
        Commands::Config => settings::run_config(&config, &out),
        Commands::Health => health::run_health(&config, &out).await,
    };

    if let Err(e) = result {
        eprintln!("servineo: {e}");
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<ServineoConfig, Vec<servineo_config::ConfigError>> {
    match &cli.config {
        Some(path) => servineo_config::load_and_validate_path(path),
        None => servineo_config::load_and_validate(),
    }
}

/// Initialize the tracing subscriber with an env-filter.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("servineo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = servineo_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.duplicates.similarity_threshold, 0.9);
        assert_eq!(config.delivery.retry_delays_ms, vec![5_000, 15_000, 30_000]);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["servineo", "history", "--limit", "5", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::History { limit: Some(5) }));
    }

    #[test]
    fn status_parses_decision() {
        let cli = Cli::try_parse_from([
            "servineo",
            "status",
            "SOL-1",
            "rejected",
            "--reason",
            "Sin disponibilidad",
        ])
        .unwrap();
        let Commands::Status(args) = cli.command else {
            panic!("expected status command");
        };
        assert_eq!(args.decision, servineo_guard::StatusDecision::Rejected);
        assert_eq!(args.reason.as_deref(), Some("Sin disponibilidad"));
    }

    #[test]
    fn unknown_decision_is_rejected() {
        assert!(Cli::try_parse_from(["servineo", "status", "SOL-1", "maybe"]).is_err());
    }

    #[test]
    fn explicit_config_path_is_parsed() {
        let cli = Cli::try_parse_from(["servineo", "--config", "/etc/servineo.toml", "config"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/servineo.toml")));
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn health_takes_no_arguments() {
        let cli = Cli::try_parse_from(["servineo", "health", "--plain"]).unwrap();
        assert!(cli.plain);
        assert!(matches!(cli.command, Commands::Health));
        assert!(Cli::try_parse_from(["servineo", "health", "extra"]).is_err());
    }
}
