// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `servineo submit` command implementation.

use clap::Args;
use serde::Serialize;
use servineo_config::model::ServineoConfig;
use servineo_core::{RequestStatus, ServineoError};
use servineo_guard::calendar::format_date;
use servineo_guard::message::status_label;
use servineo_guard::{RequestForm, SubmissionOutcome};

use crate::output::Output;
use crate::wiring;

/// Request form fields.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Requester's full name.
    #[arg(long)]
    pub name: String,
    /// Dialling prefix; defaults to `whatsapp.country_code`.
    #[arg(long)]
    pub country_code: Option<String>,
    /// Local phone number.
    #[arg(long)]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub zone: String,
    /// Type of service requested.
    #[arg(long)]
    pub service: String,
    #[arg(long)]
    pub description: String,
    /// Ask for a specific fixer.
    #[arg(long)]
    pub fixer: Option<String>,
    /// The requester accepts visits on Saturday.
    #[arg(long)]
    pub saturday: bool,
}

impl SubmitArgs {
    fn into_form(self, default_country_code: &str) -> RequestForm {
        RequestForm {
            requester_name: self.name,
            country_code: self
                .country_code
                .unwrap_or_else(|| default_country_code.to_string()),
            phone: self.phone,
            zone: self.zone,
            service_type: self.service,
            description: self.description,
            fixer_name: self.fixer,
            work_on_saturday: self.saturday,
        }
    }
}

/// Structured submission result for `--json` mode.
#[derive(Debug, Serialize)]
struct SubmitResponse {
    outcome: &'static str,
    request_id: String,
    status: RequestStatus,
    estimated_response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivery: Option<String>,
    attempts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

impl From<&SubmissionOutcome> for SubmitResponse {
    fn from(outcome: &SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Duplicate { existing, warning } => Self {
                outcome: "duplicate",
                request_id: existing.id.to_string(),
                status: existing.status,
                estimated_response: format_date(existing.estimated_response),
                delivery: None,
                attempts: 0,
                warning: Some(warning.clone()),
            },
            SubmissionOutcome::Registered { request, delivery } => Self {
                outcome: "registered",
                request_id: request.id.to_string(),
                status: request.status,
                estimated_response: format_date(request.estimated_response),
                delivery: Some(delivery.state.to_string()),
                attempts: delivery.attempts.len(),
                warning: delivery.warning.clone(),
            },
        }
    }
}

/// Runs the submission pipeline for one form.
pub async fn run_submit(
    config: &ServineoConfig,
    args: SubmitArgs,
    out: &Output,
) -> Result<(), ServineoError> {
    let guard = wiring::build_guard(config).await?;
    let form = args.into_form(&config.whatsapp.country_code);
    let outcome = guard.submit(form).await?;
    let response = SubmitResponse::from(&outcome);

    if out.json {
        return out.print_json(&response);
    }

    out.heading("servineo submit");
    println!("    Código:   {}", response.request_id);
    println!("    Estado:   {}", status_label(response.status));
    println!("    Respuesta estimada: {}", response.estimated_response);
    match &outcome {
        SubmissionOutcome::Duplicate { .. } => {
            println!("    Registro: {}", out.warn("no registrada (duplicada)"));
        }
        SubmissionOutcome::Registered { delivery, .. } if delivery.delivered() => {
            println!("    Registro: {}", out.ok("registrada"));
            println!("    WhatsApp: {}", out.ok("confirmación enviada"));
        }
        SubmissionOutcome::Registered { delivery, .. } => {
            println!("    Registro: {}", out.ok("registrada"));
            println!(
                "    WhatsApp: {}",
                out.fail(&format!("{} tras {} intento(s)", delivery.state, response.attempts))
            );
        }
    }
    if let Some(warning) = &response.warning {
        println!();
        println!("  {}", out.warn(warning));
    }
    println!();
    Ok(())
}
