// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `servineo cancel` and `servineo status` command implementations.

use clap::Args;
use servineo_config::model::ServineoConfig;
use servineo_core::{RequestId, ServiceRequest, ServineoError};
use servineo_guard::{CancellationNotice, NotificationReport, StatusDecision, StatusUpdate};

use crate::output::Output;
use crate::wiring;

/// Cancellation notice fields.
#[derive(Args, Debug)]
pub struct CancelArgs {
    /// Fixer's name.
    #[arg(long)]
    pub fixer: String,
    /// Fixer's phone, country code included.
    #[arg(long)]
    pub fixer_phone: String,
    /// Requester who cancelled.
    #[arg(long)]
    pub requester: String,
    /// Appointment title.
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Link to the appointment details.
    #[arg(long)]
    pub link: Option<String>,
}

/// Status update fields.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Registered request id (e.g. SOL-M1X2Y3-ABC123XYZ).
    pub id: String,
    /// `accepted` or `rejected`.
    pub decision: StatusDecision,
    /// Why the request was rejected. Required with `rejected`.
    #[arg(long)]
    pub reason: Option<String>,
    /// Fixer's name; defaults to the fixer named on the request.
    #[arg(long)]
    pub fixer: Option<String>,
    /// Fixer's phone, notified if the update keeps failing.
    #[arg(long)]
    pub fixer_phone: Option<String>,
    #[arg(long)]
    pub link: Option<String>,
}

impl StatusArgs {
    fn into_update(self, request: &ServiceRequest) -> Result<StatusUpdate, ServineoError> {
        let fixer_name = self
            .fixer
            .or_else(|| request.fixer_name.clone())
            .ok_or_else(|| {
                ServineoError::Validation(format!(
                    "request {} names no fixer; pass --fixer",
                    request.id
                ))
            })?;
        Ok(StatusUpdate {
            request_id: request.id.clone(),
            requester_name: request.requester_name.clone(),
            requester_number: request.destination_number(),
            service_type: request.service_type.clone(),
            fixer_name,
            fixer_number: self.fixer_phone,
            decision: self.decision,
            reason: self.reason,
            link: self.link,
        })
    }
}

pub async fn run_cancel(
    config: &ServineoConfig,
    args: CancelArgs,
    out: &Output,
) -> Result<(), ServineoError> {
    let guard = wiring::build_guard(config).await?;
    let notice = CancellationNotice {
        fixer_name: args.fixer,
        fixer_number: args.fixer_phone,
        requester_name: args.requester,
        title: args.title,
        description: args.description,
        link: args.link,
    };
    let report = guard.notifier().send_cancellation(&notice).await?;
    print_report("servineo cancel", &report, out)
}

pub async fn run_status(
    config: &ServineoConfig,
    args: StatusArgs,
    out: &Output,
) -> Result<(), ServineoError> {
    let guard = wiring::build_guard(config).await?;
    let id = RequestId(args.id.clone());
    let request = guard
        .registry()
        .get(&id)
        .await?
        .ok_or_else(|| ServineoError::Validation(format!("no request registered as {id}")))?;
    let update = args.into_update(&request)?;
    let report = guard.notifier().send_status_update(&update).await?;
    print_report("servineo status", &report, out)
}

fn print_report(title: &str, report: &NotificationReport, out: &Output) -> Result<(), ServineoError> {
    if out.json {
        return out.print_json(report);
    }

    out.heading(title);
    println!("    Referencia: {}", report.reference);
    if report.delivered {
        println!(
            "    WhatsApp:   {} ({}ms)",
            out.ok("enviado"),
            report.response_time_ms
        );
    } else {
        let error = report.error.as_deref().unwrap_or("unknown error");
        println!("    WhatsApp:   {}", out.fail(error));
    }
    if report.escalated {
        println!("    {}", out.warn("administrador notificado"));
    }
    println!();
    Ok(())
}
