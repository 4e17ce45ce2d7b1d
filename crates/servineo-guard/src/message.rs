// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp message templates.
//!
//! Texts are addressed to Spanish-speaking requesters, fixers and
//! administrators and are kept byte-stable: tests pin them.

use chrono::{DateTime, FixedOffset, Utc};
use servineo_core::types::{OutboundMessage, RequestStatus, ServiceRequest};

use crate::calendar::{description_preview, format_date, format_timestamp};
use crate::notify::{CancellationNotice, StatusDecision, StatusUpdate};

/// Label shown to requesters for a status.
pub fn status_label(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Created => "Creada",
        RequestStatus::Pending => "Pendiente",
        RequestStatus::Sent => "Enviada",
        RequestStatus::Failed => "Fallida",
    }
}

/// Registration confirmation sent to the requester.
pub fn confirmation(request: &ServiceRequest, offset: FixedOffset) -> OutboundMessage {
    let mut text = format!(
        "¡Hola {name}!\n\
         ✅ Tu solicitud ha sido registrada con éxito.\n\
         Código: {id}\n\
         Estado: {status}\n\
         Tipo de servicio: {service}\n\
         Descripción: {description}\n\
         Fecha y hora de registro: {registered}\n\
         Fecha estimada de respuesta: {estimated}",
        name = request.requester_name,
        id = request.id,
        status = status_label(request.status),
        service = request.service_type,
        description = description_preview(&request.description),
        registered = format_timestamp(request.created_at, offset),
        estimated = format_date(request.estimated_response),
    );
    if let Some(fixer) = &request.fixer_name {
        text.push_str(&format!("\nFixer asignado: {fixer}"));
    }
    OutboundMessage::new(request.destination_number(), text)
}

/// Tells a fixer that the requester cancelled an appointment.
pub fn cancellation(
    notice: &CancellationNotice,
    appointment_id: &str,
    at: DateTime<Utc>,
    offset: FixedOffset,
) -> OutboundMessage {
    let text = format!(
        "CANCELACIÓN DE SOLICITUD\n\
         \n\
         Hola {fixer}👋\n\
         Lamentamos informarte que {requester} canceló su cita con ID: {appointment_id}\n\
         🔧Título de Solicitud: {title}\n\
         Descripción: {description}\n\
         Estado actual: Cancelada\n\
         Fecha y hora: {when}\n\
         \n\
         Enlace: {link}",
        fixer = notice.fixer_name,
        requester = notice.requester_name,
        title = notice.title,
        description = notice.description,
        when = format_timestamp(at, offset),
        link = notice.link.as_deref().unwrap_or("N/A"),
    );
    OutboundMessage::new(digits(&notice.fixer_number), text)
}

/// Accepted / rejected notice sent to the requester.
pub fn status_update(
    update: &StatusUpdate,
    at: DateTime<Utc>,
    offset: FixedOffset,
) -> OutboundMessage {
    let when = format_timestamp(at, offset);
    let link = link_or_na(update);
    let text = match update.decision {
        StatusDecision::Accepted => format!(
            "Nueva actualización sobre tu solicitud ✔\n\
             ¡Tu solicitud ha sido aceptada!\n\
             \n\
             📋 Detalles:\n\
             • Número de solicitud: {id}\n\
             • Servicio: {service}\n\
             • Fecha y hora: {when}\n\
             • Fixer asignado: {fixer}\n\
             \n\
             🔗 Enlace de seguimiento:\n\
             {link}\n\
             \n\
             El fixer {fixer} está listo para ayudarte.",
            id = update.request_id,
            service = update.service_type,
            fixer = update.fixer_name,
        ),
        StatusDecision::Rejected => format!(
            "Nueva actualización sobre tu solicitud ❌\n\
             Lamentamos informarte que tu solicitud ha sido rechazada.\n\
             \n\
             📋 Detalles:\n\
             • Número: {id}\n\
             • Servicio: {service}\n\
             • Fecha y hora: {when}\n\
             • Fixer responsable: {fixer}\n\
             • Motivo: {reason}\n\
             \n\
             🔄 ¿Qué puedes hacer?\n\
             • Revisar los detalles en: {link}\n\
             • Crear una nueva solicitud ajustando los requerimientos",
            id = update.request_id,
            service = update.service_type,
            fixer = update.fixer_name,
            reason = update.reason.as_deref().unwrap_or_default(),
        ),
    };
    OutboundMessage::new(digits(&update.requester_number), text)
}

/// Alert to the administrator after repeated status-update failures.
pub fn status_failure_alert(admin_number: &str, update: &StatusUpdate, failures: u32) -> OutboundMessage {
    let text = format!(
        "🚨 ALERTA ADMINISTRADOR: Problema de entrega de mensaje\n\
         \n\
         No se ha podido entregar la notificación al cliente después de {failures} intentos.\n\
         \n\
         📋 Detalles del problema:\n\
         • Solicitud: {id}\n\
         • Cliente: {requester}\n\
         • Servicio: {service}\n\
         • Teléfono: {phone}\n\
         • Fixer asignado: {fixer}\n\
         • Estado intentado: {decision}\n\
         • Intentos fallidos: {failures}\n\
         \n\
         ⚠️ Se requiere intervención manual para notificar al cliente.",
        id = update.request_id,
        requester = update.requester_name,
        service = update.service_type,
        phone = digits(&update.requester_number),
        fixer = update.fixer_name,
        decision = decision_label(update.decision),
    );
    OutboundMessage::new(digits(admin_number), text)
}

/// Tells the fixer the requester could not be reached about a status change.
pub fn fixer_failure_notice(fixer_number: &str, update: &StatusUpdate) -> OutboundMessage {
    let noun = match update.decision {
        StatusDecision::Accepted => "aceptación",
        StatusDecision::Rejected => "rechazo",
    };
    let text = format!(
        "📢 Información importante sobre tu solicitud\n\
         \n\
         No hemos podido notificar al cliente sobre el {noun} de su solicitud.\n\
         \n\
         📋 Detalles:\n\
         • Solicitud: {id}\n\
         • Cliente: {requester}\n\
         • Servicio: {service}\n\
         • Estado: {decision}\n\
         • Fixer responsable: {fixer}\n\
         \n\
         ℹ️ El administrador ha sido notificado y se contactará con el cliente manualmente.\n\
         \n\
         Puedes ver los detalles de la solicitud en:\n\
         {link}",
        id = update.request_id,
        requester = update.requester_name,
        service = update.service_type,
        decision = decision_label(update.decision),
        fixer = update.fixer_name,
        link = link_or_na(update),
    );
    OutboundMessage::new(digits(fixer_number), text)
}

/// Alert to the administrator when a confirmation exhausted its retries.
pub fn confirmation_failure_alert(
    admin_number: &str,
    request: &ServiceRequest,
    attempts: u32,
    last_error: &str,
) -> OutboundMessage {
    let text = format!(
        "🚨 ALERTA ADMINISTRADOR: Confirmación no entregada\n\
         \n\
         No se ha podido confirmar el registro al cliente después de {attempts} intentos.\n\
         \n\
         📋 Detalles del problema:\n\
         • Solicitud: {id}\n\
         • Cliente: {requester}\n\
         • Servicio: {service}\n\
         • Teléfono: {phone}\n\
         • Último error: {last_error}\n\
         \n\
         ⚠️ Se requiere intervención manual para notificar al cliente.",
        id = request.id,
        requester = request.requester_name,
        service = request.service_type,
        phone = request.destination_number(),
    );
    OutboundMessage::new(digits(admin_number), text)
}

/// Warning shown when the request was registered but never confirmed.
pub fn undelivered_warning(request: &ServiceRequest) -> String {
    format!(
        "Solicitud creada (Código {}), pero no pudimos enviar la confirmación. \
         Intenta revisar el estado en la app.",
        request.id
    )
}

/// Warning shown when the number can never receive WhatsApp messages.
pub fn unreachable_warning(request: &ServiceRequest) -> String {
    format!(
        "Solicitud creada (Código {}), pero el número {} no puede recibir mensajes de WhatsApp. \
         Un operador revisará la solicitud.",
        request.id,
        request.destination_number()
    )
}

/// Warning shown when a submission duplicates an earlier request.
pub fn duplicate_warning(existing: &ServiceRequest) -> String {
    format!(
        "Ya tienes una solicitud similar en curso (Código: {}).",
        existing.id
    )
}

fn decision_label(decision: StatusDecision) -> &'static str {
    match decision {
        StatusDecision::Accepted => "Aceptada",
        StatusDecision::Rejected => "Rechazada",
    }
}

fn link_or_na(update: &StatusUpdate) -> &str {
    update.link.as_deref().unwrap_or("N/A")
}

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
