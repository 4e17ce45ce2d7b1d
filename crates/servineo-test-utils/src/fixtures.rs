// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned domain values.

use chrono::{DateTime, TimeZone, Utc};
use servineo_core::types::{RequestId, RequestStatus, ServiceRequest};

/// A UTC instant; panics on an impossible date, which is fine in tests.
pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid fixture date {y}-{m}-{d} {h}:{min}"))
}

/// A registered-looking request with a reachable number and no fixer.
pub fn sample_request(id: &str, created_at: DateTime<Utc>) -> ServiceRequest {
    ServiceRequest {
        id: RequestId(id.to_string()),
        requester_name: "Juan Pérez".to_string(),
        country_code: "591".to_string(),
        phone: "69542509".to_string(),
        zone: "Sopocachi".to_string(),
        service_type: "Reparación de laptop".to_string(),
        description: "Necesito reparar la pantalla de mi laptop Dell".to_string(),
        fixer_name: None,
        work_on_saturday: false,
        created_at,
        estimated_response: created_at.date_naive() + chrono::Duration::days(2),
        status: RequestStatus::Created,
    }
}
