// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request form intake: required-field checks and normalisation.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use servineo_core::error::ServineoError;
use servineo_core::types::{RequestId, RequestStatus, ServiceRequest};

use crate::calendar::estimated_response_date;

/// What a requester fills in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestForm {
    pub requester_name: String,
    /// Dialling prefix, with or without `+`.
    pub country_code: String,
    pub phone: String,
    pub zone: String,
    pub service_type: String,
    pub description: String,
    #[serde(default)]
    pub fixer_name: Option<String>,
    #[serde(default)]
    pub work_on_saturday: bool,
}

impl RequestForm {
    /// Fails with every missing required field named.
    pub fn validate(&self) -> Result<(), ServineoError> {
        let missing: Vec<&str> = [
            ("requester_name", &self.requester_name),
            ("service_type", &self.service_type),
            ("description", &self.description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ServineoError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Builds the request to register. Text fields are trimmed and a blank
    /// fixer name means no fixer.
    pub fn into_request(
        self,
        id: RequestId,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> ServiceRequest {
        let registered_local = now.with_timezone(&offset).date_naive();
        ServiceRequest {
            id,
            requester_name: self.requester_name.trim().to_string(),
            country_code: self
                .country_code
                .chars()
                .filter(char::is_ascii_digit)
                .collect(),
            phone: self.phone.trim().to_string(),
            zone: self.zone.trim().to_string(),
            service_type: self.service_type.trim().to_string(),
            description: self.description.trim().to_string(),
            fixer_name: self
                .fixer_name
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty()),
            work_on_saturday: self.work_on_saturday,
            created_at: now,
            estimated_response: estimated_response_date(registered_local, self.work_on_saturday),
            status: RequestStatus::Created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::local_offset;
    use chrono::NaiveDate;
    use servineo_test_utils::at;

    fn form() -> RequestForm {
        RequestForm {
            requester_name: " Juan Pérez ".into(),
            country_code: "+591".into(),
            phone: "69542509".into(),
            zone: "Sopocachi".into(),
            service_type: "Plomería".into(),
            description: "Fuga en el baño".into(),
            fixer_name: Some("   ".into()),
            work_on_saturday: false,
        }
    }

    #[test]
    fn all_missing_fields_are_named() {
        let form = RequestForm {
            requester_name: "  ".into(),
            description: String::new(),
            ..form()
        };
        let err = form.validate().unwrap_err().to_string();
        assert!(err.contains("requester_name"), "{err}");
        assert!(err.contains("description"), "{err}");
        assert!(!err.contains("service_type"), "{err}");
    }

    #[test]
    fn complete_form_is_valid() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn request_is_normalised() {
        // Friday 17 Oct 2025, 02:00 UTC is still Thursday 16 Oct at UTC-4.
        let now = at(2025, 10, 17, 2, 0);
        let request = form().into_request(RequestId("SOL-1".into()), now, local_offset(-4));

        assert_eq!(request.requester_name, "Juan Pérez");
        assert_eq!(request.country_code, "591");
        assert_eq!(request.fixer_name, None);
        assert_eq!(request.status, RequestStatus::Created);
        assert_eq!(request.created_at, now);
        // Thursday -> Friday, weekend skipped -> Monday.
        assert_eq!(
            request.estimated_response,
            NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
        );
    }

    #[test]
    fn named_fixer_is_trimmed() {
        let form = RequestForm {
            fixer_name: Some(" Carlos ".into()),
            ..form()
        };
        let request = form.into_request(RequestId("SOL-1".into()), at(2025, 10, 14, 12, 0), local_offset(-4));
        assert_eq!(request.fixer_name.as_deref(), Some("Carlos"));
    }
}
