// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evolution API wire types.

use serde::{Deserialize, Serialize};

/// Body of `POST /message/sendText/<instance>`.
#[derive(Debug, Clone, Serialize)]
pub struct SendTextRequest<'a> {
    pub number: &'a str,
    pub text: &'a str,
}

/// The fields of a response body the sender looks at.
///
/// Some deployments answer 2xx with `{"success": false, ...}` when the
/// message was not accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendTextResponse {
    #[serde(default)]
    pub success: Option<bool>,
}

impl SendTextResponse {
    /// True only for a body that explicitly reports `success: false`.
    pub fn reports_failure(body: &str) -> bool {
        serde_json::from_str::<SendTextResponse>(body)
            .ok()
            .and_then(|r| r.success)
            == Some(false)
    }
}
