//! Web call request/response types.

use serde::{Deserialize, Serialize};

/// Request body for `POST /functions/v1/retell-create-call`.
///
/// Both fields are optional; a missing or unparseable body behaves like `{}`.
///
/// ```json
/// { "api_key": "wgt_3f9a...", "is_demo": false }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CreateCallRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub is_demo: bool,
}

impl CreateCallRequest {
    /// Widget public key, if one was supplied.
    pub fn widget_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct CreateCallResponse {
    pub access_token: String,
}
