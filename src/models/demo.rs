//! Demo settings: the singleton override used by the public demo widget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DemoSettings {
    pub retell_api_key: Option<String>,
    pub voice_agent_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `PUT /api/v1/admin/demo-settings`. Replaces both fields;
/// `null` or an empty string removes an override.
#[derive(Debug, Deserialize)]
pub struct UpdateDemoSettingsRequest {
    pub retell_api_key: Option<String>,
    pub voice_agent_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DemoSettingsResponse {
    pub has_retell_api_key: bool,
    pub voice_agent_id: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Option<DemoSettings>> for DemoSettingsResponse {
    fn from(settings: Option<DemoSettings>) -> Self {
        match settings {
            Some(s) => Self {
                has_retell_api_key: s.retell_api_key.is_some_and(|k| !k.is_empty()),
                voice_agent_id: s.voice_agent_id,
                updated_at: Some(s.updated_at),
            },
            None => Self {
                has_retell_api_key: false,
                voice_agent_id: None,
                updated_at: None,
            },
        }
    }
}
