//! Widget configuration models and API request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a widget configuration record from the database.
///
/// # Database Table
///
/// Maps to the `widget_configs` table. Each widget:
/// - Belongs to one account (via `user_id`)
/// - Is addressed publicly by `api_key`, which is embedded in customer pages
/// - May override the voice provider API key and agent id of its owner
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Widget {
    pub id: Uuid,

    /// Owning account
    pub user_id: Uuid,

    pub name: String,

    /// Public key embedded in the widget snippet (`wgt_` + 48 hex chars)
    pub api_key: String,

    /// Widget-specific voice provider API key
    pub retell_api_key: Option<String>,

    /// Widget-specific voice agent id
    pub voice_agent_id: Option<String>,

    pub voice_enabled: bool,
    pub chat_enabled: bool,

    /// Display customization (colors, position, greeting...) stored as-is
    pub customization: serde_json::Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Credential sources for a widget, joined with its owner's profile.
///
/// Loaded by the credential resolver in one query.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct WidgetCredentialSources {
    pub retell_api_key: Option<String>,
    pub voice_agent_id: Option<String>,
    /// Owner's global voice provider API key
    pub profile_retell_api_key: Option<String>,
}

/// Request body for creating a widget.
///
/// ```json
/// { "name": "Support bot" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateWidgetRequest {
    pub name: String,
}

/// Request body for updating a widget. Absent fields are left unchanged;
/// an empty string clears an override.
///
/// ```json
/// {
///   "name": "Sales bot",
///   "retell_api_key": "key_abc",
///   "voice_agent_id": "",
///   "chat_enabled": false
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct UpdateWidgetRequest {
    pub name: Option<String>,
    pub retell_api_key: Option<String>,
    pub voice_agent_id: Option<String>,
    pub voice_enabled: Option<bool>,
    pub chat_enabled: Option<bool>,
    pub customization: Option<serde_json::Value>,
}

/// Response body for widget endpoints.
///
/// The widget's own provider key is never echoed back; `has_retell_api_key`
/// tells the dashboard whether one is set.
#[derive(Debug, Serialize)]
pub struct WidgetResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub api_key: String,
    pub has_retell_api_key: bool,
    pub voice_agent_id: Option<String>,
    pub voice_enabled: bool,
    pub chat_enabled: bool,
    pub customization: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Widget> for WidgetResponse {
    fn from(widget: Widget) -> Self {
        Self {
            id: widget.id,
            user_id: widget.user_id,
            name: widget.name,
            api_key: widget.api_key,
            has_retell_api_key: widget.retell_api_key.is_some_and(|k| !k.is_empty()),
            voice_agent_id: widget.voice_agent_id,
            voice_enabled: widget.voice_enabled,
            chat_enabled: widget.chat_enabled,
            customization: widget.customization,
            created_at: widget.created_at,
            updated_at: widget.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_names_owner_and_hides_provider_key() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let widget = Widget {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "Front desk".to_string(),
            api_key: "wgt_0123456789abcdef".to_string(),
            retell_api_key: Some("key_secret".to_string()),
            voice_agent_id: None,
            voice_enabled: true,
            chat_enabled: false,
            customization: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        };

        let body = serde_json::to_value(WidgetResponse::from(widget)).unwrap();

        assert_eq!(body["user_id"], owner.to_string());
        assert_eq!(body["has_retell_api_key"], true);
        assert!(body.get("retell_api_key").is_none());
    }
}
