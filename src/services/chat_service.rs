//! Text-chat proxy.
//!
//! Forwards one user message to the text agent and returns the reply. The
//! provider's conversation id carries continuity; both sides of the exchange
//! are also written to `chat_messages` as a transcript.

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    models::chat::{ChatRequest, ChatResponse, ChatRole},
    providers::{VoiceCredentials, VoiceProvider},
};

/// Credentials for the text agent. Unlike voice calls there is no override
/// chain: both values come from the environment.
pub fn chat_credentials(config: &Config) -> Result<VoiceCredentials, AppError> {
    let api_key = non_empty(config.retell_api_key.as_deref()).ok_or_else(|| {
        tracing::error!("RETELL_API_KEY is not configured");
        AppError::Configuration("RETELL_API_KEY is not configured".to_string())
    })?;

    let agent_id = non_empty(config.retell_text_agent_id.as_deref()).ok_or_else(|| {
        tracing::error!("RETELL_TEXT_AGENT_ID is not configured");
        AppError::Configuration("RETELL_TEXT_AGENT_ID is not configured".to_string())
    })?;

    Ok(VoiceCredentials {
        api_key: api_key.to_string(),
        agent_id: agent_id.to_string(),
    })
}

/// Validate the request and relay the message to the provider.
///
/// # Errors
///
/// - `InvalidRequest`: missing or blank message (checked before anything else)
/// - `Configuration`: chat credentials missing
/// - `Upstream`: provider failure
pub async fn relay_message(
    voice: &dyn VoiceProvider,
    config: &Config,
    request: &ChatRequest,
) -> Result<ChatResponse, AppError> {
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("Message is required".to_string()))?;

    let credentials = chat_credentials(config)?;
    let conversation_id = non_empty(request.conversation_id.as_deref());

    tracing::info!(
        "Relaying chat message (conversation: {})",
        conversation_id.unwrap_or("new")
    );

    let completion = voice
        .create_chat_completion(&credentials, message, conversation_id)
        .await?;

    Ok(ChatResponse {
        response: completion.response,
        conversation_id: completion
            .conversation_id
            .or_else(|| conversation_id.map(str::to_string)),
    })
}

/// Persist both sides of an exchange. Failures are logged, never returned.
pub async fn record_exchange(pool: &DbPool, request: &ChatRequest, reply: &ChatResponse) {
    let (Some(conversation_id), Some(message)) =
        (reply.conversation_id.as_deref(), request.message.as_deref())
    else {
        return;
    };

    let mut entries = vec![(ChatRole::User, message.trim())];
    if let Some(response) = reply.response.as_deref() {
        entries.push((ChatRole::Agent, response));
    }

    for (role, content) in entries {
        let result = sqlx::query(
            "INSERT INTO chat_messages (conversation_id, role, content) VALUES ($1, $2, $3)",
        )
        .bind(conversation_id)
        .bind(role.as_str())
        .bind(content)
        .execute(pool)
        .await;

        if let Err(e) = result {
            tracing::warn!("Failed to store {} chat message: {:?}", role.as_str(), e);
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
