//! Text-chat proxy endpoint.

use axum::{Json, body::Bytes, extract::State};

use crate::{
    error::AppError,
    models::chat::{ChatRequest, ChatResponse},
    services::chat_service,
    state::AppState,
};

/// Relay one message to the text agent.
///
/// # Endpoint
///
/// `POST /functions/v1/retell-text-chat`
///
/// # Request Body
///
/// ```json
/// { "message": "Do you ship abroad?", "conversation_id": "conv_123" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{ "response": "...", "conversation_id": "..." }`
/// - **Error (400)**: missing message
/// - **Error (500)**: chat agent not configured or provider failure
pub async fn text_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::InvalidRequest("Message is required".to_string()))?;

    let reply = chat_service::relay_message(state.voice.as_ref(), &state.config, &request).await?;
    chat_service::record_exchange(&state.pool, &request, &reply).await;

    Ok(Json(reply))
}
