//! Voice call creation for embedded widgets.

use axum::{Json, body::Bytes, extract::State};

use crate::{
    error::AppError,
    models::call::{CreateCallRequest, CreateCallResponse},
    services::credential_service,
    state::AppState,
};

/// Start a voice web call with resolved credentials.
///
/// # Endpoint
///
/// `POST /functions/v1/retell-create-call`
///
/// # Authentication
///
/// None. The widget's public key identifies whose credentials to use.
///
/// # Request Body
///
/// Optional. A missing or unparseable body is treated as `{}` and resolves
/// to the environment defaults.
///
/// ```json
/// { "api_key": "wgt_3f9a...", "is_demo": false }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{ "access_token": "..." }`
/// - **Error (500)**: credentials unresolvable or provider failure
pub async fn create_call(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateCallResponse>, AppError> {
    let request: CreateCallRequest = serde_json::from_slice(&body).unwrap_or_default();

    let context = credential_service::load_credential_context(&state.pool, &request).await;
    let access_token = credential_service::start_web_call(
        state.voice.as_ref(),
        context,
        &state.config.voice_defaults(),
    )
    .await?;

    Ok(Json(CreateCallResponse { access_token }))
}
