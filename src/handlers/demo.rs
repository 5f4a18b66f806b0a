//! Demo settings administration endpoints (admin only).

use axum::{Extension, Json, extract::State};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::demo::{DemoSettingsResponse, UpdateDemoSettingsRequest},
    services::{demo_service, role_service},
    state::AppState,
};

pub async fn get_demo_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<DemoSettingsResponse>, AppError> {
    role_service::require_admin(&state.pool, auth.user_id).await?;

    let settings = demo_service::get_demo_settings(&state.pool).await?;
    Ok(Json(settings))
}

/// `PUT /api/v1/admin/demo-settings`: replace both demo overrides.
///
/// ```json
/// { "retell_api_key": "key_demo", "voice_agent_id": "agent_demo" }
/// ```
pub async fn update_demo_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdateDemoSettingsRequest>,
) -> Result<Json<DemoSettingsResponse>, AppError> {
    role_service::require_admin(&state.pool, auth.user_id).await?;

    let settings = demo_service::replace_demo_settings(&state.pool, request).await?;
    Ok(Json(settings))
}
