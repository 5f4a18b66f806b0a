//! Profile and role endpoints for the signed-in account.

use axum::{Extension, Json, extract::State};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        profile::{ProfileResponse, UpdateProfileRequest},
        role::RoleSummary,
    },
    services::{profile_service, role_service},
    state::AppState,
};

/// `GET /api/v1/profile`. Accounts that have never saved a profile get an
/// unsaved view with null timestamps.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = profile_service::get_profile(&state.pool, &auth).await?;
    Ok(Json(profile))
}

/// Update the display name or the global provider key.
///
/// # Endpoint
///
/// `PATCH /api/v1/profile`
///
/// # Request Body
///
/// ```json
/// { "retell_api_key": "key_abc" }
/// ```
///
/// Send `"retell_api_key": ""` to clear the key. The profile row is created
/// on the first update.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = profile_service::update_profile(&state.pool, &auth, request).await?;
    Ok(Json(profile))
}

/// `GET /api/v1/roles/me`: the caller's roles, highest first.
pub async fn my_roles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<RoleSummary>, AppError> {
    let roles = role_service::fetch_roles(&state.pool, auth.user_id).await?;
    Ok(Json(RoleSummary::new(roles)))
}
