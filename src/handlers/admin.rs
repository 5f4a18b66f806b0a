//! Super-admin system overview.

use axum::{Extension, Json, extract::State};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::role::Role,
    services::{admin_service::{self, SystemStats}, role_service},
    state::AppState,
};

/// `GET /api/v1/admin/stats`: account, widget and admin counts.
///
/// Restricted to super admins; plain admins get 403.
///
/// ```json
/// { "total_users": 42, "total_widgets": 97, "admin_users": 3 }
/// ```
pub async fn system_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<SystemStats>, AppError> {
    role_service::require_role(&state.pool, auth.user_id, Role::SuperAdmin).await?;

    let stats = admin_service::system_stats(&state.pool).await?;
    Ok(Json(stats))
}
