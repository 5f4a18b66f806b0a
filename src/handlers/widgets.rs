//! Widget management HTTP handlers.
//!
//! - GET /api/v1/widgets - List the caller's widgets
//! - POST /api/v1/widgets - Create a widget (quota gated)
//! - PATCH /api/v1/widgets/{id} - Update widget settings
//! - DELETE /api/v1/widgets/{id} - Delete a widget

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::widget::{CreateWidgetRequest, UpdateWidgetRequest, WidgetResponse},
    services::widget_service,
    state::AppState,
};

pub async fn list_widgets(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<WidgetResponse>>, AppError> {
    let widgets = widget_service::list_widgets(&state.pool, auth.user_id).await?;
    Ok(Json(widgets))
}

/// Create a widget.
///
/// # Endpoint
///
/// `POST /api/v1/widgets`
///
/// # Request Body
///
/// ```json
/// { "name": "Support bot" }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the new widget, including its public key
/// - **Error (400)**: blank name
/// - **Error (422)**: the caller's tier allows no more widgets
pub async fn create_widget(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateWidgetRequest>,
) -> Result<(StatusCode, Json<WidgetResponse>), AppError> {
    let widget =
        widget_service::create_widget(&state.pool, state.billing.as_ref(), &auth, &request.name)
            .await?;

    Ok((StatusCode::CREATED, Json(widget)))
}

/// Update a widget. Only the owner can update it; other accounts get 404.
pub async fn update_widget(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(widget_id): Path<Uuid>,
    Json(request): Json<UpdateWidgetRequest>,
) -> Result<Json<WidgetResponse>, AppError> {
    let widget =
        widget_service::update_widget(&state.pool, auth.user_id, widget_id, request).await?;
    Ok(Json(widget))
}

pub async fn delete_widget(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(widget_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    widget_service::delete_widget(&state.pool, auth.user_id, widget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
