//! Health check and scheduled keep-alive endpoints.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::{error::AppError, services::keep_alive_service, state::AppState};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Database connection status
    pub database: String,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "connected",
///   "timestamp": "2026-10-18T19:00:00Z"
/// }
/// ```
///
/// If the database is unreachable, returns the standard error response.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        database: "connected".to_string(),
        timestamp: Utc::now(),
    }))
}

#[derive(Debug, Serialize)]
pub struct KeepAliveResponse {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub count: i64,
    pub message: String,
}

/// Keep the database warm.
///
/// # Endpoint
///
/// `GET /api/cron/keep-alive`
///
/// # Authentication
///
/// `Authorization: Bearer <CRON_SECRET>`, compared exactly.
///
/// # Response
///
/// - **Success (200 OK)**: `{ "success": true, "timestamp": "...", "count": 12, "message": "..." }`
/// - **Error (401)**: `{ "error": "Unauthorized" }`
/// - **Error (500)**: `{ "success": false, "error": "..." }`
pub async fn keep_alive(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if !keep_alive_service::is_authorized(authorization, state.config.cron_secret.as_deref()) {
        return AppError::Authentication("Unauthorized".to_string()).into_response();
    }

    match keep_alive_service::ping(&state.pool).await {
        Ok(count) => Json(KeepAliveResponse {
            success: true,
            timestamp: Utc::now(),
            count,
            message: "Database pinged successfully".to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Keep-alive error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.client_message() })),
            )
                .into_response()
        }
    }
}
