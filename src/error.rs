//! Error types and HTTP error response handling.
//!
//! Every endpoint except keep-alive answers failures with the same body:
//!
//! ```json
//! { "error": "Human-readable error message" }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::providers::ProviderError;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Configuration**: a secret, key or agent id the request needs is missing
/// - **Upstream**: the billing or voice provider failed or answered non-2xx
/// - **Authentication**: missing or invalid bearer token
/// - **Resource**: widget or invitation not found, quota exhausted
/// - **Validation**: invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed.
    ///
    /// Returns HTTP 500 without leaking the query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A required secret, API key or agent id is not configured.
    #[error("{0}")]
    Configuration(String),

    /// An external provider call failed. The message carries the provider's
    /// status and body.
    #[error("{0}")]
    Upstream(String),

    /// Bearer token missing, malformed, expired or not matching.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("{0}")]
    Authentication(String),

    /// Authenticated, but the account lacks the required role.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// Requested resource does not exist or does not belong to the caller.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Widget creation refused by the quota gate.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("You've reached your limit of {limit} widgets. Upgrade to create more.")]
    WidgetLimitReached { limit: u32 },

    #[error("This invitation has already been used. Please sign in instead.")]
    InvitationAlreadyUsed,

    #[error("This invitation has expired. Please contact your administrator for a new one.")]
    InvitationExpired,

    /// Request body or parameters are invalid.
    #[error("{0}")]
    InvalidRequest(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(_) | ProviderError::InvalidBaseUrl { .. } => {
                AppError::Configuration(err.to_string())
            }
            ProviderError::Transport { .. }
            | ProviderError::Status { .. }
            | ProviderError::Malformed { .. }
            | ProviderError::Stripe(_)
            | ProviderError::Timeout { .. } => AppError::Upstream(err.to_string()),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Configuration(_) | AppError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::WidgetLimitReached { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvitationAlreadyUsed => StatusCode::CONFLICT,
            AppError::InvitationExpired => StatusCode::GONE,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to the client. Database details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({ "error": self.client_message() }));
        (status, body).into_response()
    }
}
