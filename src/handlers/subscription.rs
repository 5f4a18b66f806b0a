//! Subscription check endpoint.

use axum::{Extension, Json, extract::State};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::subscription::SubscriptionSnapshot,
    services::entitlement_service,
    state::AppState,
};

/// Resolve the caller's current tier and widget quota.
///
/// # Endpoint
///
/// `GET | POST /functions/v1/check-subscription`
///
/// # Response
///
/// - **Success (200 OK)**
///
/// ```json
/// {
///   "subscribed": true,
///   "tier": "pro",
///   "widget_limit": 200,
///   "subscription_end": "2026-11-18T00:00:00Z",
///   "is_trialing": false,
///   "is_admin": false
/// }
/// ```
///
/// - **Error (401)**: missing or invalid token, or no email on the account
/// - **Error (500)**: billing provider failure or missing billing key
pub async fn check_subscription(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<SubscriptionSnapshot>, AppError> {
    let snapshot =
        entitlement_service::check_subscription(&state.pool, state.billing.as_ref(), &auth)
            .await?;

    Ok(Json(snapshot))
}
