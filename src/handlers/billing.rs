//! Checkout and billing portal endpoints.

use axum::{Extension, Json, body::Bytes, extract::State};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::billing::{CreateCheckoutRequest, SessionUrlResponse},
    services::billing_service,
    state::AppState,
};

/// Start a subscription checkout.
///
/// # Endpoint
///
/// `POST /functions/v1/create-checkout`
///
/// # Request Body
///
/// ```json
/// { "tier": "pro" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{ "url": "https://checkout.stripe.com/..." }`
/// - **Error (400)**: unknown tier or a tier that cannot be bought
/// - **Error (500)**: price not configured or billing provider failure
pub async fn create_checkout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    body: Bytes,
) -> Result<Json<SessionUrlResponse>, AppError> {
    let request: CreateCheckoutRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::InvalidRequest("Invalid tier".to_string()))?;

    let url =
        billing_service::start_checkout(state.billing.as_ref(), &state.config, &auth, request.tier)
            .await?;

    Ok(Json(SessionUrlResponse { url }))
}

/// `POST /functions/v1/customer-portal`: open subscription management.
/// Returns 404 when the account has never subscribed.
pub async fn customer_portal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<SessionUrlResponse>, AppError> {
    let url = billing_service::open_portal(state.billing.as_ref(), &state.config, &auth).await?;
    Ok(Json(SessionUrlResponse { url }))
}
